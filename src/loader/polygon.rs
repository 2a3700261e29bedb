//! Vertex data for unit primitives: a cube and a two-sided plane, both as
//! triangle lists with per-face normals.

use crate::{
    math::{Matrix4, Vector2, Vector3, Vector4},
    mesh::{Attribute, MeshData, MeshError, Primitive, RenderCommand},
};

#[rustfmt::skip]
const CUBE_POSITIONS: [[f32; 3]; 36] = [
    [-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5],

    [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5], [-0.5, -0.5, -0.5],
    [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5],

    [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5],
    [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5],

    [-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5],

    [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5],

    [-0.5, 0.5, -0.5], [-0.5, 0.5, 0.5], [-0.5, -0.5, 0.5],
    [-0.5, -0.5, 0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5],
];

const CUBE_FACE_NORMALS: [[f32; 3]; 6] = [
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
];

/// Top side first, then the bottom side with the opposite winding.
#[rustfmt::skip]
const PLANE_POSITIONS: [[f32; 3]; 12] = [
    [-0.5, 0.0, -0.5], [0.5, 0.0, -0.5], [0.5, 0.0, 0.5],
    [0.5, 0.0, 0.5], [-0.5, 0.0, 0.5], [-0.5, 0.0, -0.5],

    [-0.5, 0.0, 0.5], [0.5, 0.0, 0.5], [0.5, 0.0, -0.5],
    [0.5, 0.0, -0.5], [-0.5, 0.0, -0.5], [-0.5, 0.0, 0.5],
];

const PLANE_FACE_NORMALS: [[f32; 3]; 2] = [[0.0, 1.0, 0.0], [0.0, -1.0, 0.0]];

/// How positions and normals are arranged in the returned floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexLayout {
    /// `position, normal, position, normal, ...` instead of all positions
    /// followed by all normals.
    pub interleaved: bool,
    /// Positions get a fourth component set to 1.
    pub vec4: bool,
}

impl VertexLayout {
    pub fn new(interleaved: bool, vec4: bool) -> Self {
        Self { interleaved, vec4 }
    }

    pub fn position_size(&self) -> usize {
        if self.vec4 { 4 } else { 3 }
    }

    /// Floats per vertex, position and normal together.
    pub fn vertex_size(&self) -> usize {
        self.position_size() + 3
    }

    /// Splits `vertices` into the position and normal floats.
    pub fn split(&self, vertices: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let count = vertices.len() / self.vertex_size();
        let position_size = self.position_size();
        if self.interleaved {
            let mut positions = Vec::with_capacity(count * position_size);
            let mut normals = Vec::with_capacity(count * 3);
            for vertex in vertices.chunks_exact(self.vertex_size()) {
                positions.extend_from_slice(&vertex[..position_size]);
                normals.extend_from_slice(&vertex[position_size..]);
            }
            (positions, normals)
        } else {
            let (positions, normals) = vertices.split_at(count * position_size);
            (positions.to_vec(), normals.to_vec())
        }
    }
}

fn build(
    positions: &[[f32; 3]],
    face_normals: &[[f32; 3]],
    layout: VertexLayout,
    place: impl Fn(Vector3) -> Vector3,
    model: Option<&Matrix4>,
) -> Vec<f32> {
    let mut placed = Vec::with_capacity(positions.len() * layout.position_size());
    let mut normals = Vec::with_capacity(positions.len() * 3);
    for (i, p) in positions.iter().enumerate() {
        let mut position = Vector4::from_vec3(place(Vector3::from(*p)), 1.0);
        if let Some(model) = model {
            position = model.mul_vec4(position);
            position.w = 1.0;
        }
        placed.extend_from_slice(&position.to_array()[..layout.position_size()]);
        normals.extend_from_slice(&face_normals[i / 6]);
    }

    if !layout.interleaved {
        placed.extend_from_slice(&normals);
        return placed;
    }
    placed
        .chunks_exact(layout.position_size())
        .zip(normals.chunks_exact(3))
        .flat_map(|(p, n)| p.iter().chain(n).copied())
        .collect()
}

/// A box with the given side lengths around `center`, optionally moved by
/// `model`. Normals are not transformed.
pub fn cube(side: Vector3, center: Vector3, layout: VertexLayout, model: Option<&Matrix4>) -> Vec<f32> {
    build(
        &CUBE_POSITIONS,
        &CUBE_FACE_NORMALS,
        layout,
        |p| Vector3::new(center.x + p.x * side.x, center.y + p.y * side.y, center.z + p.z * side.z),
        model,
    )
}

pub fn unit_cube(layout: VertexLayout) -> Vec<f32> {
    cube(Vector3::ONE, Vector3::ZERO, layout, None)
}

/// A horizontal plane through `center`. `side.x` spans the x axis and
/// `side.y` the z axis.
pub fn plane(side: Vector2, center: Vector3, layout: VertexLayout, model: Option<&Matrix4>) -> Vec<f32> {
    build(
        &PLANE_POSITIONS,
        &PLANE_FACE_NORMALS,
        layout,
        |p| Vector3::new(center.x + p.x * side.x, center.y, center.z + p.z * side.y),
        model,
    )
}

/// Mesh data with positions at location 0 and normals at location 1, drawn
/// as one triangle list.
pub fn to_mesh_data(vertices: &[f32], layout: VertexLayout) -> Result<MeshData, MeshError> {
    let (positions, normals) = layout.split(vertices);

    let mut data = Vec::new();
    let position = Attribute::store_floats(0, layout.position_size() as u32, &positions, &mut data)?;
    let normal = Attribute::store_floats(1, 3, &normals, &mut data)?;
    let count = position.vertex_count;

    MeshData::new(
        data,
        vec![position, normal],
        vec![RenderCommand::Arrays {
            primitive: Primitive::Triangles,
            start: 0,
            count,
        }],
        None,
    )
}
