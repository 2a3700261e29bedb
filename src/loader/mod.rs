//! Sources of [`MeshData`](crate::mesh::MeshData): XML mesh files and
//! generated primitives.

pub mod polygon;
mod xml_mesh;

pub use polygon::VertexLayout;
pub use xml_mesh::XmlMeshLoader;
