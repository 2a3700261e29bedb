//! Meshes made of separate per-attribute vertex streams and a list of draw
//! commands.
//!
//! [`MeshData`] is the CPU description, usually produced by the XML loader.
//! Primitives wgpu cannot draw directly are rewritten while planning: triangle
//! fans become triangle lists and line loops become closed line strips.

use std::collections::HashMap;
use std::ops::Range;

use wgpu::util::DeviceExt;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Unsupported attribute type: {0}")]
    UnknownAttributeType(String),
    #[error("Unsupported index type: {0}")]
    UnknownIndexType(String),
    #[error("Invalid primitive name: {0}")]
    UnknownPrimitive(String),
    #[error("Invalid number '{value}' for type {ty}.")]
    InvalidNumber { value: String, ty: &'static str },
    #[error("Attribute {index} has {size} components, must be between 1 and 4.")]
    InvalidSize { index: u32, size: u32 },
    #[error("{ty} with {size} components has no matching vertex format.")]
    UnsupportedFormat { ty: &'static str, size: u32 },
    #[error("One of the render commands requires indices when none is supplied.")]
    MissingIndices,
    #[error("Vertices {start}+{count} lie outside the {available} vertices of the mesh.")]
    VertexRange { start: u32, count: u32, available: u32 },
    #[error("No mesh variation named '{0}'.")]
    UnknownVariation(String),
    #[error("{0}")]
    Parse(String),
    #[error("Malformed XML: {0}")]
    Xml(String),
}

fn parse_number<T: std::str::FromStr>(token: &str, ty: &'static str) -> Result<T, MeshError> {
    token.parse().map_err(|_| MeshError::InvalidNumber {
        value: token.to_string(),
        ty,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Float,
    Int,
    UInt,
    NormInt,
    NormUInt,
    Short,
    UShort,
    NormShort,
    NormUShort,
    Byte,
    UByte,
    NormByte,
    NormUByte,
}

impl AttributeType {
    pub const ALL: [AttributeType; 13] = [
        AttributeType::Float,
        AttributeType::Int,
        AttributeType::UInt,
        AttributeType::NormInt,
        AttributeType::NormUInt,
        AttributeType::Short,
        AttributeType::UShort,
        AttributeType::NormShort,
        AttributeType::NormUShort,
        AttributeType::Byte,
        AttributeType::UByte,
        AttributeType::NormByte,
        AttributeType::NormUByte,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AttributeType::Float => "float",
            AttributeType::Int => "int",
            AttributeType::UInt => "uint",
            AttributeType::NormInt => "norm-int",
            AttributeType::NormUInt => "norm-uint",
            AttributeType::Short => "short",
            AttributeType::UShort => "ushort",
            AttributeType::NormShort => "norm-short",
            AttributeType::NormUShort => "norm-ushort",
            AttributeType::Byte => "byte",
            AttributeType::UByte => "ubyte",
            AttributeType::NormByte => "norm-byte",
            AttributeType::NormUByte => "norm-ubyte",
        }
    }

    /// Case-insensitive lookup by the names used in mesh files.
    pub fn from_name(name: &str) -> Result<Self, MeshError> {
        let lower = name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|ty| ty.name() == lower)
            .ok_or_else(|| MeshError::UnknownAttributeType(name.to_string()))
    }

    /// Bytes per component.
    pub fn byte_size(self) -> usize {
        match self {
            AttributeType::Float
            | AttributeType::Int
            | AttributeType::UInt
            | AttributeType::NormInt
            | AttributeType::NormUInt => 4,
            AttributeType::Short
            | AttributeType::UShort
            | AttributeType::NormShort
            | AttributeType::NormUShort => 2,
            AttributeType::Byte
            | AttributeType::UByte
            | AttributeType::NormByte
            | AttributeType::NormUByte => 1,
        }
    }

    pub fn is_normalized(self) -> bool {
        matches!(
            self,
            AttributeType::NormInt
                | AttributeType::NormUInt
                | AttributeType::NormShort
                | AttributeType::NormUShort
                | AttributeType::NormByte
                | AttributeType::NormUByte
        )
    }

    /// Appends the tokens as native-endian values. Integers are parsed as 64
    /// bit and truncated to the component width.
    pub fn parse_into(self, tokens: &[&str], out: &mut Vec<u8>) -> Result<(), MeshError> {
        for token in tokens {
            match self.byte_size() {
                _ if self == AttributeType::Float => {
                    out.extend_from_slice(&parse_number::<f32>(token, self.name())?.to_ne_bytes())
                }
                4 => out.extend_from_slice(&(parse_number::<i64>(token, self.name())? as i32).to_ne_bytes()),
                2 => out.extend_from_slice(&(parse_number::<i64>(token, self.name())? as i16).to_ne_bytes()),
                _ => out.push(parse_number::<i64>(token, self.name())? as u8),
            }
        }
        Ok(())
    }

    /// wgpu only reads vertex data in 4 byte steps, so 8 bit types need four
    /// components and 16 bit types two or four. There are no normalized 32
    /// bit formats.
    pub fn vertex_format(self, size: u32) -> Result<wgpu::VertexFormat, MeshError> {
        use wgpu::VertexFormat as F;
        let format = match (self, size) {
            (AttributeType::Float, 1) => F::Float32,
            (AttributeType::Float, 2) => F::Float32x2,
            (AttributeType::Float, 3) => F::Float32x3,
            (AttributeType::Float, 4) => F::Float32x4,
            (AttributeType::Int, 1) => F::Sint32,
            (AttributeType::Int, 2) => F::Sint32x2,
            (AttributeType::Int, 3) => F::Sint32x3,
            (AttributeType::Int, 4) => F::Sint32x4,
            (AttributeType::UInt, 1) => F::Uint32,
            (AttributeType::UInt, 2) => F::Uint32x2,
            (AttributeType::UInt, 3) => F::Uint32x3,
            (AttributeType::UInt, 4) => F::Uint32x4,
            (AttributeType::Short, 2) => F::Sint16x2,
            (AttributeType::Short, 4) => F::Sint16x4,
            (AttributeType::UShort, 2) => F::Uint16x2,
            (AttributeType::UShort, 4) => F::Uint16x4,
            (AttributeType::NormShort, 2) => F::Snorm16x2,
            (AttributeType::NormShort, 4) => F::Snorm16x4,
            (AttributeType::NormUShort, 2) => F::Unorm16x2,
            (AttributeType::NormUShort, 4) => F::Unorm16x4,
            (AttributeType::Byte, 4) => F::Sint8x4,
            (AttributeType::UByte, 4) => F::Uint8x4,
            (AttributeType::NormByte, 4) => F::Snorm8x4,
            (AttributeType::NormUByte, 4) => F::Unorm8x4,
            _ => {
                return Err(MeshError::UnsupportedFormat {
                    ty: self.name(),
                    size,
                });
            }
        };
        Ok(format)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    UByte,
    UShort,
    UInt,
}

impl IndexType {
    pub fn name(self) -> &'static str {
        match self {
            IndexType::UByte => "ubyte",
            IndexType::UShort => "ushort",
            IndexType::UInt => "uint",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, MeshError> {
        match name.to_lowercase().as_str() {
            "ubyte" => Ok(IndexType::UByte),
            "ushort" => Ok(IndexType::UShort),
            "uint" => Ok(IndexType::UInt),
            _ => Err(MeshError::UnknownIndexType(name.to_string())),
        }
    }

    pub fn byte_size(self) -> usize {
        match self {
            IndexType::UByte => 1,
            IndexType::UShort => 2,
            IndexType::UInt => 4,
        }
    }

    /// 8 bit indices are widened to 16 bit on upload.
    pub fn gpu_format(self) -> wgpu::IndexFormat {
        match self {
            IndexType::UByte | IndexType::UShort => wgpu::IndexFormat::Uint16,
            IndexType::UInt => wgpu::IndexFormat::Uint32,
        }
    }

    pub fn parse_into(self, tokens: &[&str], out: &mut Vec<u8>) -> Result<(), MeshError> {
        for token in tokens {
            let value = parse_number::<i64>(token, self.name())?;
            match self {
                IndexType::UByte => out.push(value as u8),
                IndexType::UShort => out.extend_from_slice(&(value as u16).to_ne_bytes()),
                IndexType::UInt => out.extend_from_slice(&(value as u32).to_ne_bytes()),
            }
        }
        Ok(())
    }

    fn read(self, bytes: &[u8], index: usize) -> u32 {
        let at = index * self.byte_size();
        match self {
            IndexType::UByte => bytes[at] as u32,
            IndexType::UShort => u16::from_ne_bytes([bytes[at], bytes[at + 1]]) as u32,
            IndexType::UInt => {
                u32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Triangles,
    TriFan,
    TriStrip,
    Lines,
    LineStrip,
    LineLoop,
    Points,
}

impl Primitive {
    pub fn from_name(name: &str) -> Result<Self, MeshError> {
        match name {
            "triangles" => Ok(Primitive::Triangles),
            "tri-fan" => Ok(Primitive::TriFan),
            "tri-strip" => Ok(Primitive::TriStrip),
            "lines" => Ok(Primitive::Lines),
            "line-strip" => Ok(Primitive::LineStrip),
            "line-loop" => Ok(Primitive::LineLoop),
            "points" => Ok(Primitive::Points),
            _ => Err(MeshError::UnknownPrimitive(name.to_string())),
        }
    }

    /// Topology the primitive is drawn with after planning.
    pub fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Primitive::Triangles | Primitive::TriFan => wgpu::PrimitiveTopology::TriangleList,
            Primitive::TriStrip => wgpu::PrimitiveTopology::TriangleStrip,
            Primitive::Lines => wgpu::PrimitiveTopology::LineList,
            Primitive::LineStrip | Primitive::LineLoop => wgpu::PrimitiveTopology::LineStrip,
            Primitive::Points => wgpu::PrimitiveTopology::PointList,
        }
    }

    fn needs_rewrite(self) -> bool {
        matches!(self, Primitive::TriFan | Primitive::LineLoop)
    }

    fn rewrite(self, indices: &[u32]) -> Vec<u32> {
        match self {
            Primitive::TriFan if indices.len() >= 3 => indices[1..]
                .windows(2)
                .flat_map(|pair| [indices[0], pair[0], pair[1]])
                .collect(),
            Primitive::TriFan => Vec::new(),
            Primitive::LineLoop if indices.len() >= 2 => {
                let mut closed = indices.to_vec();
                closed.push(indices[0]);
                closed
            }
            Primitive::LineLoop => Vec::new(),
            _ => indices.to_vec(),
        }
    }
}

/// One vertex attribute inside the packed attribute data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Shader location.
    pub index: u32,
    pub ty: AttributeType,
    /// Components per vertex.
    pub size: u32,
    /// Byte offset inside [`MeshData::attribute_data`].
    pub offset: usize,
    pub vertex_count: u32,
}

impl Attribute {
    /// Appends the parsed tokens to `data`, 4 byte aligned, and describes
    /// where they ended up.
    pub fn store_data(
        index: u32,
        ty: AttributeType,
        size: u32,
        tokens: &[&str],
        data: &mut Vec<u8>,
    ) -> Result<Self, MeshError> {
        let attribute = Self::start(index, ty, size, tokens.len(), data)?;
        ty.parse_into(tokens, data)?;
        Ok(attribute)
    }

    /// Like [`store_data`](Self::store_data) for values that are already
    /// floats.
    pub fn store_floats(index: u32, size: u32, values: &[f32], data: &mut Vec<u8>) -> Result<Self, MeshError> {
        let attribute = Self::start(index, AttributeType::Float, size, values.len(), data)?;
        data.extend_from_slice(bytemuck::cast_slice(values));
        Ok(attribute)
    }

    fn start(
        index: u32,
        ty: AttributeType,
        size: u32,
        values: usize,
        data: &mut Vec<u8>,
    ) -> Result<Self, MeshError> {
        if !(1..=4).contains(&size) {
            return Err(MeshError::InvalidSize { index, size });
        }
        if values % size as usize != 0 {
            return Err(MeshError::Parse(format!(
                "<attribute> {} has {} values, which is not a multiple of its size {}",
                index, values, size
            )));
        }
        data.resize(data.len().next_multiple_of(4), 0);
        Ok(Self {
            index,
            ty,
            size,
            offset: data.len(),
            vertex_count: (values / size as usize) as u32,
        })
    }

    pub fn stride(&self) -> u64 {
        (self.ty.byte_size() * self.size as usize) as u64
    }

    pub fn byte_range(&self) -> Range<u64> {
        let start = self.offset as u64;
        start..start + self.stride() * self.vertex_count as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCommand {
    Indexed {
        primitive: Primitive,
        index_type: IndexType,
        /// Byte offset inside [`MeshData::index_data`].
        start: usize,
        count: u32,
    },
    Arrays {
        primitive: Primitive,
        start: u32,
        count: u32,
    },
}

impl RenderCommand {
    /// Appends the parsed indices to `data` and returns the command drawing
    /// them.
    pub fn store_indices(
        primitive: Primitive,
        index_type: IndexType,
        tokens: &[&str],
        data: &mut Vec<u8>,
    ) -> Result<Self, MeshError> {
        let start = data.len();
        index_type.parse_into(tokens, data)?;
        Ok(RenderCommand::Indexed {
            primitive,
            index_type,
            start,
            count: tokens.len() as u32,
        })
    }

    pub fn primitive(&self) -> Primitive {
        match *self {
            RenderCommand::Indexed { primitive, .. } | RenderCommand::Arrays { primitive, .. } => {
                primitive
            }
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self, RenderCommand::Indexed { .. })
    }
}

/// A draw call against the buffers of a [`Mesh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    Vertices {
        topology: wgpu::PrimitiveTopology,
        vertices: Range<u32>,
    },
    Indexed {
        topology: wgpu::PrimitiveTopology,
        format: wgpu::IndexFormat,
        /// Byte range inside [`DrawPlan::indices`].
        bytes: Range<u64>,
        count: u32,
    },
}

impl DrawCall {
    pub fn topology(&self) -> wgpu::PrimitiveTopology {
        match *self {
            DrawCall::Vertices { topology, .. } | DrawCall::Indexed { topology, .. } => topology,
        }
    }
}

/// GPU-ready index data and the draws using it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawPlan {
    pub indices: Vec<u8>,
    pub draws: Vec<DrawCall>,
}

impl DrawPlan {
    fn push_indices(&mut self, topology: wgpu::PrimitiveTopology, format: wgpu::IndexFormat, indices: &[u32]) {
        if indices.is_empty() {
            return;
        }
        self.indices.resize(self.indices.len().next_multiple_of(4), 0);
        let start = self.indices.len() as u64;
        for &index in indices {
            match format {
                wgpu::IndexFormat::Uint16 => self.indices.extend_from_slice(&(index as u16).to_ne_bytes()),
                wgpu::IndexFormat::Uint32 => self.indices.extend_from_slice(&index.to_ne_bytes()),
            }
        }
        self.draws.push(DrawCall::Indexed {
            topology,
            format,
            bytes: start..self.indices.len() as u64,
            count: indices.len() as u32,
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshData {
    pub attribute_data: Vec<u8>,
    pub index_data: Option<Vec<u8>>,
    pub attributes: Vec<Attribute>,
    pub commands: Vec<RenderCommand>,
    /// Named subsets of attribute indices.
    pub variations: HashMap<String, Vec<u32>>,
}

impl MeshData {
    pub fn new(
        attribute_data: Vec<u8>,
        attributes: Vec<Attribute>,
        commands: Vec<RenderCommand>,
        index_data: Option<Vec<u8>>,
    ) -> Result<Self, MeshError> {
        if index_data.is_none() && commands.iter().any(RenderCommand::is_indexed) {
            return Err(MeshError::MissingIndices);
        }
        let available = attributes.iter().map(|a| a.vertex_count).min();
        for command in &commands {
            if let RenderCommand::Arrays { start, count, .. } = *command {
                check_vertex_range(start, count, available)?;
            }
        }
        Ok(Self {
            attribute_data,
            index_data,
            attributes,
            commands,
            variations: HashMap::new(),
        })
    }

    /// Attributes of `variation`, in declaration order.
    pub fn variation(&self, name: &str) -> Result<Vec<&Attribute>, MeshError> {
        let sources = self
            .variations
            .get(name)
            .ok_or_else(|| MeshError::UnknownVariation(name.to_string()))?;
        Ok(self
            .attributes
            .iter()
            .filter(|a| sources.contains(&a.index))
            .collect())
    }

    /// Turns the render commands into draw calls wgpu can execute.
    pub fn plan(&self) -> Result<DrawPlan, MeshError> {
        let mut plan = DrawPlan::default();
        for command in &self.commands {
            match *command {
                RenderCommand::Arrays {
                    primitive,
                    start,
                    count,
                } => {
                    let end = check_vertex_range(start, count, None)?;
                    if primitive.needs_rewrite() {
                        let indices: Vec<u32> = (start..end).collect();
                        plan.push_indices(
                            primitive.topology(),
                            wgpu::IndexFormat::Uint32,
                            &primitive.rewrite(&indices),
                        );
                    } else if count > 0 {
                        plan.draws.push(DrawCall::Vertices {
                            topology: primitive.topology(),
                            vertices: start..end,
                        });
                    }
                }
                RenderCommand::Indexed {
                    primitive,
                    index_type,
                    start,
                    count,
                } => {
                    let data = self.index_data.as_deref().ok_or(MeshError::MissingIndices)?;
                    let bytes = (count as usize)
                        .checked_mul(index_type.byte_size())
                        .and_then(|len| start.checked_add(len))
                        .and_then(|end| data.get(start..end))
                        .ok_or_else(|| {
                            MeshError::Parse(format!(
                                "{} indices from byte {} lie outside the index data of {} bytes",
                                count,
                                start,
                                data.len()
                            ))
                        })?;
                    let indices: Vec<u32> = (0..count as usize)
                        .map(|i| index_type.read(bytes, i))
                        .collect();
                    plan.push_indices(
                        primitive.topology(),
                        index_type.gpu_format(),
                        &primitive.rewrite(&indices),
                    );
                }
            }
        }
        Ok(plan)
    }
}

/// End of the vertex range `start..start + count`, which must fit in
/// `available` vertices when that is known.
fn check_vertex_range(start: u32, count: u32, available: Option<u32>) -> Result<u32, MeshError> {
    start
        .checked_add(count)
        .filter(|&end| available.is_none_or(|available| end <= available))
        .ok_or(MeshError::VertexRange {
            start,
            count,
            available: available.unwrap_or(u32::MAX),
        })
}

#[derive(Debug)]
struct VertexStream {
    bytes: Range<u64>,
    stride: u64,
    attributes: [wgpu::VertexAttribute; 1],
}

/// A mesh uploaded to the GPU.
///
/// Each attribute is its own vertex buffer slot, in declaration order, read
/// from the shader location given by [`Attribute::index`].
#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    streams: Vec<VertexStream>,
    draws: Vec<DrawCall>,
}

impl Mesh {
    /// Uploads all attributes of `data`.
    pub fn new(device: &wgpu::Device, data: &MeshData, label: &str) -> Result<Self, MeshError> {
        let attributes: Vec<&Attribute> = data.attributes.iter().collect();
        Self::with_attributes(device, data, &attributes, label)
    }

    /// Uploads `data` but only exposes the attributes of `variation`.
    pub fn variation(
        device: &wgpu::Device,
        data: &MeshData,
        variation: &str,
        label: &str,
    ) -> Result<Self, MeshError> {
        let attributes = data.variation(variation)?;
        Self::with_attributes(device, data, &attributes, label)
    }

    fn with_attributes(
        device: &wgpu::Device,
        data: &MeshData,
        attributes: &[&Attribute],
        label: &str,
    ) -> Result<Self, MeshError> {
        let streams = attributes
            .iter()
            .map(|attribute| {
                Ok(VertexStream {
                    bytes: attribute.byte_range(),
                    stride: attribute.stride(),
                    attributes: [wgpu::VertexAttribute {
                        format: attribute.ty.vertex_format(attribute.size)?,
                        offset: 0,
                        shader_location: attribute.index,
                    }],
                })
            })
            .collect::<Result<Vec<_>, MeshError>>()?;

        let plan = data.plan()?;

        let mut vertex_data = data.attribute_data.clone();
        vertex_data.resize(vertex_data.len().next_multiple_of(4).max(4), 0);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: &vertex_data,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = (!plan.indices.is_empty()).then(|| {
            let mut index_data = plan.indices.clone();
            index_data.resize(index_data.len().next_multiple_of(4), 0);
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", label)),
                contents: &index_data,
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        Ok(Self {
            vertex_buffer,
            index_buffer,
            streams,
            draws: plan.draws,
        })
    }

    /// Layouts to build a matching pipeline with, one per vertex slot.
    pub fn vertex_layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.streams
            .iter()
            .map(|stream| wgpu::VertexBufferLayout {
                array_stride: stream.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &stream.attributes,
            })
            .collect()
    }

    /// Distinct topologies of the draws, in order of first use.
    pub fn topologies(&self) -> Vec<wgpu::PrimitiveTopology> {
        let mut topologies = Vec::new();
        for draw in &self.draws {
            if !topologies.contains(&draw.topology()) {
                topologies.push(draw.topology());
            }
        }
        topologies
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    fn bind_streams(&self, pass: &mut wgpu::RenderPass<'_>) {
        for (slot, stream) in self.streams.iter().enumerate() {
            pass.set_vertex_buffer(slot as u32, self.vertex_buffer.slice(stream.bytes.clone()));
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, draw: &DrawCall) {
        match draw {
            DrawCall::Vertices { vertices, .. } => pass.draw(vertices.clone(), 0..1),
            DrawCall::Indexed {
                format,
                bytes,
                count,
                ..
            } => {
                if let Some(index_buffer) = &self.index_buffer {
                    pass.set_index_buffer(index_buffer.slice(bytes.clone()), *format);
                    pass.draw_indexed(0..*count, 0, 0..1);
                }
            }
        }
    }

    /// Draws every command with the pipeline already set on `pass`.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.bind_streams(pass);
        for draw in &self.draws {
            self.draw(pass, draw);
        }
    }

    /// Draws every command, switching to the pipeline of its topology.
    /// Commands without a pipeline are skipped.
    pub fn render_with(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipelines: &HashMap<wgpu::PrimitiveTopology, wgpu::RenderPipeline>,
    ) {
        self.bind_streams(pass);
        for draw in &self.draws {
            match pipelines.get(&draw.topology()) {
                Some(pipeline) => {
                    pass.set_pipeline(pipeline);
                    self.draw(pass, draw);
                }
                None => log::warn!("No pipeline for {:?}, skipping draw.", draw.topology()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices_u16(plan: &DrawPlan, bytes: &Range<u64>) -> Vec<u16> {
        plan.indices[bytes.start as usize..bytes.end as usize]
            .chunks(2)
            .map(|c| u16::from_ne_bytes([c[0], c[1]]))
            .collect()
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(AttributeType::from_name("Norm-UByte").unwrap(), AttributeType::NormUByte);
        assert_eq!(IndexType::from_name("USHORT").unwrap(), IndexType::UShort);
        assert!(AttributeType::from_name("double").is_err());
        assert!(Primitive::from_name("quads").is_err());
    }

    #[test]
    fn vertex_formats_follow_wgpu_alignment() {
        assert_eq!(AttributeType::Float.vertex_format(3).unwrap(), wgpu::VertexFormat::Float32x3);
        assert_eq!(AttributeType::NormUByte.vertex_format(4).unwrap(), wgpu::VertexFormat::Unorm8x4);
        assert!(AttributeType::UByte.vertex_format(3).is_err());
        assert!(AttributeType::NormInt.vertex_format(1).is_err());
    }

    #[test]
    fn attributes_are_packed_at_aligned_offsets() {
        let mut data = Vec::new();
        let colors = Attribute::store_data(1, AttributeType::UShort, 2, &["1", "2"], &mut data).unwrap();
        let positions =
            Attribute::store_data(0, AttributeType::Float, 3, &["0", "1", "2.5"], &mut data).unwrap();
        assert_eq!(colors.offset, 0);
        assert_eq!(positions.offset, 4);
        assert_eq!(positions.byte_range(), 4..16);
        assert_eq!(&data[8..12], &1.0f32.to_ne_bytes());

        let err = Attribute::store_data(2, AttributeType::Float, 3, &["1", "2"], &mut data);
        assert!(matches!(err, Err(MeshError::Parse(_))));
    }

    #[test]
    fn fans_and_loops_are_rewritten() {
        let mut indices = Vec::new();
        let fan = RenderCommand::store_indices(
            Primitive::TriFan,
            IndexType::UByte,
            &["0", "1", "2", "3"],
            &mut indices,
        )
        .unwrap();
        let data = MeshData::new(
            Vec::new(),
            Vec::new(),
            vec![
                fan,
                RenderCommand::Arrays {
                    primitive: Primitive::LineLoop,
                    start: 4,
                    count: 3,
                },
                RenderCommand::Arrays {
                    primitive: Primitive::Points,
                    start: 0,
                    count: 2,
                },
            ],
            Some(indices),
        )
        .unwrap();

        let plan = data.plan().unwrap();
        assert_eq!(plan.draws.len(), 3);
        match &plan.draws[0] {
            DrawCall::Indexed {
                topology,
                format,
                bytes,
                count,
            } => {
                assert_eq!(*topology, wgpu::PrimitiveTopology::TriangleList);
                assert_eq!(*format, wgpu::IndexFormat::Uint16);
                assert_eq!(*count, 6);
                assert_eq!(indices_u16(&plan, bytes), vec![0, 1, 2, 0, 2, 3]);
            }
            other => panic!("unexpected draw {:?}", other),
        }
        match &plan.draws[1] {
            DrawCall::Indexed {
                topology,
                format,
                bytes,
                count,
            } => {
                assert_eq!(*topology, wgpu::PrimitiveTopology::LineStrip);
                assert_eq!(*format, wgpu::IndexFormat::Uint32);
                assert_eq!(*count, 4);
                assert_eq!(bytes.start % 4, 0);
            }
            other => panic!("unexpected draw {:?}", other),
        }
        assert_eq!(
            plan.draws[2],
            DrawCall::Vertices {
                topology: wgpu::PrimitiveTopology::PointList,
                vertices: 0..2,
            }
        );
    }

    #[test]
    fn vertex_ranges_must_fit_the_attributes() {
        let mut data = Vec::new();
        let position = Attribute::store_floats(0, 2, &[0.0; 8], &mut data).unwrap();
        let arrays = |start, count| RenderCommand::Arrays {
            primitive: Primitive::TriFan,
            start,
            count,
        };

        assert!(MeshData::new(data.clone(), vec![position.clone()], vec![arrays(1, 3)], None).is_ok());
        assert!(matches!(
            MeshData::new(data.clone(), vec![position.clone()], vec![arrays(2, 3)], None),
            Err(MeshError::VertexRange { available: 4, .. })
        ));
        assert!(matches!(
            MeshData::new(data, vec![position], vec![arrays(u32::MAX, 2)], None),
            Err(MeshError::VertexRange { .. })
        ));

        let unchecked = MeshData {
            commands: vec![arrays(u32::MAX, 2)],
            ..Default::default()
        };
        assert!(matches!(unchecked.plan(), Err(MeshError::VertexRange { .. })));
    }

    #[test]
    fn indexed_commands_need_index_data() {
        let command = RenderCommand::Indexed {
            primitive: Primitive::Triangles,
            index_type: IndexType::UInt,
            start: 0,
            count: 3,
        };
        assert!(matches!(
            MeshData::new(Vec::new(), Vec::new(), vec![command], None),
            Err(MeshError::MissingIndices)
        ));
    }
}
