//! 2D overlays drawn on top of a demo and the pipeline helper shared with
//! [`ShaderProgram`](crate::shader::ShaderProgram).

use crate::{math::Matrix4, shader::PipelineConfig};

mod monospace_font;
mod performance_graph;

pub use monospace_font::{FontError, FontLayout, FontVertex, MonospaceFont};
pub use performance_graph::{GraphData, PerformanceGraph};

/// Formats of the attachments an overlay renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayTarget {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
}

impl OverlayTarget {
    pub fn new(color_format: wgpu::TextureFormat, depth_format: Option<wgpu::TextureFormat>) -> Self {
        Self {
            color_format,
            depth_format,
        }
    }

    /// Overlays never test against or write the scene depth.
    pub(crate) fn pipeline_config<'a>(
        &self,
        vertex_layouts: &'a [wgpu::VertexBufferLayout<'a>],
        topology: wgpu::PrimitiveTopology,
    ) -> PipelineConfig<'a> {
        PipelineConfig::new(self.color_format, vertex_layouts)
            .with_topology(topology, None)
            .with_blend(Some(wgpu::BlendState::ALPHA_BLENDING))
            .with_cull_mode(None)
            .with_depth(self.depth_format, false, wgpu::CompareFunction::Always)
    }
}

/// Maps window pixels, origin in the bottom left corner, to clip space.
pub fn window_projection(size: [u32; 2]) -> Matrix4 {
    Matrix4::OPENGL_TO_WGPU
        * Matrix4::ortho(0.0, size[0].max(1) as f32, 0.0, size[1].max(1) as f32, 0.0, 1.0)
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    vertex: (&wgpu::ShaderModule, &str),
    fragment: Option<(&wgpu::ShaderModule, &str)>,
    config: &PipelineConfig,
) -> wgpu::RenderPipeline {
    let targets = [Some(wgpu::ColorTargetState {
        format: config.color_format,
        blend: config.blend,
        write_mask: wgpu::ColorWrites::ALL,
    })];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(config.label.unwrap_or("Render Pipeline")),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex.0,
            entry_point: Some(vertex.1),
            buffers: config.vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: fragment.map(|(module, entry_point)| wgpu::FragmentState {
            module,
            entry_point: Some(entry_point),
            targets: &targets,
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: config.topology,
            strip_index_format: config.strip_index_format,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: config.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: config.depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: config.depth_write,
            depth_compare: config.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
