//! Text rendering with a bitmap font whose glyphs all share one width and sit
//! on a single row of the atlas.

use crate::{
    math::Vector4,
    resources::load_binary,
    shader::{ShaderError, ShaderProgram},
    texture::{Texture, create_default_sampler},
    uniforms::{ProgramUniforms, UniformMat4Binder},
};

use super::{OverlayTarget, window_projection};

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("characters.len() * char_width = {expected} does not equal the image width {actual}")]
    AtlasWidth { expected: u32, actual: u32 },
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Texture(#[from] anyhow::Error),
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FontVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl FontVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FontVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Glyph placement, independent of the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct FontLayout {
    characters: Vec<char>,
    char_width: u32,
    char_height: u32,
}

impl FontLayout {
    /// `characters` lists the glyphs of the atlas from left to right.
    pub fn new(
        characters: &str,
        char_width: u32,
        image_width: u32,
        image_height: u32,
    ) -> Result<Self, FontError> {
        let characters: Vec<char> = characters.chars().collect();
        let expected = characters.len() as u32 * char_width;
        if expected != image_width {
            return Err(FontError::AtlasWidth {
                expected,
                actual: image_width,
            });
        }
        Ok(Self {
            characters,
            char_width,
            char_height: image_height,
        })
    }

    /// Width of one glyph in texture coordinates.
    pub fn tex_char_width(&self) -> f32 {
        1.0 / self.characters.len() as f32
    }

    /// Width of one glyph when drawn `height` pixels tall.
    pub fn char_width(&self, height: f32) -> f32 {
        self.char_width as f32 * (height / self.char_height as f32)
    }

    /// Appends six vertices per drawn glyph with the bottom left corner of
    /// the text at `(x, y)`. The text is lowercased first; spaces and glyphs
    /// missing from the atlas only advance the pen. Returns the number of
    /// glyphs drawn.
    pub fn layout(
        &self,
        text: &str,
        x: f32,
        y: f32,
        height: f32,
        color: Vector4,
        out: &mut Vec<FontVertex>,
    ) -> usize {
        let width = self.char_width(height);
        let tex_width = self.tex_char_width();
        let color = color.to_array();

        let mut drawn = 0;
        let mut left = x;
        for c in text.to_lowercase().chars() {
            let Some(index) = self.characters.iter().position(|&g| g == c).filter(|_| c != ' ')
            else {
                left += width;
                continue;
            };

            let u = tex_width * index as f32;
            let vertex = |px: f32, py: f32, tu: f32, tv: f32| FontVertex {
                position: [px, py],
                tex_coords: [tu, tv],
                color,
            };
            out.extend_from_slice(&[
                vertex(left, y + height, u, 0.0),
                vertex(left + width, y, u + tex_width, 1.0),
                vertex(left, y, u, 1.0),
                vertex(left + width, y, u + tex_width, 1.0),
                vertex(left, y + height, u, 0.0),
                vertex(left + width, y + height, u + tex_width, 0.0),
            ]);

            drawn += 1;
            left += width;
        }
        drawn
    }
}

/// Collects text with [`draw_text`](Self::draw_text), uploads it in
/// [`prepare`](Self::prepare) and draws it in [`render`](Self::render).
#[derive(Debug)]
pub struct MonospaceFont {
    name: String,
    layout: FontLayout,
    program: ShaderProgram,
    uniforms: ProgramUniforms,
    projection: UniformMat4Binder,
    size: [u32; 2],
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    pending: Vec<FontVertex>,
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
}

impl MonospaceFont {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: OverlayTarget,
        name: &str,
        atlas: &image::DynamicImage,
        characters: &str,
        char_width: u32,
    ) -> Result<Self, FontError> {
        let layout = FontLayout::new(characters, char_width, atlas.width(), atlas.height())?;
        let texture = Texture::from_image(device, queue, atlas, Some(name), false)?;
        let sampler = create_default_sampler(device);

        let program = ShaderProgram::new(
            device,
            include_str!("shaders/mono_font.vert.wgsl"),
            include_str!("shaders/mono_font.frag.wgsl"),
        )?;
        let layouts = [FontVertex::desc()];
        let pipeline = program.pipeline(
            device,
            &target
                .pipeline_config(&layouts, wgpu::PrimitiveTopology::TriangleList)
                .with_label("Monospace Font"),
        );

        let mut uniforms = ProgramUniforms::new(device, &program);
        let bind_group = uniforms.bind_group(
            device,
            &program,
            0,
            &[
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        )?;
        let mut projection = UniformMat4Binder::new("projection", window_projection([1, 1]));
        projection.bind_state(&program, &mut uniforms)?;

        log::info!("Loaded font {} with {} glyphs.", name, characters.chars().count());
        Ok(Self {
            name: name.to_string(),
            layout,
            program,
            uniforms,
            projection,
            size: [0, 0],
            bind_group,
            pipeline,
            pending: Vec::new(),
            vertex_buffer: None,
            vertex_count: 0,
        })
    }

    /// Loads the atlas image from the assets.
    pub async fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: OverlayTarget,
        file_name: &str,
        characters: &str,
        char_width: u32,
    ) -> anyhow::Result<Self> {
        let bytes = load_binary(file_name).await?;
        let atlas = image::load_from_memory(&bytes)?;
        Ok(Self::new(device, queue, target, file_name, &atlas, characters, char_width)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &FontLayout {
        &self.layout
    }

    /// Queues `text` for the next [`prepare`](Self::prepare). Positions are
    /// window pixels from the bottom left corner.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, height: f32, color: Vector4) {
        self.layout.layout(text, x, y, height, color, &mut self.pending);
    }

    /// Uploads the queued text for a window of `width` x `height` pixels.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
    ) -> Result<(), ShaderError> {
        if self.size != [width, height] {
            self.size = [width, height];
            self.projection.set_value(window_projection(self.size));
            self.projection.bind_state(&self.program, &mut self.uniforms)?;
        }
        self.uniforms.flush(queue);

        let bytes: &[u8] = bytemuck::cast_slice(&self.pending);
        let needed = bytes.len() as u64;
        if needed > 0 {
            let too_small = self
                .vertex_buffer
                .as_ref()
                .is_none_or(|buffer| buffer.size() < needed);
            if too_small {
                self.vertex_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Monospace Font Vertex Buffer"),
                    size: needed.next_power_of_two(),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                }));
            }
            if let Some(buffer) = &self.vertex_buffer {
                queue.write_buffer(buffer, 0, bytes);
            }
        }
        self.vertex_count = self.pending.len() as u32;
        self.pending.clear();
        Ok(())
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(buffer) = self.vertex_buffer.as_ref().filter(|_| self.vertex_count > 0) else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}
