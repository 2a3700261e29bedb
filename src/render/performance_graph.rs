use instant::Duration;

use crate::{
    math::{Matrix4, Vector4},
    shader::{ShaderError, ShaderProgram},
    stopwatch::Stopwatch,
    uniforms::{ProgramUniforms, UniformMat4Binder, UniformVec4Binder},
};

use super::{OverlayTarget, window_projection};

const AXIS_VERTICES: u32 = 4;
const VERTEX_SIZE: u64 = std::mem::size_of::<[f32; 2]>() as u64;
const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

/// Samples of one stopwatch section, laid out as a line graph.
///
/// Coordinates are window pixels with the origin in the bottom left corner.
/// The graph spans `max_steps * step_width` pixels to the right of `x` and
/// `height` pixels above `y`, where a sample of `max_value` reaches the top.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphData {
    pub name: String,
    pub max_value: f32,
    pub x: f32,
    pub y: f32,
    pub max_steps: usize,
    pub step_width: f32,
    pub height: f32,
    elapsed: Duration,
    points: Vec<[f32; 2]>,
}

impl GraphData {
    pub fn new(
        name: &str,
        max_value: f32,
        x: f32,
        y: f32,
        max_steps: usize,
        step_width: f32,
        height: f32,
    ) -> Self {
        Self {
            name: name.to_string(),
            max_value,
            x,
            y,
            max_steps,
            step_width,
            height,
            elapsed: Duration::ZERO,
            points: Vec::with_capacity(max_steps),
        }
    }

    pub fn width(&self) -> f32 {
        self.max_steps as f32 * self.step_width
    }

    /// The vertical and the horizontal axis as a line list.
    pub fn axes(&self) -> [[f32; 2]; 4] {
        [
            [self.x, self.y],
            [self.x, self.y + self.height],
            [self.x, self.y],
            [self.x + self.width(), self.y],
        ]
    }

    /// Graph points, newest first.
    pub fn points(&self) -> &[[f32; 2]] {
        &self.points
    }

    /// Adds one step per full second elapsed, each asking `sample` for the
    /// current value of the section. Returns whether any step was added.
    pub fn update(&mut self, dt: Duration, mut sample: impl FnMut(&str) -> f64) -> bool {
        self.elapsed += dt;
        let mut changed = false;
        while self.elapsed >= Duration::from_secs(1) {
            self.elapsed -= Duration::from_secs(1);
            let value = sample(&self.name);
            self.push(value);
            changed = true;
        }
        changed
    }

    /// Shifts the existing points one step to the left and puts `value` at
    /// the right edge.
    pub fn push(&mut self, value: f64) {
        let mut step_height = (value / self.max_value as f64 * self.height as f64) as f32;
        if step_height.is_nan() {
            step_height = 0.0;
        }

        for point in &mut self.points {
            point[0] -= self.step_width;
        }
        self.points
            .insert(0, [self.x + self.width() - 1.0, self.y + step_height]);
        self.points.truncate(self.max_steps);
    }
}

/// Draws a [`GraphData`] on top of the scene.
#[derive(Debug)]
pub struct PerformanceGraph {
    data: GraphData,
    program: ShaderProgram,
    uniforms: ProgramUniforms,
    projection: UniformMat4Binder,
    color: UniformVec4Binder,
    bind_group: wgpu::BindGroup,
    axes_pipeline: wgpu::RenderPipeline,
    graph_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
}

impl PerformanceGraph {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: OverlayTarget,
        data: GraphData,
        color: Vector4,
        size: [u32; 2],
    ) -> Result<Self, ShaderError> {
        let program = ShaderProgram::new(
            device,
            include_str!("shaders/perf_graph.vert.wgsl"),
            include_str!("shaders/perf_graph.frag.wgsl"),
        )?;

        let layouts = [wgpu::VertexBufferLayout {
            array_stride: VERTEX_SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }];
        let axes_pipeline = program.pipeline(
            device,
            &target
                .pipeline_config(&layouts, wgpu::PrimitiveTopology::LineList)
                .with_label("Performance Graph Axes"),
        );
        let graph_pipeline = program.pipeline(
            device,
            &target
                .pipeline_config(&layouts, wgpu::PrimitiveTopology::LineStrip)
                .with_label("Performance Graph"),
        );

        let mut uniforms = ProgramUniforms::new(device, &program);
        let bind_group = uniforms.bind_group(device, &program, 0, &[])?;
        let mut projection = UniformMat4Binder::new("projection", window_projection(size));
        let mut color = UniformVec4Binder::new("color", color);
        projection.bind_state(&program, &mut uniforms)?;
        color.bind_state(&program, &mut uniforms)?;
        uniforms.flush(queue);

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Performance Graph Vertex Buffer"),
            size: (AXIS_VERTICES as u64 + data.max_steps as u64) * VERTEX_SIZE,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&vertex_buffer, 0, bytemuck::cast_slice(&data.axes()));

        Ok(Self {
            data,
            program,
            uniforms,
            projection,
            color,
            bind_group,
            axes_pipeline,
            graph_pipeline,
            vertex_buffer,
        })
    }

    pub fn data(&self) -> &GraphData {
        &self.data
    }

    pub fn set_color(&mut self, queue: &wgpu::Queue, color: Vector4) -> Result<(), ShaderError> {
        self.color.set_value(color);
        self.color.bind_state(&self.program, &mut self.uniforms)?;
        self.uniforms.flush(queue);
        Ok(())
    }

    pub fn update(&mut self, dt: Duration, stopwatch: &Stopwatch, queue: &wgpu::Queue) {
        if self.data.update(dt, |name| stopwatch.time_per_frame(name)) {
            queue.write_buffer(
                &self.vertex_buffer,
                AXIS_VERTICES as u64 * VERTEX_SIZE,
                bytemuck::cast_slice(self.data.points()),
            );
        }
    }

    pub fn resize(&mut self, queue: &wgpu::Queue, size: [u32; 2]) -> Result<(), ShaderError> {
        self.projection.set_value(window_projection(size));
        self.projection.bind_state(&self.program, &mut self.uniforms)?;
        self.uniforms.flush(queue);
        Ok(())
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        pass.set_pipeline(&self.axes_pipeline);
        pass.draw(0..AXIS_VERTICES, 0..1);

        let steps = self.data.points().len() as u32;
        if steps > 1 {
            pass.set_pipeline(&self.graph_pipeline);
            pass.draw(AXIS_VERTICES..AXIS_VERTICES + steps, 0..1);
        }
    }

    /// Projection currently used by the overlay.
    pub fn projection(&self) -> &Matrix4 {
        self.projection.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_per_second() {
        let mut graph = GraphData::new("Render", 20.0, 10.0, 5.0, 3, 4.0, 100.0);
        assert_eq!(graph.width(), 12.0);

        assert!(!graph.update(Duration::from_millis(900), |_| 10.0));
        assert!(graph.points().is_empty());

        assert!(graph.update(Duration::from_millis(100), |_| 10.0));
        assert_eq!(graph.points(), &[[21.0, 55.0]]);

        // two seconds at once add two steps
        assert!(graph.update(Duration::from_secs(2), |_| 5.0));
        assert_eq!(graph.points(), &[[21.0, 30.0], [17.0, 30.0], [13.0, 55.0]]);
    }

    #[test]
    fn keeps_at_most_max_steps() {
        let mut graph = GraphData::new("Update", 1.0, 0.0, 0.0, 2, 1.0, 10.0);
        graph.push(0.1);
        graph.push(0.2);
        graph.push(0.3);
        assert_eq!(graph.points().len(), 2);
        assert_eq!(graph.points()[0], [1.0, 3.0]);
        assert_eq!(graph.points()[1][0], 0.0);
    }

    #[test]
    fn nan_samples_are_drawn_at_the_bottom() {
        let mut graph = GraphData::new("Update", 0.0, 0.0, 7.0, 4, 1.0, 10.0);
        graph.push(0.0);
        assert_eq!(graph.points()[0], [3.0, 7.0]);
    }

    #[test]
    fn axes_meet_at_the_origin() {
        let graph = GraphData::new("Update", 1.0, 2.0, 3.0, 5, 2.0, 8.0);
        assert_eq!(
            graph.axes(),
            [[2.0, 3.0], [2.0, 11.0], [2.0, 3.0], [12.0, 3.0]]
        );
    }
}
