use super::{BufferError, GpuBuffer, Staging, create_raw};

/// Keeps a CPU copy of the whole buffer and uploads everything from the start
/// up to the end of the bound range on [`unbind`](GpuBuffer::unbind).
///
/// With `orphan` set, every upload goes into a newly allocated GPU buffer so
/// that draws still reading the old contents are never stalled. Bind groups
/// referring to [`buffer`](GpuBuffer::buffer) must be rebuilt after that.
#[derive(Debug)]
pub struct SubDataBuffer {
    buffer: wgpu::Buffer,
    staging: Staging,
    usage: wgpu::BufferUsages,
    size: u64,
    orphan: bool,
    label: String,
}

impl SubDataBuffer {
    pub fn new(
        device: &wgpu::Device,
        usage: wgpu::BufferUsages,
        size: u64,
        orphan: bool,
        label: &str,
    ) -> Self {
        Self {
            buffer: create_raw(device, usage, size, label),
            staging: Staging::new(size),
            usage,
            size,
            orphan,
            label: label.to_string(),
        }
    }

    pub fn is_orphaning(&self) -> bool {
        self.orphan
    }
}

impl GpuBuffer for SubDataBuffer {
    fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn bind(&mut self, offset: u64, size: u64) -> Result<&mut [u8], BufferError> {
        self.staging.bind(offset, size)
    }

    fn unbind(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<(), BufferError> {
        let written = self.staging.unbind()?;
        if self.orphan {
            self.buffer = create_raw(device, self.usage, self.size, &self.label);
        }
        if written.end > 0 {
            queue.write_buffer(&self.buffer, 0, &self.staging.data()[..written.end]);
        }
        Ok(())
    }
}
