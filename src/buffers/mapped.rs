use super::{BufferError, GpuBuffer, Staging, create_raw};

/// Uploads only the bytes of the bound range, leaving the rest of the GPU
/// buffer as it was.
#[derive(Debug)]
pub struct MappedBuffer {
    buffer: wgpu::Buffer,
    staging: Staging,
    size: u64,
}

impl MappedBuffer {
    pub fn new(device: &wgpu::Device, usage: wgpu::BufferUsages, size: u64, label: &str) -> Self {
        Self {
            buffer: create_raw(device, usage, size, label),
            staging: Staging::new(size),
            size,
        }
    }
}

impl GpuBuffer for MappedBuffer {
    fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn bind(&mut self, offset: u64, size: u64) -> Result<&mut [u8], BufferError> {
        self.staging.bind(offset, size)
    }

    fn unbind(&mut self, _device: &wgpu::Device, queue: &wgpu::Queue) -> Result<(), BufferError> {
        let written = self.staging.unbind()?;
        if !written.is_empty() {
            queue.write_buffer(
                &self.buffer,
                written.start as u64,
                &self.staging.data()[written],
            );
        }
        Ok(())
    }
}
