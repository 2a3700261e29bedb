//! Strategies for streaming CPU data into GPU buffers.
//!
//! All strategies share the same protocol: [`GpuBuffer::bind`] hands out a
//! writable byte window, [`GpuBuffer::unbind`] makes the written data visible
//! to the GPU. They differ in what gets uploaded and where.

use std::ops::Range;

mod mapped;
mod persistent;
mod sub_data;

pub use mapped::MappedBuffer;
pub use persistent::PersistentBuffer;
pub use sub_data::SubDataBuffer;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("Buffer is already bound.")]
    AlreadyBound,
    #[error("Buffer is not already bound.")]
    NotBound,
    #[error("{size} bytes at offset {offset} exceed the buffer size of {capacity} bytes.")]
    OutOfRange { offset: u64, size: u64, capacity: u64 },
    #[error("A persistent buffer needs at least one region.")]
    NoRegions,
}

pub trait GpuBuffer {
    fn buffer(&self) -> &wgpu::Buffer;

    /// Usable size in bytes. For ring buffers this is the size of one region.
    fn size(&self) -> u64;

    /// Returns the bytes `offset..offset + size` for writing. Nothing reaches
    /// the GPU before [`unbind`](Self::unbind).
    fn bind(&mut self, offset: u64, size: u64) -> Result<&mut [u8], BufferError>;

    fn unbind(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<(), BufferError>;

    /// Byte offset at which the data of the current frame starts.
    fn region_offset(&self) -> u64 {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferStrategy {
    /// Upload from the start of the buffer on every unbind, optionally into
    /// a freshly allocated buffer.
    SubData { orphan: bool },
    /// Upload only the bound range.
    Mapped,
    /// Rotate through `regions` copies of the buffer.
    Persistent { regions: u32 },
}

pub fn create_buffer(
    device: &wgpu::Device,
    strategy: BufferStrategy,
    usage: wgpu::BufferUsages,
    size: u64,
    label: &str,
) -> Result<Box<dyn GpuBuffer>, BufferError> {
    Ok(match strategy {
        BufferStrategy::SubData { orphan } => {
            Box::new(SubDataBuffer::new(device, usage, size, orphan, label))
        }
        BufferStrategy::Mapped => Box::new(MappedBuffer::new(device, usage, size, label)),
        BufferStrategy::Persistent { regions } => {
            Box::new(PersistentBuffer::new(device, usage, size, regions, label)?)
        }
    })
}

pub(crate) fn align_size(size: u64) -> u64 {
    size.div_ceil(wgpu::COPY_BUFFER_ALIGNMENT) * wgpu::COPY_BUFFER_ALIGNMENT
}

pub(crate) fn create_raw(
    device: &wgpu::Device,
    usage: wgpu::BufferUsages,
    size: u64,
    label: &str,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: align_size(size).max(wgpu::COPY_BUFFER_ALIGNMENT),
        usage: usage | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// CPU side copy of a buffer plus the bind/unbind bookkeeping.
#[derive(Debug)]
pub(crate) struct Staging {
    data: Vec<u8>,
    size: u64,
    bound: Option<Range<usize>>,
}

impl Staging {
    pub(crate) fn new(size: u64) -> Self {
        Self {
            data: vec![0; align_size(size) as usize],
            size,
            bound: None,
        }
    }

    pub(crate) fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub(crate) fn bind(&mut self, offset: u64, size: u64) -> Result<&mut [u8], BufferError> {
        if self.bound.is_some() {
            return Err(BufferError::AlreadyBound);
        }
        if offset.checked_add(size).is_none_or(|end| end > self.size) {
            return Err(BufferError::OutOfRange {
                offset,
                size,
                capacity: self.size,
            });
        }
        let range = offset as usize..(offset + size) as usize;
        self.bound = Some(range.clone());
        Ok(&mut self.data[range])
    }

    /// Ends the binding and returns the bound range widened to the copy
    /// alignment.
    pub(crate) fn unbind(&mut self) -> Result<Range<usize>, BufferError> {
        let range = self.bound.take().ok_or(BufferError::NotBound)?;
        let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
        let start = range.start / align * align;
        let end = range.end.div_ceil(align) * align;
        Ok(start..end)
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }
}
