use std::ops::Range;

use super::{BufferError, GpuBuffer, Staging, align_size, create_raw};

/// Region bookkeeping of a [`PersistentBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ring {
    stride: u64,
    regions: u32,
    index: u32,
}

impl Ring {
    pub(crate) fn new(size: u64, regions: u32) -> Result<Self, BufferError> {
        if regions == 0 {
            return Err(BufferError::NoRegions);
        }
        Ok(Self {
            stride: align_size(size),
            regions,
            index: 0,
        })
    }

    /// Bytes needed for all regions.
    pub(crate) fn total_size(&self) -> u64 {
        self.stride * self.regions as u64
    }

    pub(crate) fn advance(&mut self) {
        self.index = (self.index + 1) % self.regions;
    }

    pub(crate) fn offset(&self) -> u64 {
        self.index as u64 * self.stride
    }

    /// Where bytes written at `written` inside a region land in the buffer.
    pub(crate) fn upload_offset(&self, written: &Range<usize>) -> u64 {
        self.offset() + written.start as u64
    }
}

/// One GPU buffer split into `regions` equally sized regions. Each frame
/// writes into the current region while the GPU may still read the previous
/// ones; [`next_buffer`](Self::next_buffer) moves on to the next region.
///
/// Draw calls must add [`region_offset`](GpuBuffer::region_offset) to their
/// buffer offsets.
#[derive(Debug)]
pub struct PersistentBuffer {
    buffer: wgpu::Buffer,
    staging: Staging,
    size: u64,
    ring: Ring,
}

impl PersistentBuffer {
    pub fn new(
        device: &wgpu::Device,
        usage: wgpu::BufferUsages,
        size: u64,
        regions: u32,
        label: &str,
    ) -> Result<Self, BufferError> {
        let ring = Ring::new(size, regions)?;
        Ok(Self {
            buffer: create_raw(device, usage, ring.total_size(), label),
            staging: Staging::new(size),
            size,
            ring,
        })
    }

    pub fn next_buffer(&mut self) {
        self.ring.advance();
    }

    pub fn buffer_index(&self) -> u32 {
        self.ring.index
    }

    pub fn num_buffers(&self) -> u32 {
        self.ring.regions
    }
}

impl GpuBuffer for PersistentBuffer {
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
                self.ring.upload_offset(&written),
                &self.staging.data()[written],
            );
        }
        Ok(())
    }

    fn region_offset(&self) -> u64 {
        self.ring.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_regions_is_an_error() {
        assert_eq!(Ring::new(16, 0), Err(BufferError::NoRegions));
    }

    #[test]
    fn regions_are_spaced_by_the_aligned_size() {
        let mut ring = Ring::new(10, 3).unwrap();
        assert_eq!(ring.total_size(), 36);
        assert_eq!(ring.offset(), 0);
        ring.advance();
        assert_eq!(ring.offset(), 12);
        assert_eq!(ring.upload_offset(&(4..8)), 16);
        ring.advance();
        assert_eq!(ring.offset(), 24);
    }

    #[test]
    fn advancing_wraps_to_the_first_region() {
        let mut ring = Ring::new(8, 2).unwrap();
        ring.advance();
        ring.advance();
        assert_eq!(ring.index, 0);
        assert_eq!(ring.offset(), 0);

        let mut single = Ring::new(8, 1).unwrap();
        single.advance();
        assert_eq!(single.offset(), 0);
    }
}
