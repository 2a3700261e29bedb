#![cfg(feature = "integration-tests")]

mod common;

use common::test_utils::{headless_device, read_buffer};
use demo_kit::buffers::{
    BufferError, BufferStrategy, GpuBuffer, MappedBuffer, PersistentBuffer, SubDataBuffer,
    create_buffer,
};

const USAGE: wgpu::BufferUsages = wgpu::BufferUsages::VERTEX.union(wgpu::BufferUsages::COPY_SRC);

fn write(buffer: &mut dyn GpuBuffer, offset: u64, bytes: &[u8]) {
    buffer
        .bind(offset, bytes.len() as u64)
        .unwrap()
        .copy_from_slice(bytes);
}

#[tokio::test]
async fn persistent_buffer_needs_a_region() {
    let Some((device, _queue)) = headless_device().await else {
        eprintln!("No adapter available, skipping");
        return;
    };

    assert!(matches!(
        create_buffer(&device, BufferStrategy::Persistent { regions: 0 }, USAGE, 16, "ring"),
        Err(BufferError::NoRegions)
    ));
    assert!(matches!(
        PersistentBuffer::new(&device, USAGE, 16, 0, "ring"),
        Err(BufferError::NoRegions)
    ));
    assert!(create_buffer(&device, BufferStrategy::Persistent { regions: 3 }, USAGE, 16, "ring").is_ok());
}

#[tokio::test]
async fn persistent_buffer_writes_into_the_current_region() {
    let Some((device, queue)) = headless_device().await else {
        eprintln!("No adapter available, skipping");
        return;
    };

    let mut ring = PersistentBuffer::new(&device, USAGE, 8, 2, "ring").unwrap();
    assert_eq!(ring.num_buffers(), 2);
    ring.next_buffer();
    assert_eq!(ring.buffer_index(), 1);
    assert_eq!(ring.region_offset(), 8);

    write(&mut ring, 4, &[1, 2, 3, 4]);
    ring.unbind(&device, &queue).unwrap();

    let bytes = read_buffer(&device, &queue, ring.buffer(), 16);
    assert_eq!(bytes, [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4]);

    ring.next_buffer();
    assert_eq!(ring.buffer_index(), 0);
    assert_eq!(ring.region_offset(), 0);
}

#[tokio::test]
async fn orphaning_sub_data_buffer_replaces_the_gpu_buffer() {
    let Some((device, queue)) = headless_device().await else {
        eprintln!("No adapter available, skipping");
        return;
    };

    let mut orphaning = SubDataBuffer::new(&device, USAGE, 8, true, "orphan");
    assert!(orphaning.is_orphaning());
    let before = orphaning.buffer().clone();
    write(&mut orphaning, 4, &[5, 6, 7, 8]);
    orphaning.unbind(&device, &queue).unwrap();
    assert!(*orphaning.buffer() != before);
    // the whole prefix is uploaded into the new buffer
    assert_eq!(read_buffer(&device, &queue, orphaning.buffer(), 8), [0, 0, 0, 0, 5, 6, 7, 8]);

    let mut kept = SubDataBuffer::new(&device, USAGE, 8, false, "kept");
    let before = kept.buffer().clone();
    write(&mut kept, 0, &[1, 1, 1, 1]);
    kept.unbind(&device, &queue).unwrap();
    assert!(*kept.buffer() == before);
    assert_eq!(kept.unbind(&device, &queue), Err(BufferError::NotBound));
}

#[tokio::test]
async fn mapped_buffer_uploads_only_the_bound_range() {
    let Some((device, queue)) = headless_device().await else {
        eprintln!("No adapter available, skipping");
        return;
    };

    let mut mapped = MappedBuffer::new(&device, USAGE, 8, "mapped");
    write(&mut mapped, 0, &[9, 9, 9, 9, 9, 9, 9, 9]);
    mapped.unbind(&device, &queue).unwrap();
    write(&mut mapped, 4, &[1, 2, 3, 4]);
    mapped.unbind(&device, &queue).unwrap();

    assert_eq!(read_buffer(&device, &queue, mapped.buffer(), 8), [9, 9, 9, 9, 1, 2, 3, 4]);
}
