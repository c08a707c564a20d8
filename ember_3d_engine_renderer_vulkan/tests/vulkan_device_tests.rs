//! Integration tests for the Vulkan device
//!
//! These tests require a GPU and are marked with #[ignore].
//! Run with: cargo test -p ember_3d_engine_renderer_vulkan -- --ignored


use ember_3d_engine_renderer_vulkan::ember3d::device::{
    Buffer, BufferDesc, BufferUsage, DescriptorResource, DescriptorSetKind, Extent2D,
    GraphicsDevice, Image, ImageDesc, ImageFormat, MemoryPropertyFlags, Swapchain,
    SWAPCHAIN_FORMAT,
};
use ember_3d_engine_renderer_vulkan::ember3d::Error;
use gpu_test_utils::get_test_device;
use serial_test::serial;

// ============================================================================
// DEVICE
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_memory_types_include_device_local_and_host_writable() {
    let device = get_test_device();
    let device = device.lock().unwrap();

    let types = device.memory_types();
    assert!(!types.is_empty());
    assert!(types
        .iter()
        .any(|t| t.properties.contains(MemoryPropertyFlags::DEVICE_LOCAL)));
    assert!(types
        .iter()
        .any(|t| t.properties.contains(MemoryPropertyFlags::HOST_WRITABLE)));
    assert!(!device.device_name().is_empty());
}

// ============================================================================
// BUFFERS & TRANSFERS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_host_visible_write_is_immediate() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    let buffer = device
        .create_buffer(&BufferDesc::host_visible(16, BufferUsage::UNIFORM))
        .unwrap();
    assert!(buffer.is_host_visible());

    device.set_buffer_data(&buffer, 4, &[1, 2, 3, 4]).unwrap();
    assert_eq!(device.pending_transfer_count(), 0);

    let contents = device.read_buffer(&buffer).unwrap();
    assert_eq!(&contents[4..8], &[1, 2, 3, 4]);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_staged_write_lands_after_wait() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    let vertices: [f32; 6] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    let bytes: &[u8] = bytemuck::cast_slice(&vertices);
    let buffer = device
        .create_buffer(&BufferDesc::device_local(bytes.len() as u64, BufferUsage::VERTEX))
        .unwrap();
    assert!(!buffer.is_host_visible());

    device.set_buffer_data(&buffer, 0, bytes).unwrap();
    assert_eq!(device.pending_transfer_count(), 1);

    device.wait_for_transfers().unwrap();
    assert_eq!(device.pending_transfer_count(), 0);

    assert_eq!(device.read_buffer(&buffer).unwrap(), bytes);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_staged_writes_accumulate_until_drained() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    let buffer = device
        .create_buffer(&BufferDesc::device_local(8, BufferUsage::INDEX))
        .unwrap();
    device.set_buffer_data(&buffer, 0, &[1, 1, 1, 1]).unwrap();
    device.set_buffer_data(&buffer, 4, &[2, 2, 2, 2]).unwrap();
    assert_eq!(device.pending_transfer_count(), 2);

    // read_buffer drains first
    let contents = device.read_buffer(&buffer).unwrap();
    assert_eq!(device.pending_transfer_count(), 0);
    assert_eq!(contents, vec![1, 1, 1, 1, 2, 2, 2, 2]);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_out_of_range_write_is_rejected() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    let buffer = device
        .create_buffer(&BufferDesc::device_local(4, BufferUsage::VERTEX))
        .unwrap();
    let result = device.set_buffer_data(&buffer, 2, &[0; 4]);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(device.pending_transfer_count(), 0);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_wait_for_transfers_without_pending_is_noop() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    device.wait_for_transfers().unwrap();
    device.wait_for_transfers().unwrap();
    assert_eq!(device.pending_transfer_count(), 0);
}

// ============================================================================
// IMAGES
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_texture_upload() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    let image = device
        .create_image(&ImageDesc::texture_2d(4, 4, ImageFormat::R8G8B8A8_SRGB))
        .unwrap();
    assert_eq!(image.size_bytes(), 64);

    device.set_image_data(&image, &[255u8; 64]).unwrap();
    assert_eq!(device.pending_transfer_count(), 1);
    device.wait_for_transfers().unwrap();

    let set = device.allocate_descriptor_set(DescriptorSetKind::Material).unwrap();
    device.update_descriptor_set(set, 0, DescriptorResource::SampledImage(&image));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_texture_upload_size_mismatch_is_rejected() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    let image = device
        .create_image(&ImageDesc::texture_2d(4, 4, ImageFormat::R8G8B8A8_SRGB))
        .unwrap();
    let result = device.set_image_data(&image, &[0u8; 16]);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(device.pending_transfer_count(), 0);
}

// ============================================================================
// SWAPCHAIN & SYNCHRONIZATION
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_swapchain_creation() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    let swapchain = device.create_swapchain(Extent2D::new(800, 600)).unwrap();
    assert!(swapchain.image_count() >= 2);
    assert_eq!(swapchain.format(), SWAPCHAIN_FORMAT);
    assert!(!swapchain.extent().is_empty());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_swapchain_recreation() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    let first = device.create_swapchain(Extent2D::new(800, 600)).unwrap();
    device.wait_idle().unwrap();
    drop(first);
    let second = device.create_swapchain(Extent2D::new(800, 600)).unwrap();
    assert!(second.image_count() >= 2);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_signaled_fence_does_not_block() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    let fence = device.create_fence(true).unwrap();
    device.wait_for_fence(fence).unwrap();
    device.reset_fence(fence).unwrap();
    device.destroy_fence(fence);

    let semaphore = device.create_semaphore().unwrap();
    device.destroy_semaphore(semaphore);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_gpu_command_buffer_reuse() {
    let device = get_test_device();
    let mut device = device.lock().unwrap();

    let command_buffer = device.allocate_command_buffer().unwrap();
    for _ in 0..2 {
        device.begin_command_buffer(command_buffer).unwrap();
        device.end_command_buffer(command_buffer).unwrap();
    }
    device.free_command_buffer(command_buffer);
}
