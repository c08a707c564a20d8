/// GpuContext - Native handles shared by every Vulkan object
///
/// Contains everything a resource needs to release itself:
/// - Instance and logical device
/// - Surface and its loader
/// - Queues and queue families
/// - Memory-type table
///
/// Buffers, images, swapchains and pipelines each hold an `Arc<GpuContext>`,
/// so the logical device and the instance are destroyed only after the last
/// resource created on them.

use ash::vk;
use ember_3d_engine::ember3d::device::{MemoryPropertyFlags, MemoryType, QueueFamilySelection};

use crate::debug::DebugMessenger;

pub struct GpuContext {
    /// Vulkan loader entry (must outlive the instance)
    #[allow(dead_code)]
    pub(crate) entry: ash::Entry,
    pub(crate) instance: ash::Instance,
    pub(crate) physical_device: vk::PhysicalDevice,
    pub(crate) device: ash::Device,

    pub(crate) surface_loader: ash::khr::surface::Instance,
    pub(crate) surface: vk::SurfaceKHR,
    pub(crate) swapchain_loader: ash::khr::swapchain::Device,

    pub(crate) graphics_queue: vk::Queue,
    pub(crate) present_queue: vk::Queue,
    pub(crate) queue_families: QueueFamilySelection,

    /// Memory-type table in engine terms
    pub(crate) memory_types: Vec<MemoryType>,

    /// Validation messenger (None when validation is disabled)
    pub(crate) debug_messenger: Option<DebugMessenger>,
}

impl GpuContext {
    /// Resolve and allocate device memory for `requirements`
    ///
    /// # Returns
    ///
    /// `Error::NoSuitableMemoryType` when no memory type matches both the
    /// resource's type bits and `required`
    pub(crate) fn allocate_memory(
        &self,
        requirements: vk::MemoryRequirements,
        required: MemoryPropertyFlags,
    ) -> ember_3d_engine::ember3d::Result<vk::DeviceMemory> {
        crate::vulkan_memory::allocate_device_memory(
            &self.device,
            &self.memory_types,
            requirements,
            required,
        )
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            // Messenger goes after the device so teardown messages are still reported
            if let Some(messenger) = self.debug_messenger.take() {
                messenger.destroy();
            }
            self.instance.destroy_instance(None);
        }
    }
}
