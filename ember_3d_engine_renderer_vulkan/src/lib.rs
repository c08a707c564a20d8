/*!
# Ember3D - Vulkan Backend

Vulkan implementation of the `GraphicsDevice` trait of `ember_3d_engine`,
built on Ash with Vulkan 1.3 dynamic rendering and synchronization2.

Every resource (buffer, image, swapchain, pipeline) keeps the native device
alive through a shared context, so resources may be dropped in any order
relative to each other; the device itself goes last.

```no_run
use ember_3d_engine_renderer_vulkan::ember3d::VulkanDevice;
use ember_3d_engine_renderer_vulkan::ember3d::device::Extent2D;
use ember_3d_engine_renderer_vulkan::ember3d::render::{Config, Renderer};
# fn run(window: &winit::window::Window) -> ember_3d_engine::ember3d::Result<()> {
let config = Config::default();
let device = VulkanDevice::new(window, &config)?;
let mut renderer = Renderer::new(device, config, Extent2D::new(1280, 720))?;
# Ok(())
# }
```
*/

// Vulkan implementation modules
mod vulkan_context;
mod vulkan_memory;
mod vulkan_format;
mod vulkan_buffer;
mod vulkan_image;
mod vulkan_swapchain;
mod vulkan_pipeline;
mod vulkan_commands;
mod vulkan_transfer;
mod vulkan_device;
#[cfg_attr(not(feature = "vulkan-validation"), allow(dead_code))]
mod debug;

/// Public namespace of the Vulkan backend
pub mod ember3d {
    pub use crate::vulkan_buffer::VulkanBuffer;
    pub use crate::vulkan_device::VulkanDevice;
    pub use crate::vulkan_image::VulkanImage;
    pub use crate::vulkan_pipeline::VulkanPipeline;
    pub use crate::vulkan_swapchain::VulkanSwapchain;

    // Validation statistics
    pub use crate::debug::{get_validation_stats, print_validation_stats_report, ValidationStats};

    // Engine namespaces, so applications can depend on this crate alone
    pub use ember_3d_engine::ember3d::{device, log, render, resource, scene, Error, Result};
}
