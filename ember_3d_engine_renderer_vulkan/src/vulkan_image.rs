/// VulkanImage - Vulkan implementation of the Image trait

use ash::vk;
use ember_3d_engine::ember3d::device::{Extent3D, Image, ImageDesc, ImageFormat, MemoryPropertyFlags};
use ember_3d_engine::ember3d::Result;
use ember_3d_engine::engine_err;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{aspect_for, format_to_vk, image_usage_to_vk};

/// Device-local 2D image with its default view
pub struct VulkanImage {
    ctx: Arc<GpuContext>,
    pub(crate) image: vk::Image,
    pub(crate) view: vk::ImageView,
    memory: vk::DeviceMemory,
    extent: Extent3D,
    format: ImageFormat,
}

impl VulkanImage {
    /// Create the image, bind device-local memory and create its view
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &ImageDesc) -> Result<Self> {
        let vk_format = format_to_vk(desc.format);
        let create_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(vk_format)
            .extent(vk::Extent3D {
                width: desc.extent.width,
                height: desc.extent.height,
                depth: desc.extent.depth,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(image_usage_to_vk(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        unsafe {
            let image = ctx
                .device
                .create_image(&create_info, None)
                .map_err(|e| engine_err!("ember3d::vulkan::Image", "Failed to create image: {:?}", e))?;

            let requirements = ctx.device.get_image_memory_requirements(image);
            let memory = match ctx.allocate_memory(requirements, MemoryPropertyFlags::DEVICE_LOCAL) {
                Ok(memory) => memory,
                Err(error) => {
                    ctx.device.destroy_image(image, None);
                    return Err(error);
                }
            };

            let mut allocated = Self {
                ctx,
                image,
                view: vk::ImageView::null(),
                memory,
                extent: desc.extent,
                format: desc.format,
            };

            allocated
                .ctx
                .device
                .bind_image_memory(image, memory, 0)
                .map_err(|e| engine_err!("ember3d::vulkan::Image", "Failed to bind image memory: {:?}", e))?;

            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(vk_format)
                .subresource_range(full_range(aspect_for(desc.format)));
            allocated.view = allocated
                .ctx
                .device
                .create_image_view(&view_info, None)
                .map_err(|e| engine_err!("ember3d::vulkan::Image", "Failed to create image view: {:?}", e))?;

            Ok(allocated)
        }
    }

    pub(crate) fn aspect(&self) -> vk::ImageAspectFlags {
        aspect_for(self.format)
    }
}

/// Single mip, single layer subresource range
pub(crate) fn full_range(aspect_mask: vk::ImageAspectFlags) -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask,
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}

impl Image for VulkanImage {
    fn extent(&self) -> Extent3D {
        self.extent
    }

    fn format(&self) -> ImageFormat {
        self.format
    }
}

impl Drop for VulkanImage {
    fn drop(&mut self) {
        unsafe {
            if self.view != vk::ImageView::null() {
                self.ctx.device.destroy_image_view(self.view, None);
            }
            self.ctx.device.destroy_image(self.image, None);
            self.ctx.device.free_memory(self.memory, None);
        }
    }
}
