/// VulkanSwapchain - presentable image chain bound to the window surface

use ash::vk;
use ember_3d_engine::ember3d::device::{
    swapchain_sharing, Extent2D, ImageFormat, SharingMode, Swapchain, MIN_SWAPCHAIN_IMAGES,
    SWAPCHAIN_FORMAT,
};
use ember_3d_engine::ember3d::{Error, Result};
use ember_3d_engine::{engine_debug, engine_err, engine_error};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::format_to_vk;
use crate::vulkan_image::full_range;

/// Swapchain with one view per image
///
/// Dropping destroys every view, then the swapchain. Resizing is done by
/// dropping it and creating a new one.
pub struct VulkanSwapchain {
    ctx: Arc<GpuContext>,
    pub(crate) swapchain: vk::SwapchainKHR,
    pub(crate) images: Vec<vk::Image>,
    pub(crate) views: Vec<vk::ImageView>,
    extent: Extent2D,
}

impl VulkanSwapchain {
    /// Create a swapchain for `requested`, clamped to the surface capabilities
    pub(crate) fn new(ctx: Arc<GpuContext>, requested: Extent2D) -> Result<Self> {
        unsafe {
            let capabilities = ctx
                .surface_loader
                .get_physical_device_surface_capabilities(ctx.physical_device, ctx.surface)
                .map_err(|e| {
                    engine_err!("ember3d::vulkan::Swapchain", "Failed to get surface capabilities: {:?}", e)
                })?;

            let surface_formats = ctx
                .surface_loader
                .get_physical_device_surface_formats(ctx.physical_device, ctx.surface)
                .map_err(|e| {
                    engine_err!("ember3d::vulkan::Swapchain", "Failed to query surface formats: {:?}", e)
                })?;
            let vk_format = format_to_vk(SWAPCHAIN_FORMAT);
            let color_space = vk::ColorSpaceKHR::SRGB_NONLINEAR;
            if !surface_formats
                .iter()
                .any(|f| f.format == vk_format && f.color_space == color_space)
            {
                engine_error!(
                    "ember3d::vulkan::Swapchain",
                    "Surface does not support {:?} / {:?}",
                    vk_format,
                    color_space
                );
                return Err(Error::InitializationFailed(
                    "surface lacks B8G8R8A8_SRGB / SRGB_NONLINEAR".to_string(),
                ));
            }

            let extent = clamp_extent(requested, &capabilities);
            let image_count = choose_image_count(&capabilities);
            let sharing = swapchain_sharing(ctx.queue_families);

            let mut create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(ctx.surface)
                .min_image_count(image_count)
                .image_format(vk_format)
                .image_color_space(color_space)
                .image_extent(vk::Extent2D { width: extent.width, height: extent.height })
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(vk::PresentModeKHR::FIFO)
                .clipped(true);
            create_info = match &sharing {
                SharingMode::Exclusive => create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE),
                SharingMode::Concurrent(families) => create_info
                    .image_sharing_mode(vk::SharingMode::CONCURRENT)
                    .queue_family_indices(families),
            };

            let swapchain = ctx
                .swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(|e| engine_err!("ember3d::vulkan::Swapchain", "Failed to create swapchain: {:?}", e))?;

            // From here on, drop releases the swapchain and any views created
            let mut chain = Self {
                ctx,
                swapchain,
                images: Vec::new(),
                views: Vec::new(),
                extent,
            };

            chain.images = chain
                .ctx
                .swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| engine_err!("ember3d::vulkan::Swapchain", "Failed to get swapchain images: {:?}", e))?;

            for &image in &chain.images {
                let view_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(vk_format)
                    .subresource_range(full_range(vk::ImageAspectFlags::COLOR));
                let view = chain.ctx.device.create_image_view(&view_info, None).map_err(|e| {
                    engine_err!("ember3d::vulkan::Swapchain", "Failed to create swapchain image view: {:?}", e)
                })?;
                chain.views.push(view);
            }

            engine_debug!(
                "ember3d::vulkan::Swapchain",
                "Swapchain created: {}x{}, {} images",
                extent.width,
                extent.height,
                chain.images.len()
            );
            Ok(chain)
        }
    }
}

/// Requested extent clamped to the surface limits
///
/// A surface with a fixed current extent wins over the request.
pub(crate) fn clamp_extent(requested: Extent2D, capabilities: &vk::SurfaceCapabilitiesKHR) -> Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return Extent2D::new(capabilities.current_extent.width, capabilities.current_extent.height);
    }
    Extent2D::new(
        requested
            .width
            .clamp(capabilities.min_image_extent.width, capabilities.max_image_extent.width),
        requested
            .height
            .clamp(capabilities.min_image_extent.height, capabilities.max_image_extent.height),
    )
}

/// `max(2, min_image_count)`, capped by `max_image_count` (0 means no cap)
pub(crate) fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = MIN_SWAPCHAIN_IMAGES.max(capabilities.min_image_count);
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

impl Swapchain for VulkanSwapchain {
    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn format(&self) -> ImageFormat {
        SWAPCHAIN_FORMAT
    }
}

impl Drop for VulkanSwapchain {
    fn drop(&mut self) {
        unsafe {
            for &view in &self.views {
                self.ctx.device.destroy_image_view(view, None);
            }
            self.ctx.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
    }
}
