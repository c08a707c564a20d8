/// Render targets - swapchain plus depth buffer
///
/// Both are sized to the window and recreated together. Fields drop in
/// declaration order: the depth image first, then the swapchain (its image
/// views, then the swapchain itself).

use crate::error::Result;
use crate::graphics_device::{Extent2D, GraphicsDevice, ImageDesc, ImageFormat, Swapchain};
use crate::engine_debug;

/// Depth attachment format
pub const DEPTH_FORMAT: ImageFormat = ImageFormat::D32_SFLOAT;

pub struct RenderTargets<D: GraphicsDevice> {
    depth: D::Image,
    swapchain: D::Swapchain,
    /// Extent the targets were requested for (the surface may clamp it)
    requested: Extent2D,
}

impl<D: GraphicsDevice> RenderTargets<D> {
    /// Create a swapchain and a matching depth image
    pub fn create(device: &mut D, extent: Extent2D) -> Result<Self> {
        let swapchain = device.create_swapchain(extent)?;
        let depth = device.create_image(&ImageDesc::depth_attachment(swapchain.extent(), DEPTH_FORMAT))?;
        engine_debug!(
            "ember3d::RenderTargets",
            "Created render targets {}x{} ({} images)",
            swapchain.extent().width,
            swapchain.extent().height,
            swapchain.image_count()
        );
        Ok(Self { depth, swapchain, requested: extent })
    }

    pub fn swapchain(&self) -> &D::Swapchain {
        &self.swapchain
    }

    pub fn depth(&self) -> &D::Image {
        &self.depth
    }

    /// Actual extent of the swapchain images
    pub fn extent(&self) -> Extent2D {
        self.swapchain.extent()
    }

    /// Whether the targets must be rebuilt for a window of `extent`
    pub fn is_outdated(&self, extent: Extent2D) -> bool {
        self.requested != extent
    }
}
