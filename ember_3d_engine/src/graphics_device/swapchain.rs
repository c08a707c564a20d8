/// Swapchain trait and presentation settings

use crate::graphics_device::{Extent2D, ImageFormat, QueueFamilySelection};

/// Color format of every swapchain (8-bit BGRA, sRGB non-linear)
pub const SWAPCHAIN_FORMAT: ImageFormat = ImageFormat::B8G8R8A8_SRGB;

/// Minimum number of presentable images
pub const MIN_SWAPCHAIN_IMAGES: u32 = 2;

/// How swapchain images are shared between queue families
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharingMode {
    /// One family owns the images
    Exclusive,
    /// Images are used concurrently by the listed families
    Concurrent(Vec<u32>),
}

/// Sharing mode for swapchain images
///
/// Exclusive when graphics and present share a family, concurrent across
/// both families otherwise (no ownership-transfer barriers needed).
pub fn swapchain_sharing(families: QueueFamilySelection) -> SharingMode {
    if families.is_unified() {
        SharingMode::Exclusive
    } else {
        SharingMode::Concurrent(vec![families.graphics, families.present])
    }
}

/// Presentable image chain bound to the window surface
///
/// Dropping the swapchain destroys every image view, then the swapchain.
/// Resizing is done by dropping it and creating a new one.
pub trait Swapchain {
    /// Number of presentable images
    fn image_count(&self) -> usize;

    /// Extent of the images in pixels
    fn extent(&self) -> Extent2D;

    /// Pixel format of the images
    fn format(&self) -> ImageFormat;
}
