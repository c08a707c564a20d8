/// Image trait, image descriptor, formats and layouts

use bitflags::bitflags;

/// Image pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum ImageFormat {
    /// Material textures
    R8G8B8A8_SRGB,
    /// Swapchain images
    B8G8R8A8_SRGB,
    /// Depth attachment
    D32_SFLOAT,
}

impl ImageFormat {
    /// Bytes per texel
    ///
    /// The match is exhaustive: adding a format without a size does not compile.
    pub fn bytes_per_texel(self) -> u64 {
        match self {
            ImageFormat::R8G8B8A8_SRGB | ImageFormat::B8G8R8A8_SRGB | ImageFormat::D32_SFLOAT => 4,
        }
    }

    pub fn is_depth(self) -> bool {
        matches!(self, ImageFormat::D32_SFLOAT)
    }
}

/// 2D extent in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// No pixels to draw into (minimized window)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, 1.0 for empty extents
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// 3D extent in texels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extent3D {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self { width, height, depth }
    }
}

impl From<Extent2D> for Extent3D {
    fn from(extent: Extent2D) -> Self {
        Self::new(extent.width, extent.height, 1)
    }
}

bitflags! {
    /// Image usage flags (bit values match Vulkan's `VkImageUsageFlagBits`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const TRANSFER_SRC = 0x1;
        const TRANSFER_DST = 0x2;
        const SAMPLED = 0x4;
        const STORAGE = 0x8;
        const COLOR_ATTACHMENT = 0x10;
        const DEPTH_STENCIL_ATTACHMENT = 0x20;
    }
}

/// Image layouts used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    Undefined,
    General,
    ColorAttachment,
    DepthAttachment,
    PresentSrc,
}

/// Descriptor for creating an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    pub extent: Extent3D,
    pub format: ImageFormat,
    pub usage: ImageUsage,
}

impl ImageDesc {
    /// Sampled 2D texture filled through a staged upload
    pub fn texture_2d(width: u32, height: u32, format: ImageFormat) -> Self {
        Self {
            extent: Extent3D::new(width, height, 1),
            format,
            usage: ImageUsage::SAMPLED | ImageUsage::TRANSFER_DST,
        }
    }

    /// Depth attachment matching a swapchain extent
    pub fn depth_attachment(extent: Extent2D, format: ImageFormat) -> Self {
        Self {
            extent: extent.into(),
            format,
            usage: ImageUsage::DEPTH_STENCIL_ATTACHMENT,
        }
    }

    /// Size in bytes of the full image
    pub fn size_bytes(&self) -> u64 {
        image_size_bytes(self.format, self.extent)
    }
}

/// `bytes_per_texel × width × height × depth`
pub fn image_size_bytes(format: ImageFormat, extent: Extent3D) -> u64 {
    format.bytes_per_texel()
        * u64::from(extent.width)
        * u64::from(extent.height)
        * u64::from(extent.depth)
}

/// GPU image with its default view, owned by exactly one higher-level object
///
/// Dropping the image destroys the view, the image and frees its memory.
pub trait Image {
    fn extent(&self) -> Extent3D;

    fn format(&self) -> ImageFormat;

    /// Size in bytes of the full image
    fn size_bytes(&self) -> u64 {
        image_size_bytes(self.format(), self.extent())
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
