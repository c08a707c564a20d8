/// Command recording parameter types

use crate::graphics_device::{GraphicsDevice, ImageLayout};

/// Viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-extent viewport with depth range 0..1
    pub fn from_extent(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    pub fn from_extent(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Image addressed by a layout transition or an attachment
pub enum ImageTarget<'a, D: GraphicsDevice + ?Sized> {
    /// Presentable image `index` of a swapchain
    Swapchain(&'a D::Swapchain, u32),
    /// Standalone image (depth buffer, texture)
    Image(&'a D::Image),
}

/// Layout transition recorded before/after rendering
pub struct ImageTransition<'a, D: GraphicsDevice + ?Sized> {
    pub target: ImageTarget<'a, D>,
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
}

/// Parameters of a dynamic rendering pass (one color + one depth attachment)
pub struct RenderingInfo<'a, D: GraphicsDevice + ?Sized> {
    pub swapchain: &'a D::Swapchain,
    pub image_index: u32,
    pub depth: &'a D::Image,
    pub render_area: Rect2D,
    /// Color clear value (RGBA)
    pub clear_color: [f32; 4],
    /// Depth clear value
    pub clear_depth: f32,
}
