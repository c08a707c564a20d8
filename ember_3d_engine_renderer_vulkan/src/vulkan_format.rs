/// Conversions between engine enums and Vulkan enums

use ash::vk;
use ember_3d_engine::ember3d::device::{
    BufferUsage, ImageFormat, ImageLayout, ImageUsage, VertexFormat,
};

/// Convert an image format to Vulkan
pub(crate) fn format_to_vk(format: ImageFormat) -> vk::Format {
    match format {
        ImageFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        ImageFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        ImageFormat::D32_SFLOAT => vk::Format::D32_SFLOAT,
    }
}

/// Aspect of the default view of an image with `format`
pub(crate) fn aspect_for(format: ImageFormat) -> vk::ImageAspectFlags {
    if format.is_depth() {
        vk::ImageAspectFlags::DEPTH
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

pub(crate) fn image_layout_to_vk(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::General => vk::ImageLayout::GENERAL,
        ImageLayout::ColorAttachment => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthAttachment => vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL,
        ImageLayout::PresentSrc => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

/// Buffer usage flags (bit values are shared)
pub(crate) fn buffer_usage_to_vk(usage: BufferUsage) -> vk::BufferUsageFlags {
    vk::BufferUsageFlags::from_raw(usage.bits())
}

/// Image usage flags (bit values are shared)
pub(crate) fn image_usage_to_vk(usage: ImageUsage) -> vk::ImageUsageFlags {
    vk::ImageUsageFlags::from_raw(usage.bits())
}

pub(crate) fn vertex_format_to_vk(format: VertexFormat) -> vk::Format {
    match format {
        VertexFormat::Float32x2 => vk::Format::R32G32_SFLOAT,
        VertexFormat::Float32x3 => vk::Format::R32G32B32_SFLOAT,
        VertexFormat::Float32x4 => vk::Format::R32G32B32A32_SFLOAT,
        VertexFormat::Uint32x4 => vk::Format::R32G32B32A32_UINT,
    }
}

/// Stage and access masks on one side of a layout transition (sync2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BarrierScope {
    pub stage: vk::PipelineStageFlags2,
    pub access: vk::AccessFlags2,
}

/// Work that must finish before leaving `layout`
pub(crate) fn source_scope(layout: ImageLayout) -> BarrierScope {
    match layout {
        ImageLayout::Undefined => BarrierScope {
            stage: vk::PipelineStageFlags2::TOP_OF_PIPE,
            access: vk::AccessFlags2::NONE,
        },
        ImageLayout::ColorAttachment => BarrierScope {
            stage: vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT,
            access: vk::AccessFlags2::COLOR_ATTACHMENT_WRITE,
        },
        ImageLayout::DepthAttachment => BarrierScope {
            stage: vk::PipelineStageFlags2::LATE_FRAGMENT_TESTS,
            access: vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE,
        },
        ImageLayout::General | ImageLayout::PresentSrc => {
            BarrierScope {
                stage: vk::PipelineStageFlags2::ALL_COMMANDS,
                access: vk::AccessFlags2::MEMORY_WRITE,
            }
        }
    }
}

/// Work that must wait for the transition into `layout`
pub(crate) fn destination_scope(layout: ImageLayout) -> BarrierScope {
    match layout {
        ImageLayout::ColorAttachment => BarrierScope {
            stage: vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT,
            access: vk::AccessFlags2::COLOR_ATTACHMENT_READ
                | vk::AccessFlags2::COLOR_ATTACHMENT_WRITE,
        },
        ImageLayout::DepthAttachment => BarrierScope {
            stage: vk::PipelineStageFlags2::EARLY_FRAGMENT_TESTS
                | vk::PipelineStageFlags2::LATE_FRAGMENT_TESTS,
            access: vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ
                | vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE,
        },
        ImageLayout::PresentSrc => BarrierScope {
            stage: vk::PipelineStageFlags2::BOTTOM_OF_PIPE,
            access: vk::AccessFlags2::NONE,
        },
        ImageLayout::Undefined | ImageLayout::General => {
            BarrierScope {
                stage: vk::PipelineStageFlags2::ALL_COMMANDS,
                access: vk::AccessFlags2::MEMORY_READ | vk::AccessFlags2::MEMORY_WRITE,
            }
        }
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
