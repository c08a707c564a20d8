/// Command recording helpers shared by the `GraphicsDevice` implementation

use ash::vk;
use ember_3d_engine::ember3d::device::{ImageLayout, Rect2D, Viewport};

use crate::vulkan_format::{destination_scope, image_layout_to_vk, source_scope, BarrierScope};
use crate::vulkan_image::full_range;

/// Source and destination scopes of a layout transition
///
/// Swapchain images leaving the undefined layout are chained to the
/// color-attachment-output stage, where the acquire semaphore is waited on.
/// The depth image is shared by every frame in flight, so clearing it waits
/// for the depth writes of the previous frame.
pub(crate) fn transition_scopes(
    aspect: vk::ImageAspectFlags,
    old_layout: ImageLayout,
    new_layout: ImageLayout,
    acquired: bool,
) -> (BarrierScope, BarrierScope) {
    let mut source = source_scope(old_layout);
    if old_layout == ImageLayout::Undefined {
        if acquired {
            source.stage = vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT;
        } else if aspect.contains(vk::ImageAspectFlags::DEPTH) {
            source = BarrierScope {
                stage: vk::PipelineStageFlags2::EARLY_FRAGMENT_TESTS
                    | vk::PipelineStageFlags2::LATE_FRAGMENT_TESTS,
                access: vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE,
            };
        }
    }
    (source, destination_scope(new_layout))
}

/// Record a single synchronization2 layout transition
pub(crate) unsafe fn transition_image(
    device: &ash::Device,
    command_buffer: vk::CommandBuffer,
    image: vk::Image,
    aspect: vk::ImageAspectFlags,
    old_layout: ImageLayout,
    new_layout: ImageLayout,
    acquired: bool,
) {
    let (source, destination) = transition_scopes(aspect, old_layout, new_layout, acquired);
    let barrier = vk::ImageMemoryBarrier2::default()
        .src_stage_mask(source.stage)
        .src_access_mask(source.access)
        .dst_stage_mask(destination.stage)
        .dst_access_mask(destination.access)
        .old_layout(image_layout_to_vk(old_layout))
        .new_layout(image_layout_to_vk(new_layout))
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(full_range(aspect));
    let barriers = [barrier];
    let dependency = vk::DependencyInfo::default().image_memory_barriers(&barriers);
    device.cmd_pipeline_barrier2(command_buffer, &dependency);
}

/// Begin dynamic rendering with one cleared color and one cleared depth attachment
///
/// Color is stored for presentation; depth is discarded after the pass.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn begin_rendering(
    device: &ash::Device,
    command_buffer: vk::CommandBuffer,
    color_view: vk::ImageView,
    depth_view: vk::ImageView,
    render_area: Rect2D,
    clear_color: [f32; 4],
    clear_depth: f32,
) {
    let color_attachments = [vk::RenderingAttachmentInfo::default()
        .image_view(color_view)
        .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .clear_value(vk::ClearValue {
            color: vk::ClearColorValue { float32: clear_color },
        })];
    let depth_attachment = vk::RenderingAttachmentInfo::default()
        .image_view(depth_view)
        .image_layout(vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::DONT_CARE)
        .clear_value(vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth: clear_depth, stencil: 0 },
        });

    let rendering_info = vk::RenderingInfo::default()
        .render_area(rect_to_vk(render_area))
        .layer_count(1)
        .color_attachments(&color_attachments)
        .depth_attachment(&depth_attachment);
    device.cmd_begin_rendering(command_buffer, &rendering_info);
}

pub(crate) fn rect_to_vk(rect: Rect2D) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D { x: rect.x, y: rect.y },
        extent: vk::Extent2D { width: rect.width, height: rect.height },
    }
}

pub(crate) fn viewport_to_vk(viewport: Viewport) -> vk::Viewport {
    vk::Viewport {
        x: viewport.x,
        y: viewport.y,
        width: viewport.width,
        height: viewport.height,
        min_depth: viewport.min_depth,
        max_depth: viewport.max_depth,
    }
}
