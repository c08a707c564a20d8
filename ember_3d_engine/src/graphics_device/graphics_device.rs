/// GraphicsDevice trait - the backend contract of the engine
///
/// A graphics device owns the logical device, its queues, the command pool,
/// the descriptor pool and the memory-type table. Exactly one device exists
/// per application and it outlives every resource it creates.
///
/// Resources (buffers, images, swapchains, pipelines) are owning values
/// released on drop. Synchronization primitives, command buffers and
/// descriptor sets are plain handles; the frame scheduler creates and
/// destroys them explicitly.
///
/// All methods are called from a single host thread.

use std::fmt;

use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, DescriptorResource, DescriptorSetKind, Extent2D, Image, ImageDesc,
    ImageTransition, MemoryType, PipelineDesc, Rect2D, RenderingInfo, Swapchain, Viewport,
};

pub trait GraphicsDevice {
    type Buffer: Buffer;
    type Image: Image;
    type Swapchain: Swapchain;
    type Pipeline;
    type Fence: Copy + PartialEq + fmt::Debug;
    type Semaphore: Copy + PartialEq + fmt::Debug;
    type CommandBuffer: Copy + PartialEq + fmt::Debug;
    type DescriptorSet: Copy + PartialEq + fmt::Debug;

    // ===== DEVICE =====

    /// Memory-type table of the physical device
    fn memory_types(&self) -> &[MemoryType];

    /// Block until the device has finished all submitted work
    fn wait_idle(&mut self) -> Result<()>;

    // ===== RESOURCE TRANSFER =====

    /// Create a buffer; host-visible buffers are mapped for their whole lifetime
    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Self::Buffer>;

    /// Write `data` at `offset`
    ///
    /// Host-visible buffers are written immediately through the mapping. Other
    /// buffers get a staged copy that completes by the next
    /// [`wait_for_transfers`](Self::wait_for_transfers). The caller must not
    /// write a host-visible buffer the GPU may still be reading.
    fn set_buffer_data(&mut self, buffer: &Self::Buffer, offset: u64, data: &[u8]) -> Result<()>;

    /// Create a device-local image with its default view
    fn create_image(&mut self, desc: &ImageDesc) -> Result<Self::Image>;

    /// Upload the full contents of a single-layer image through a staged copy
    ///
    /// The image is transitioned from undefined to the general layout before
    /// the copy. `data.len()` must equal the image size and the depth must be 1.
    fn set_image_data(&mut self, image: &Self::Image, data: &[u8]) -> Result<()>;

    /// Wait for every pending staged transfer and release its staging resources
    fn wait_for_transfers(&mut self) -> Result<()>;

    /// Number of staged transfers submitted but not yet drained
    fn pending_transfer_count(&self) -> usize;

    // ===== SWAPCHAIN =====

    /// Create a swapchain for the window surface
    fn create_swapchain(&mut self, extent: Extent2D) -> Result<Self::Swapchain>;

    /// Acquire the next presentable image, signaling `signal` when it is ready
    ///
    /// Waits without timeout.
    fn acquire_next_image(
        &mut self,
        swapchain: &Self::Swapchain,
        signal: Self::Semaphore,
    ) -> Result<u32>;

    /// Present `image_index` on the present queue once `wait` is signaled
    fn present(
        &mut self,
        swapchain: &Self::Swapchain,
        image_index: u32,
        wait: Self::Semaphore,
    ) -> Result<()>;

    // ===== SYNCHRONIZATION =====

    fn create_fence(&mut self, signaled: bool) -> Result<Self::Fence>;

    fn destroy_fence(&mut self, fence: Self::Fence);

    /// Block until `fence` is signaled
    fn wait_for_fence(&mut self, fence: Self::Fence) -> Result<()>;

    fn reset_fence(&mut self, fence: Self::Fence) -> Result<()>;

    fn create_semaphore(&mut self) -> Result<Self::Semaphore>;

    fn destroy_semaphore(&mut self, semaphore: Self::Semaphore);

    // ===== COMMAND BUFFERS =====

    /// Allocate a primary command buffer from the device command pool
    fn allocate_command_buffer(&mut self) -> Result<Self::CommandBuffer>;

    fn free_command_buffer(&mut self, command_buffer: Self::CommandBuffer);

    /// Reset and begin recording
    fn begin_command_buffer(&mut self, command_buffer: Self::CommandBuffer) -> Result<()>;

    fn end_command_buffer(&mut self, command_buffer: Self::CommandBuffer) -> Result<()>;

    /// Submit on the graphics queue
    ///
    /// Waits on `wait` at the color-attachment-output stage, signals `signal`
    /// and `fence` on completion.
    fn submit(
        &mut self,
        command_buffer: Self::CommandBuffer,
        wait: Self::Semaphore,
        signal: Self::Semaphore,
        fence: Self::Fence,
    ) -> Result<()>;

    // ===== PIPELINE & DESCRIPTORS =====

    /// Create the graphics pipeline for dynamic rendering
    fn create_pipeline(&mut self, desc: &PipelineDesc<'_>) -> Result<Self::Pipeline>;

    /// Allocate a descriptor set from the device pool
    ///
    /// Sets are reclaimed with the pool when the device is dropped.
    fn allocate_descriptor_set(&mut self, kind: DescriptorSetKind) -> Result<Self::DescriptorSet>;

    /// Point `binding` of `set` at a buffer or image
    fn update_descriptor_set(
        &mut self,
        set: Self::DescriptorSet,
        binding: u32,
        resource: DescriptorResource<'_, Self>,
    );

    // ===== RECORDING =====

    fn cmd_transition_image(
        &mut self,
        command_buffer: Self::CommandBuffer,
        transition: ImageTransition<'_, Self>,
    );

    /// Begin dynamic rendering into a swapchain image and a depth image
    fn cmd_begin_rendering(
        &mut self,
        command_buffer: Self::CommandBuffer,
        info: &RenderingInfo<'_, Self>,
    );

    fn cmd_end_rendering(&mut self, command_buffer: Self::CommandBuffer);

    fn cmd_bind_pipeline(&mut self, command_buffer: Self::CommandBuffer, pipeline: &Self::Pipeline);

    fn cmd_set_viewport(&mut self, command_buffer: Self::CommandBuffer, viewport: Viewport);

    fn cmd_set_scissor(&mut self, command_buffer: Self::CommandBuffer, scissor: Rect2D);

    fn cmd_bind_descriptor_set(
        &mut self,
        command_buffer: Self::CommandBuffer,
        pipeline: &Self::Pipeline,
        set_index: u32,
        set: Self::DescriptorSet,
    );

    /// Push per-draw constants to the vertex stage
    fn cmd_push_constants(
        &mut self,
        command_buffer: Self::CommandBuffer,
        pipeline: &Self::Pipeline,
        data: &[u8],
    );

    fn cmd_bind_vertex_buffer(&mut self, command_buffer: Self::CommandBuffer, buffer: &Self::Buffer);

    /// Bind a `u32` index buffer
    fn cmd_bind_index_buffer(&mut self, command_buffer: Self::CommandBuffer, buffer: &Self::Buffer);

    fn cmd_draw_indexed(
        &mut self,
        command_buffer: Self::CommandBuffer,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    );
}
