/// Mock graphics device for unit tests (no GPU required)
///
/// Every call is appended to a shared event log. Resources record their own
/// destruction when dropped, so tests can check creation/destruction order.
/// Staged writes are applied to the destination when the transfers are
/// drained, which mimics the GPU completing the copy at the fence.
///
/// Fences follow the device rules: submitting requires an unsignaled fence,
/// the simulated GPU signals it when the host waits on it, and waiting on a
/// fence that was reset but never submitted fails instead of hanging.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    check_write_range, Buffer, BufferDesc, BufferUsage, DescriptorResource, DescriptorSetKind,
    Extent2D, Extent3D, GraphicsDevice, Image, ImageDesc, ImageFormat, ImageLayout, ImageTarget,
    ImageTransition, MemoryPropertyFlags, MemoryType, PendingTransfers, PipelineDesc, Rect2D,
    RenderingInfo, Swapchain, Viewport, SWAPCHAIN_FORMAT,
};

// ============================================================================
// Events
// ============================================================================

/// Image referenced by a recorded command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockTarget {
    Swapchain { swapchain: u64, index: u32 },
    Image(u64),
}

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    WaitIdle,
    CreateBuffer { id: u64, size: u64, host_visible: bool },
    DestroyBuffer(u64),
    WriteDirect { buffer: u64, offset: u64, len: usize },
    StageBufferCopy { buffer: u64, offset: u64, len: usize },
    CreateImage { id: u64, extent: Extent3D, format: ImageFormat },
    DestroyImage(u64),
    StageImageCopy { image: u64, len: usize },
    WaitForTransfers { count: usize },
    CreateSwapchain { id: u64, extent: Extent2D },
    CreateImageView { swapchain: u64, index: u32 },
    DestroyImageView { swapchain: u64, index: u32 },
    DestroySwapchain(u64),
    AcquireNextImage { swapchain: u64, signal: u64, image_index: u32 },
    Present { swapchain: u64, image_index: u32, wait: u64 },
    CreateFence { id: u64, signaled: bool },
    DestroyFence(u64),
    WaitForFence(u64),
    ResetFence(u64),
    CreateSemaphore(u64),
    DestroySemaphore(u64),
    AllocateCommandBuffer(u64),
    FreeCommandBuffer(u64),
    BeginCommandBuffer(u64),
    EndCommandBuffer(u64),
    Submit { command_buffer: u64, wait: u64, signal: u64, fence: u64 },
    CreatePipeline(u64),
    DestroyPipeline(u64),
    AllocateDescriptorSet { id: u64, kind: DescriptorSetKind },
    UpdateDescriptorSet { set: u64, binding: u32 },
    TransitionImage { target: MockTarget, old_layout: ImageLayout, new_layout: ImageLayout },
    BeginRendering { swapchain: u64, image_index: u32, depth: u64 },
    EndRendering,
    BindPipeline(u64),
    SetViewport(Viewport),
    SetScissor(Rect2D),
    BindDescriptorSet { set_index: u32, set: u64 },
    PushConstants(Vec<u8>),
    BindVertexBuffer(u64),
    BindIndexBuffer(u64),
    DrawIndexed { index_count: u32, first_index: u32, vertex_offset: i32 },
}

/// Calls the mock can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    CreateBuffer,
    CreateImage,
    CreateSemaphore,
    AcquireNextImage,
    Submit,
    Present,
    WaitForTransfers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FenceState {
    Signaled,
    Unsignaled,
    /// Submitted, signaled by the simulated GPU when waited on
    Pending,
}

/// Shared state between the device and the resources it created
#[derive(Debug, Default)]
pub struct DeviceLog {
    pub events: Vec<DeviceEvent>,
    next_id: u64,
    fences: FxHashMap<u64, FenceState>,
    /// Command buffer -> fence of its last submission
    submissions: FxHashMap<u64, u64>,
    max_unsignaled_fences: usize,
    live_buffers: usize,
    live_images: usize,
    live_swapchains: usize,
}

impl DeviceLog {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, event: DeviceEvent) {
        self.events.push(event);
    }

    fn unsignaled_fences(&self) -> usize {
        self.fences.values().filter(|state| **state != FenceState::Signaled).count()
    }

    fn track_unsignaled(&mut self) {
        self.max_unsignaled_fences = self.max_unsignaled_fences.max(self.unsignaled_fences());
    }
}

type SharedLog = Rc<RefCell<DeviceLog>>;

// ============================================================================
// Resources
// ============================================================================

pub struct MockBuffer {
    id: u64,
    size: u64,
    host_visible: bool,
    contents: Rc<RefCell<Vec<u8>>>,
    log: SharedLog,
}

impl MockBuffer {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Bytes as the device would see them
    pub fn contents(&self) -> Vec<u8> {
        self.contents.borrow().clone()
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn is_host_visible(&self) -> bool {
        self.host_visible
    }
}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        let mut log = self.log.borrow_mut();
        log.live_buffers -= 1;
        log.record(DeviceEvent::DestroyBuffer(self.id));
    }
}

pub struct MockImage {
    id: u64,
    extent: Extent3D,
    format: ImageFormat,
    contents: Rc<RefCell<Vec<u8>>>,
    log: SharedLog,
}

impl MockImage {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn contents(&self) -> Vec<u8> {
        self.contents.borrow().clone()
    }
}

impl Image for MockImage {
    fn extent(&self) -> Extent3D {
        self.extent
    }

    fn format(&self) -> ImageFormat {
        self.format
    }
}

impl Drop for MockImage {
    fn drop(&mut self) {
        let mut log = self.log.borrow_mut();
        log.live_images -= 1;
        log.record(DeviceEvent::DestroyImage(self.id));
    }
}

pub struct MockSwapchain {
    id: u64,
    extent: Extent2D,
    image_count: u32,
    next_image: RefCell<u32>,
    log: SharedLog,
}

impl MockSwapchain {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Swapchain for MockSwapchain {
    fn image_count(&self) -> usize {
        self.image_count as usize
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn format(&self) -> ImageFormat {
        SWAPCHAIN_FORMAT
    }
}

impl Drop for MockSwapchain {
    fn drop(&mut self) {
        let mut log = self.log.borrow_mut();
        for index in 0..self.image_count {
            log.record(DeviceEvent::DestroyImageView { swapchain: self.id, index });
        }
        log.record(DeviceEvent::DestroySwapchain(self.id));
        log.live_swapchains -= 1;
    }
}

pub struct MockPipeline {
    id: u64,
    log: SharedLog,
}

impl MockPipeline {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for MockPipeline {
    fn drop(&mut self) {
        self.log.borrow_mut().record(DeviceEvent::DestroyPipeline(self.id));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFence(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSemaphore(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockCommandBuffer(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockDescriptorSet(pub u64);

/// Staged copy waiting for the next drain
struct MockTransfer {
    staging: MockBuffer,
    destination: Rc<RefCell<Vec<u8>>>,
    offset: usize,
}

/// Read-only view of a device's log
#[derive(Clone)]
pub struct DeviceProbe {
    log: SharedLog,
}

impl DeviceProbe {
    pub fn events(&self) -> Vec<DeviceEvent> {
        self.log.borrow().events.clone()
    }

    pub fn live_fences(&self) -> usize {
        self.log.borrow().fences.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.log.borrow().live_buffers
    }

    pub fn live_images(&self) -> usize {
        self.log.borrow().live_images
    }

    pub fn live_swapchains(&self) -> usize {
        self.log.borrow().live_swapchains
    }
}

// ============================================================================
// Device
// ============================================================================

pub struct MockGraphicsDevice {
    log: SharedLog,
    memory_types: Vec<MemoryType>,
    pending: PendingTransfers<MockTransfer>,
    failures: Vec<FailPoint>,
    swapchain_image_count: u32,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(DeviceLog::default())),
            memory_types: vec![
                MemoryType { properties: MemoryPropertyFlags::DEVICE_LOCAL, heap_index: 0 },
                MemoryType { properties: MemoryPropertyFlags::HOST_WRITABLE, heap_index: 1 },
            ],
            pending: PendingTransfers::new(),
            failures: Vec::new(),
            swapchain_image_count: 3,
        }
    }

    /// Make the next call of `point` fail with a backend error
    pub fn fail_next(&mut self, point: FailPoint) {
        self.failures.push(point);
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<DeviceEvent> {
        self.log.borrow().events.clone()
    }

    pub fn clear_events(&mut self) {
        self.log.borrow_mut().events.clear();
    }

    /// Highest number of simultaneously unsignaled fences seen so far
    pub fn max_unsignaled_fences(&self) -> usize {
        self.log.borrow().max_unsignaled_fences
    }

    /// Number of fences currently alive
    pub fn live_fences(&self) -> usize {
        self.log.borrow().fences.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.log.borrow().live_buffers
    }

    pub fn live_images(&self) -> usize {
        self.log.borrow().live_images
    }

    pub fn live_swapchains(&self) -> usize {
        self.log.borrow().live_swapchains
    }

    /// Handle observing this device after it has been moved into an owner
    pub fn probe(&self) -> DeviceProbe {
        DeviceProbe { log: self.log.clone() }
    }

    fn check_failure(&mut self, point: FailPoint) -> Result<()> {
        if let Some(position) = self.failures.iter().position(|p| *p == point) {
            self.failures.remove(position);
            return Err(Error::BackendError(format!("injected failure: {:?}", point)));
        }
        Ok(())
    }

    fn record(&self, event: DeviceEvent) {
        self.log.borrow_mut().record(event);
    }

    fn target_of(target: &ImageTarget<'_, Self>) -> MockTarget {
        match target {
            ImageTarget::Swapchain(swapchain, index) => MockTarget::Swapchain {
                swapchain: swapchain.id,
                index: *index,
            },
            ImageTarget::Image(image) => MockTarget::Image(image.id),
        }
    }

    fn stage(&mut self, destination: Rc<RefCell<Vec<u8>>>, offset: usize, data: &[u8]) -> Result<()> {
        let staging = self.create_buffer(&BufferDesc::host_visible(
            data.len() as u64,
            BufferUsage::TRANSFER_SRC,
        ))?;
        self.set_buffer_data(&staging, 0, data)?;
        self.pending.push(MockTransfer { staging, destination, offset });
        Ok(())
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    type Buffer = MockBuffer;
    type Image = MockImage;
    type Swapchain = MockSwapchain;
    type Pipeline = MockPipeline;
    type Fence = MockFence;
    type Semaphore = MockSemaphore;
    type CommandBuffer = MockCommandBuffer;
    type DescriptorSet = MockDescriptorSet;

    fn memory_types(&self) -> &[MemoryType] {
        &self.memory_types
    }

    fn wait_idle(&mut self) -> Result<()> {
        let mut log = self.log.borrow_mut();
        for state in log.fences.values_mut() {
            if *state == FenceState::Pending {
                *state = FenceState::Signaled;
            }
        }
        log.record(DeviceEvent::WaitIdle);
        Ok(())
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<MockBuffer> {
        self.check_failure(FailPoint::CreateBuffer)?;
        let mut log = self.log.borrow_mut();
        let id = log.next_id();
        log.live_buffers += 1;
        log.record(DeviceEvent::CreateBuffer {
            id,
            size: desc.size,
            host_visible: desc.host_visible,
        });
        Ok(MockBuffer {
            id,
            size: desc.size,
            host_visible: desc.host_visible,
            contents: Rc::new(RefCell::new(vec![0; desc.size as usize])),
            log: self.log.clone(),
        })
    }

    fn set_buffer_data(&mut self, buffer: &MockBuffer, offset: u64, data: &[u8]) -> Result<()> {
        check_write_range(buffer.size, offset, data.len())?;

        if buffer.host_visible {
            let start = offset as usize;
            buffer.contents.borrow_mut()[start..start + data.len()].copy_from_slice(data);
            self.record(DeviceEvent::WriteDirect { buffer: buffer.id, offset, len: data.len() });
            return Ok(());
        }

        self.stage(buffer.contents.clone(), offset as usize, data)?;
        self.record(DeviceEvent::StageBufferCopy { buffer: buffer.id, offset, len: data.len() });
        Ok(())
    }

    fn create_image(&mut self, desc: &ImageDesc) -> Result<MockImage> {
        self.check_failure(FailPoint::CreateImage)?;
        let mut log = self.log.borrow_mut();
        let id = log.next_id();
        log.live_images += 1;
        log.record(DeviceEvent::CreateImage { id, extent: desc.extent, format: desc.format });
        Ok(MockImage {
            id,
            extent: desc.extent,
            format: desc.format,
            contents: Rc::new(RefCell::new(vec![0; desc.size_bytes() as usize])),
            log: self.log.clone(),
        })
    }

    fn set_image_data(&mut self, image: &MockImage, data: &[u8]) -> Result<()> {
        if image.extent.depth != 1 {
            crate::engine_bail!("ember3d::Mock", "Image upload requires depth 1");
        }
        if data.len() as u64 != image.size_bytes() {
            crate::engine_bail!("ember3d::Mock", "Image upload size mismatch");
        }
        self.stage(image.contents.clone(), 0, data)?;
        self.record(DeviceEvent::StageImageCopy { image: image.id, len: data.len() });
        Ok(())
    }

    fn wait_for_transfers(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.check_failure(FailPoint::WaitForTransfers)?;
        self.wait_idle()?;

        let count = self.pending.len();
        self.record(DeviceEvent::WaitForTransfers { count });
        self.pending.drain(
            |_| Ok(()),
            |transfer| {
                let bytes = transfer.staging.contents();
                let mut destination = transfer.destination.borrow_mut();
                destination[transfer.offset..transfer.offset + bytes.len()].copy_from_slice(&bytes);
                // staging buffer dropped here
            },
        )?;
        Ok(())
    }

    fn pending_transfer_count(&self) -> usize {
        self.pending.len()
    }

    fn create_swapchain(&mut self, extent: Extent2D) -> Result<MockSwapchain> {
        let image_count = self.swapchain_image_count;
        let mut log = self.log.borrow_mut();
        let id = log.next_id();
        log.live_swapchains += 1;
        log.record(DeviceEvent::CreateSwapchain { id, extent });
        for index in 0..image_count {
            log.record(DeviceEvent::CreateImageView { swapchain: id, index });
        }
        Ok(MockSwapchain {
            id,
            extent,
            image_count,
            next_image: RefCell::new(0),
            log: self.log.clone(),
        })
    }

    fn acquire_next_image(&mut self, swapchain: &MockSwapchain, signal: MockSemaphore) -> Result<u32> {
        self.check_failure(FailPoint::AcquireNextImage)?;
        let image_index = {
            let mut next = swapchain.next_image.borrow_mut();
            let index = *next;
            *next = (index + 1) % swapchain.image_count;
            index
        };
        self.record(DeviceEvent::AcquireNextImage {
            swapchain: swapchain.id,
            signal: signal.0,
            image_index,
        });
        Ok(image_index)
    }

    fn present(&mut self, swapchain: &MockSwapchain, image_index: u32, wait: MockSemaphore) -> Result<()> {
        self.check_failure(FailPoint::Present)?;
        self.record(DeviceEvent::Present { swapchain: swapchain.id, image_index, wait: wait.0 });
        Ok(())
    }

    fn create_fence(&mut self, signaled: bool) -> Result<MockFence> {
        let mut log = self.log.borrow_mut();
        let id = log.next_id();
        let state = if signaled { FenceState::Signaled } else { FenceState::Unsignaled };
        log.fences.insert(id, state);
        log.track_unsignaled();
        log.record(DeviceEvent::CreateFence { id, signaled });
        Ok(MockFence(id))
    }

    fn destroy_fence(&mut self, fence: MockFence) {
        let mut log = self.log.borrow_mut();
        log.fences.remove(&fence.0);
        log.record(DeviceEvent::DestroyFence(fence.0));
    }

    fn wait_for_fence(&mut self, fence: MockFence) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.record(DeviceEvent::WaitForFence(fence.0));
        match log.fences.get(&fence.0).copied() {
            Some(FenceState::Signaled) => Ok(()),
            Some(FenceState::Pending) => {
                log.fences.insert(fence.0, FenceState::Signaled);
                Ok(())
            }
            Some(FenceState::Unsignaled) => Err(Error::BackendError(format!(
                "deadlock: fence {} waited on but never submitted",
                fence.0
            ))),
            None => Err(Error::InvalidResource(format!("unknown fence {}", fence.0))),
        }
    }

    fn reset_fence(&mut self, fence: MockFence) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.record(DeviceEvent::ResetFence(fence.0));
        match log.fences.get(&fence.0).copied() {
            Some(FenceState::Pending) => Err(Error::BackendError(format!(
                "fence {} reset while still in use by the GPU",
                fence.0
            ))),
            Some(_) => {
                log.fences.insert(fence.0, FenceState::Unsignaled);
                log.track_unsignaled();
                Ok(())
            }
            None => Err(Error::InvalidResource(format!("unknown fence {}", fence.0))),
        }
    }

    fn create_semaphore(&mut self) -> Result<MockSemaphore> {
        self.check_failure(FailPoint::CreateSemaphore)?;
        let mut log = self.log.borrow_mut();
        let id = log.next_id();
        log.record(DeviceEvent::CreateSemaphore(id));
        Ok(MockSemaphore(id))
    }

    fn destroy_semaphore(&mut self, semaphore: MockSemaphore) {
        self.record(DeviceEvent::DestroySemaphore(semaphore.0));
    }

    fn allocate_command_buffer(&mut self) -> Result<MockCommandBuffer> {
        let mut log = self.log.borrow_mut();
        let id = log.next_id();
        log.record(DeviceEvent::AllocateCommandBuffer(id));
        Ok(MockCommandBuffer(id))
    }

    fn free_command_buffer(&mut self, command_buffer: MockCommandBuffer) {
        let mut log = self.log.borrow_mut();
        log.submissions.remove(&command_buffer.0);
        log.record(DeviceEvent::FreeCommandBuffer(command_buffer.0));
    }

    fn begin_command_buffer(&mut self, command_buffer: MockCommandBuffer) -> Result<()> {
        let mut log = self.log.borrow_mut();
        if let Some(fence) = log.submissions.get(&command_buffer.0).copied() {
            if log.fences.get(&fence).copied() == Some(FenceState::Pending) {
                return Err(Error::BackendError(format!(
                    "command buffer {} re-recorded while in flight",
                    command_buffer.0
                )));
            }
        }
        log.record(DeviceEvent::BeginCommandBuffer(command_buffer.0));
        Ok(())
    }

    fn end_command_buffer(&mut self, command_buffer: MockCommandBuffer) -> Result<()> {
        self.record(DeviceEvent::EndCommandBuffer(command_buffer.0));
        Ok(())
    }

    fn submit(
        &mut self,
        command_buffer: MockCommandBuffer,
        wait: MockSemaphore,
        signal: MockSemaphore,
        fence: MockFence,
    ) -> Result<()> {
        self.check_failure(FailPoint::Submit)?;
        let mut log = self.log.borrow_mut();
        match log.fences.get(&fence.0).copied() {
            Some(FenceState::Unsignaled) => {}
            other => {
                return Err(Error::BackendError(format!(
                    "submit with fence {} in state {:?}",
                    fence.0, other
                )))
            }
        }
        log.fences.insert(fence.0, FenceState::Pending);
        log.submissions.insert(command_buffer.0, fence.0);
        log.track_unsignaled();
        log.record(DeviceEvent::Submit {
            command_buffer: command_buffer.0,
            wait: wait.0,
            signal: signal.0,
            fence: fence.0,
        });
        Ok(())
    }

    fn create_pipeline(&mut self, _desc: &PipelineDesc<'_>) -> Result<MockPipeline> {
        let mut log = self.log.borrow_mut();
        let id = log.next_id();
        log.record(DeviceEvent::CreatePipeline(id));
        Ok(MockPipeline { id, log: self.log.clone() })
    }

    fn allocate_descriptor_set(&mut self, kind: DescriptorSetKind) -> Result<MockDescriptorSet> {
        let mut log = self.log.borrow_mut();
        let id = log.next_id();
        log.record(DeviceEvent::AllocateDescriptorSet { id, kind });
        Ok(MockDescriptorSet(id))
    }

    fn update_descriptor_set(
        &mut self,
        set: MockDescriptorSet,
        binding: u32,
        _resource: DescriptorResource<'_, Self>,
    ) {
        self.record(DeviceEvent::UpdateDescriptorSet { set: set.0, binding });
    }

    fn cmd_transition_image(&mut self, _command_buffer: MockCommandBuffer, transition: ImageTransition<'_, Self>) {
        self.record(DeviceEvent::TransitionImage {
            target: Self::target_of(&transition.target),
            old_layout: transition.old_layout,
            new_layout: transition.new_layout,
        });
    }

    fn cmd_begin_rendering(&mut self, _command_buffer: MockCommandBuffer, info: &RenderingInfo<'_, Self>) {
        self.record(DeviceEvent::BeginRendering {
            swapchain: info.swapchain.id,
            image_index: info.image_index,
            depth: info.depth.id,
        });
    }

    fn cmd_end_rendering(&mut self, _command_buffer: MockCommandBuffer) {
        self.record(DeviceEvent::EndRendering);
    }

    fn cmd_bind_pipeline(&mut self, _command_buffer: MockCommandBuffer, pipeline: &MockPipeline) {
        self.record(DeviceEvent::BindPipeline(pipeline.id));
    }

    fn cmd_set_viewport(&mut self, _command_buffer: MockCommandBuffer, viewport: Viewport) {
        self.record(DeviceEvent::SetViewport(viewport));
    }

    fn cmd_set_scissor(&mut self, _command_buffer: MockCommandBuffer, scissor: Rect2D) {
        self.record(DeviceEvent::SetScissor(scissor));
    }

    fn cmd_bind_descriptor_set(
        &mut self,
        _command_buffer: MockCommandBuffer,
        _pipeline: &MockPipeline,
        set_index: u32,
        set: MockDescriptorSet,
    ) {
        self.record(DeviceEvent::BindDescriptorSet { set_index, set: set.0 });
    }

    fn cmd_push_constants(&mut self, _command_buffer: MockCommandBuffer, _pipeline: &MockPipeline, data: &[u8]) {
        self.record(DeviceEvent::PushConstants(data.to_vec()));
    }

    fn cmd_bind_vertex_buffer(&mut self, _command_buffer: MockCommandBuffer, buffer: &MockBuffer) {
        self.record(DeviceEvent::BindVertexBuffer(buffer.id));
    }

    fn cmd_bind_index_buffer(&mut self, _command_buffer: MockCommandBuffer, buffer: &MockBuffer) {
        self.record(DeviceEvent::BindIndexBuffer(buffer.id));
    }

    fn cmd_draw_indexed(
        &mut self,
        _command_buffer: MockCommandBuffer,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) {
        self.record(DeviceEvent::DrawIndexed { index_count, first_index, vertex_offset });
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
