/// Frame scheduler - frames in flight
///
/// The scheduler owns one [`FrameSlot`] per frame in flight. Slots are used
/// round-robin; a slot is only re-recorded after the fence of its previous
/// submission has signaled, so at most `frames_in_flight` frames are ever
/// queued on the GPU and per-slot buffers are never written while in use.

use crate::error::{Error, Result};
use crate::graphics_device::{BufferDesc, BufferUsage, DescriptorResource, DescriptorSetKind, GraphicsDevice};
use crate::resource::GlobalUniforms;
use crate::{engine_debug, engine_error};

/// Per-frame command buffer, synchronization and uniforms
pub struct FrameSlot<D: GraphicsDevice> {
    pub command_buffer: D::CommandBuffer,
    /// Signaled when the slot's last submission completed (created signaled)
    pub ready: D::Fence,
    /// Signaled by image acquisition, waited by the submission
    pub image_acquired: D::Semaphore,
    /// Signaled by the submission, waited by presentation
    pub render_finished: D::Semaphore,
    /// Host-visible view-projection uniforms (set 0)
    pub global_uniforms: D::Buffer,
    pub global_set: D::DescriptorSet,
}

impl<D: GraphicsDevice> FrameSlot<D> {
    fn destroy(self, device: &mut D) {
        device.destroy_fence(self.ready);
        device.destroy_semaphore(self.image_acquired);
        device.destroy_semaphore(self.render_finished);
        device.free_command_buffer(self.command_buffer);
        // global_uniforms released on drop
    }
}

/// Handles created for a slot before it is complete
///
/// Lets a failing `FrameScheduler::new` release exactly what it created.
struct PartialSlot<D: GraphicsDevice> {
    command_buffer: Option<D::CommandBuffer>,
    ready: Option<D::Fence>,
    image_acquired: Option<D::Semaphore>,
    render_finished: Option<D::Semaphore>,
}

impl<D: GraphicsDevice> PartialSlot<D> {
    fn new() -> Self {
        Self {
            command_buffer: None,
            ready: None,
            image_acquired: None,
            render_finished: None,
        }
    }

    fn build(&mut self, device: &mut D) -> Result<FrameSlot<D>> {
        let command_buffer = *self.command_buffer.insert(device.allocate_command_buffer()?);
        let ready = *self.ready.insert(device.create_fence(true)?);
        let image_acquired = *self.image_acquired.insert(device.create_semaphore()?);
        let render_finished = *self.render_finished.insert(device.create_semaphore()?);

        let global_uniforms = device.create_buffer(&BufferDesc::host_visible(
            std::mem::size_of::<GlobalUniforms>() as u64,
            BufferUsage::UNIFORM,
        ))?;
        let global_set = device.allocate_descriptor_set(DescriptorSetKind::Global)?;
        device.update_descriptor_set(global_set, 0, DescriptorResource::UniformBuffer(&global_uniforms));

        Ok(FrameSlot {
            command_buffer,
            ready,
            image_acquired,
            render_finished,
            global_uniforms,
            global_set,
        })
    }

    fn destroy(self, device: &mut D) {
        if let Some(fence) = self.ready {
            device.destroy_fence(fence);
        }
        for semaphore in [self.image_acquired, self.render_finished].into_iter().flatten() {
            device.destroy_semaphore(semaphore);
        }
        if let Some(command_buffer) = self.command_buffer {
            device.free_command_buffer(command_buffer);
        }
    }
}

pub struct FrameScheduler<D: GraphicsDevice> {
    slots: Vec<FrameSlot<D>>,
    next_index: usize,
}

impl<D: GraphicsDevice> FrameScheduler<D> {
    /// Create `frames_in_flight` slots
    ///
    /// On failure everything created so far is destroyed before the error is
    /// returned.
    pub fn new(device: &mut D, frames_in_flight: usize) -> Result<Self> {
        if frames_in_flight == 0 {
            return Err(Error::InvalidResource("frames_in_flight must be at least 1".to_string()));
        }
        let mut slots: Vec<FrameSlot<D>> = Vec::with_capacity(frames_in_flight);
        for index in 0..frames_in_flight {
            let mut partial = PartialSlot::new();
            match partial.build(device) {
                Ok(slot) => slots.push(slot),
                Err(error) => {
                    engine_error!(
                        "ember3d::FrameScheduler",
                        "Failed to create frame slot {}: {}",
                        index,
                        error
                    );
                    partial.destroy(device);
                    for slot in slots {
                        slot.destroy(device);
                    }
                    return Err(error);
                }
            }
        }

        engine_debug!("ember3d::FrameScheduler", "Created {} frame slots", frames_in_flight);
        Ok(Self { slots, next_index: 0 })
    }

    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    /// Slot the next `begin_frame` will use
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn slot(&self, index: usize) -> &FrameSlot<D> {
        &self.slots[index]
    }

    /// Select the next slot and wait until it is free
    ///
    /// Advances `next_index`, waits for the slot's ready fence and resets it.
    ///
    /// # Returns
    ///
    /// Index of the slot to record into
    pub fn begin_frame(&mut self, device: &mut D) -> Result<usize> {
        let index = self.next_index;
        self.next_index = (self.next_index + 1) % self.slots.len();

        let ready = self.slots[index].ready;
        device.wait_for_fence(ready)?;
        device.reset_fence(ready)?;
        Ok(index)
    }

    /// Submit the slot's command buffer
    ///
    /// Waits on "image acquired", signals "render finished" and the ready fence.
    pub fn submit(&self, device: &mut D, index: usize) -> Result<()> {
        let slot = &self.slots[index];
        device.submit(slot.command_buffer, slot.image_acquired, slot.render_finished, slot.ready)
    }

    /// Wait for the device to go idle, then release every slot
    pub fn destroy(self, device: &mut D) -> Result<()> {
        let idle = device.wait_idle();
        if let Err(error) = &idle {
            engine_error!("ember3d::FrameScheduler", "Wait idle before teardown failed: {}", error);
        }
        for slot in self.slots {
            slot.destroy(device);
        }
        idle
    }
}

#[cfg(test)]
#[path = "frame_scheduler_tests.rs"]
mod tests;
