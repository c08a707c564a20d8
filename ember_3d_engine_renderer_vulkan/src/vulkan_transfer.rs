/// Staged transfers - one-shot copies through host-visible staging buffers
///
/// Every write into device-local memory records a copy into its own command
/// buffer, submits it with a fresh fence and leaves a `TransferRecord` in the
/// device's pending mailbox. Nothing waits at submit time; the records are
/// drained together by `wait_for_transfers`.

use ash::vk;
use ember_3d_engine::ember3d::device::{Buffer, BufferDesc, BufferUsage, Image};
use ember_3d_engine::ember3d::Result;
use ember_3d_engine::{engine_bail, engine_err, engine_trace};

use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_device::VulkanDevice;
use crate::vulkan_commands::transition_image;
use crate::vulkan_image::VulkanImage;
use ember_3d_engine::ember3d::device::ImageLayout;

/// In-flight staged copy
///
/// The staging buffer, fence and command buffer live until the fence has
/// signaled and the mailbox is drained.
pub(crate) struct TransferRecord {
    pub(crate) staging: VulkanBuffer,
    pub(crate) fence: vk::Fence,
    pub(crate) command_buffer: vk::CommandBuffer,
}

impl VulkanDevice {
    /// Host-visible staging buffer already holding `data`
    fn create_staging(&mut self, data: &[u8]) -> Result<VulkanBuffer> {
        let staging = VulkanBuffer::new(
            self.ctx.clone(),
            &BufferDesc::host_visible(data.len() as u64, BufferUsage::TRANSFER_SRC),
        )?;
        staging.write(0, data)?;
        Ok(staging)
    }

    /// Allocate and begin a one-shot command buffer
    fn begin_one_shot(&mut self) -> Result<vk::CommandBuffer> {
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        unsafe {
            let command_buffer = self
                .ctx
                .device
                .allocate_command_buffers(&allocate_info)
                .map_err(|e| engine_err!("ember3d::vulkan::Transfer", "Failed to allocate transfer command buffer: {:?}", e))?
                .into_iter()
                .next()
                .ok_or_else(|| engine_err!("ember3d::vulkan::Transfer", "Driver returned no command buffer"))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            if let Err(e) = self.ctx.device.begin_command_buffer(command_buffer, &begin_info) {
                self.ctx.device.free_command_buffers(self.command_pool, &[command_buffer]);
                return Err(engine_err!("ember3d::vulkan::Transfer", "Failed to begin transfer command buffer: {:?}", e));
            }
            Ok(command_buffer)
        }
    }

    /// End, submit with a fresh fence and return the fence
    ///
    /// Frees `command_buffer` when anything fails.
    fn submit_one_shot(&mut self, command_buffer: vk::CommandBuffer) -> Result<vk::Fence> {
        let device = &self.ctx.device;
        unsafe {
            let submitted = (|| -> Result<vk::Fence> {
                device
                    .end_command_buffer(command_buffer)
                    .map_err(|e| engine_err!("ember3d::vulkan::Transfer", "Failed to end transfer command buffer: {:?}", e))?;

                let fence = device
                    .create_fence(&vk::FenceCreateInfo::default(), None)
                    .map_err(|e| engine_err!("ember3d::vulkan::Transfer", "Failed to create transfer fence: {:?}", e))?;

                let command_buffers = [vk::CommandBufferSubmitInfo::default().command_buffer(command_buffer)];
                let submit_info = vk::SubmitInfo2::default().command_buffer_infos(&command_buffers);
                if let Err(e) = device.queue_submit2(self.ctx.graphics_queue, &[submit_info], fence) {
                    device.destroy_fence(fence, None);
                    return Err(engine_err!("ember3d::vulkan::Transfer", "Failed to submit transfer: {:?}", e));
                }
                Ok(fence)
            })();

            if submitted.is_err() {
                device.free_command_buffers(self.command_pool, &[command_buffer]);
            }
            submitted
        }
    }

    /// Staged path of `set_buffer_data`
    pub(crate) fn stage_buffer_copy(&mut self, buffer: &VulkanBuffer, offset: u64, data: &[u8]) -> Result<()> {
        let staging = self.create_staging(data)?;
        let command_buffer = self.begin_one_shot()?;

        let region = vk::BufferCopy {
            src_offset: 0,
            dst_offset: offset,
            size: data.len() as u64,
        };
        unsafe {
            self.ctx
                .device
                .cmd_copy_buffer(command_buffer, staging.buffer, buffer.buffer, &[region]);
        }

        let fence = self.submit_one_shot(command_buffer)?;
        self.pending.push(TransferRecord { staging, fence, command_buffer });
        engine_trace!(
            "ember3d::vulkan::Transfer",
            "Staged {} bytes at offset {} ({} pending)",
            data.len(),
            offset,
            self.pending.len()
        );
        Ok(())
    }

    /// Staged path of `set_image_data`
    pub(crate) fn stage_image_copy(&mut self, image: &VulkanImage, data: &[u8]) -> Result<()> {
        let extent = image.extent();
        if extent.depth != 1 {
            engine_bail!("ember3d::vulkan::Transfer", "Image upload requires depth 1, got {}", extent.depth);
        }
        if data.len() as u64 != image.size_bytes() {
            engine_bail!(
                "ember3d::vulkan::Transfer",
                "Image upload of {} bytes into an image of {} bytes",
                data.len(),
                image.size_bytes()
            );
        }

        let staging = self.create_staging(data)?;
        let command_buffer = self.begin_one_shot()?;

        let region = vk::BufferImageCopy {
            buffer_offset: 0,
            buffer_row_length: extent.width,
            buffer_image_height: 0,
            image_subresource: vk::ImageSubresourceLayers {
                aspect_mask: image.aspect(),
                mip_level: 0,
                base_array_layer: 0,
                layer_count: 1,
            },
            image_offset: vk::Offset3D { x: 0, y: 0, z: 0 },
            image_extent: vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            },
        };

        unsafe {
            let device = &self.ctx.device;
            transition_image(
                device,
                command_buffer,
                image.image,
                image.aspect(),
                ImageLayout::Undefined,
                ImageLayout::General,
                false,
            );
            device.cmd_copy_buffer_to_image(
                command_buffer,
                staging.buffer,
                image.image,
                vk::ImageLayout::GENERAL,
                &[region],
            );
        }

        let fence = self.submit_one_shot(command_buffer)?;
        self.pending.push(TransferRecord { staging, fence, command_buffer });
        Ok(())
    }

    /// Idle the device, batch-wait every pending fence, then reclaim the records
    ///
    /// On failure nothing is reclaimed.
    pub(crate) fn drain_transfers(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let ctx = &self.ctx;
        let command_pool = self.command_pool;

        unsafe {
            ctx.device
                .device_wait_idle()
                .map_err(|e| engine_err!("ember3d::vulkan::Transfer", "Failed to wait idle before draining transfers: {:?}", e))?;
        }

        let reclaimed = self.pending.drain(
            |records| {
                let fences: Vec<vk::Fence> = records.iter().map(|record| record.fence).collect();
                unsafe {
                    ctx.device
                        .wait_for_fences(&fences, true, u64::MAX)
                        .map_err(|e| engine_err!("ember3d::vulkan::Transfer", "Failed to wait for transfer fences: {:?}", e))
                }
            },
            |record| unsafe {
                ctx.device.destroy_fence(record.fence, None);
                ctx.device.free_command_buffers(command_pool, &[record.command_buffer]);
                // staging buffer dropped here
            },
        )?;

        engine_trace!("ember3d::vulkan::Transfer", "Drained {} transfer(s)", reclaimed);
        Ok(())
    }

    /// Copy the contents of any buffer back to the host
    ///
    /// Pending transfers are drained first so staged writes are visible.
    /// Device-local buffers go through a temporary host-visible buffer.
    pub fn read_buffer(&mut self, buffer: &VulkanBuffer) -> Result<Vec<u8>> {
        self.drain_transfers()?;
        if buffer.is_host_visible() {
            return buffer.read_mapped();
        }

        let readback = VulkanBuffer::new(
            self.ctx.clone(),
            &BufferDesc::host_visible(buffer.size(), BufferUsage::TRANSFER_DST),
        )?;
        let command_buffer = self.begin_one_shot()?;
        let region = vk::BufferCopy {
            src_offset: 0,
            dst_offset: 0,
            size: buffer.size(),
        };
        unsafe {
            self.ctx
                .device
                .cmd_copy_buffer(command_buffer, buffer.buffer, readback.buffer, &[region]);
        }
        let fence = self.submit_one_shot(command_buffer)?;

        let waited = unsafe {
            self.ctx
                .device
                .wait_for_fences(&[fence], true, u64::MAX)
                .map_err(|e| engine_err!("ember3d::vulkan::Transfer", "Failed to wait for read-back: {:?}", e))
        };
        unsafe {
            self.ctx.device.destroy_fence(fence, None);
            self.ctx.device.free_command_buffers(self.command_pool, &[command_buffer]);
        }
        waited?;

        readback.read_mapped()
    }
}
