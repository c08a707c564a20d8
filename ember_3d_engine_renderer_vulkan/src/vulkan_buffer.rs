/// VulkanBuffer - Vulkan implementation of the Buffer trait

use ash::vk;
use ember_3d_engine::ember3d::device::{
    check_write_range, Buffer, BufferDesc, BufferUsage, MemoryPropertyFlags,
};
use ember_3d_engine::ember3d::{Error, Result};
use ember_3d_engine::{engine_err, engine_error};
use std::ptr::NonNull;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::buffer_usage_to_vk;

/// Vulkan buffer with its own memory allocation
///
/// Host-visible buffers stay mapped from creation until drop.
pub struct VulkanBuffer {
    ctx: Arc<GpuContext>,
    pub(crate) buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: u64,
    /// Persistent mapping (host-visible buffers only)
    mapped: Option<NonNull<u8>>,
}

impl VulkanBuffer {
    /// Create a buffer, allocate and bind its memory, map it when host-visible
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared GPU context
    /// * `desc` - Size, usage and memory placement
    pub(crate) fn new(ctx: Arc<GpuContext>, desc: &BufferDesc) -> Result<Self> {
        if desc.size == 0 {
            ember_3d_engine::engine_bail!("ember3d::vulkan::Buffer", "Cannot create an empty buffer");
        }

        // Device-local buffers are also copy sources so they can be read back
        let usage = if desc.host_visible {
            desc.effective_usage()
        } else {
            desc.effective_usage() | BufferUsage::TRANSFER_SRC
        };
        let create_info = vk::BufferCreateInfo::default()
            .size(desc.size)
            .usage(buffer_usage_to_vk(usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let required = if desc.host_visible {
            MemoryPropertyFlags::HOST_WRITABLE
        } else {
            MemoryPropertyFlags::DEVICE_LOCAL
        };

        unsafe {
            let buffer = ctx
                .device
                .create_buffer(&create_info, None)
                .map_err(|e| engine_err!("ember3d::vulkan::Buffer", "Failed to create buffer: {:?}", e))?;

            let requirements = ctx.device.get_buffer_memory_requirements(buffer);
            let memory = match ctx.allocate_memory(requirements, required) {
                Ok(memory) => memory,
                Err(error) => {
                    ctx.device.destroy_buffer(buffer, None);
                    return Err(error);
                }
            };

            // From here on, drop releases buffer and memory
            let mut allocated = Self {
                ctx,
                buffer,
                memory,
                size: desc.size,
                mapped: None,
            };

            allocated
                .ctx
                .device
                .bind_buffer_memory(buffer, memory, 0)
                .map_err(|e| engine_err!("ember3d::vulkan::Buffer", "Failed to bind buffer memory: {:?}", e))?;

            if desc.host_visible {
                let pointer = allocated
                    .ctx
                    .device
                    .map_memory(memory, 0, vk::WHOLE_SIZE, vk::MemoryMapFlags::empty())
                    .map_err(|e| engine_err!("ember3d::vulkan::Buffer", "Failed to map buffer memory: {:?}", e))?;
                allocated.mapped = NonNull::new(pointer.cast::<u8>());
            }

            Ok(allocated)
        }
    }

    /// Direct path: copy `data` into the mapping at `offset`
    pub(crate) fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        check_write_range(self.size, offset, data.len())?;
        let Some(mapped) = self.mapped else {
            engine_error!("ember3d::vulkan::Buffer", "Direct write into a buffer without mapping");
            return Err(Error::InvalidResource("buffer is not host-visible".to_string()));
        };
        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                mapped.as_ptr().add(offset as usize),
                data.len(),
            );
        }
        Ok(())
    }

    /// Copy the whole mapping out (host-visible buffers only)
    pub(crate) fn read_mapped(&self) -> Result<Vec<u8>> {
        let Some(mapped) = self.mapped else {
            return Err(Error::InvalidResource("buffer is not host-visible".to_string()));
        };
        let mut contents = vec![0u8; self.size as usize];
        unsafe {
            std::ptr::copy_nonoverlapping(mapped.as_ptr(), contents.as_mut_ptr(), contents.len());
        }
        Ok(contents)
    }
}

// The mapping is owned by this buffer and only reached through `&self`/`&mut self`
unsafe impl Send for VulkanBuffer {}

impl Buffer for VulkanBuffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn is_host_visible(&self) -> bool {
        self.mapped.is_some()
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        unsafe {
            if self.mapped.take().is_some() {
                self.ctx.device.unmap_memory(self.memory);
            }
            self.ctx.device.destroy_buffer(self.buffer, None);
            self.ctx.device.free_memory(self.memory, None);
        }
    }
}
