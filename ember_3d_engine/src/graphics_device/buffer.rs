/// Buffer trait and buffer descriptor

use bitflags::bitflags;
use crate::error::Result;

bitflags! {
    /// Buffer usage flags (bit values match Vulkan's `VkBufferUsageFlagBits`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Source of a transfer (staging buffers, read-back)
        const TRANSFER_SRC = 0x1;
        /// Destination of a transfer (staged uploads)
        const TRANSFER_DST = 0x2;
        /// Uniform buffer
        const UNIFORM = 0x10;
        /// Storage buffer
        const STORAGE = 0x20;
        /// Index buffer
        const INDEX = 0x40;
        /// Vertex buffer
        const VERTEX = 0x80;
    }
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
    /// Allocate host-visible, coherent memory and keep it mapped
    ///
    /// When false the buffer lives in device-local memory and every write
    /// goes through a staging buffer.
    pub host_visible: bool,
}

impl BufferDesc {
    /// Host-visible buffer written directly every frame
    pub fn host_visible(size: u64, usage: BufferUsage) -> Self {
        Self { size, usage, host_visible: true }
    }

    /// Device-local buffer filled through staged uploads
    pub fn device_local(size: u64, usage: BufferUsage) -> Self {
        Self { size, usage, host_visible: false }
    }

    /// Usage flags the backend must actually request
    ///
    /// Device-local buffers are always a transfer destination.
    pub fn effective_usage(&self) -> BufferUsage {
        if self.host_visible {
            self.usage
        } else {
            self.usage | BufferUsage::TRANSFER_DST
        }
    }
}

/// GPU buffer owned by exactly one higher-level object
///
/// Dropping the buffer frees its memory and destroys the native handle.
pub trait Buffer {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Whether the buffer is persistently mapped (direct writes allowed)
    fn is_host_visible(&self) -> bool;
}

/// Validate a write of `len` bytes at `offset` into a buffer of `size` bytes
///
/// # Returns
///
/// `Error::InvalidResource` for empty writes or writes past the end
pub fn check_write_range(size: u64, offset: u64, len: usize) -> Result<()> {
    if len == 0 {
        crate::engine_bail!("ember3d::Buffer", "Empty write at offset {}", offset);
    }
    let end = offset.checked_add(len as u64);
    match end {
        Some(end) if end <= size => Ok(()),
        _ => crate::engine_bail!(
            "ember3d::Buffer",
            "Write of {} bytes at offset {} exceeds buffer size {}",
            len,
            offset,
            size
        ),
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
