/// Memory-type table and first-fit memory-type resolver
///
/// Backends describe each memory type of the physical device with a
/// [`MemoryType`]. Resource creation asks [`find_memory_type_index`] for the
/// first type that is allowed by the resource's requirement bitmask and
/// carries every requested property flag.

use bitflags::bitflags;

bitflags! {
    /// Memory property flags (bit values match Vulkan's `VkMemoryPropertyFlagBits`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryPropertyFlags: u32 {
        /// Fast device memory, usually not host-visible
        const DEVICE_LOCAL = 0x1;
        /// Can be mapped for host access
        const HOST_VISIBLE = 0x2;
        /// Host writes visible to the device without explicit flushes
        const HOST_COHERENT = 0x4;
        /// Cached on the host
        const HOST_CACHED = 0x8;
        /// Lazily allocated (transient attachments)
        const LAZILY_ALLOCATED = 0x10;
    }
}

impl MemoryPropertyFlags {
    /// Properties used for persistently mapped, directly written buffers
    pub const HOST_WRITABLE: Self = Self::HOST_VISIBLE.union(Self::HOST_COHERENT);
}

/// One entry of the physical device's memory-type table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryType {
    /// Properties of this memory type
    pub properties: MemoryPropertyFlags,
    /// Heap this type allocates from
    pub heap_index: u32,
}

/// Find the lowest-indexed memory type allowed by `type_bits` that has all of `required`
///
/// # Arguments
///
/// * `memory_types` - Memory-type table of the physical device
/// * `type_bits` - Bitmask from the resource's memory requirements (bit i allows type i)
/// * `required` - Property flags the memory type must contain
///
/// # Returns
///
/// The memory-type index, or `None` when no type satisfies both constraints
pub fn find_memory_type_index(
    memory_types: &[MemoryType],
    type_bits: u32,
    required: MemoryPropertyFlags,
) -> Option<u32> {
    memory_types
        .iter()
        .enumerate()
        .take(32)
        .find(|(index, memory_type)| {
            type_bits & (1 << index) != 0 && memory_type.properties.contains(required)
        })
        .map(|(index, _)| index as u32)
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
