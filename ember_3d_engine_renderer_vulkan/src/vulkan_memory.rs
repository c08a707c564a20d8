/// Device memory - memory-type table conversion and allocation

use ash::vk;
use ember_3d_engine::ember3d::device::{find_memory_type_index, MemoryPropertyFlags, MemoryType};
use ember_3d_engine::ember3d::{Error, Result};
use ember_3d_engine::engine_error;

/// Convert Vulkan memory property flags (bit values are shared)
pub(crate) fn memory_flags_from_vk(flags: vk::MemoryPropertyFlags) -> MemoryPropertyFlags {
    MemoryPropertyFlags::from_bits_truncate(flags.as_raw())
}

/// Memory-type table of a physical device in engine terms
pub(crate) fn memory_type_table(properties: &vk::PhysicalDeviceMemoryProperties) -> Vec<MemoryType> {
    properties.memory_types[..properties.memory_type_count as usize]
        .iter()
        .map(|memory_type| MemoryType {
            properties: memory_flags_from_vk(memory_type.property_flags),
            heap_index: memory_type.heap_index,
        })
        .collect()
}

/// Allocate memory of the first type matching `requirements` and `required`
pub(crate) fn allocate_device_memory(
    device: &ash::Device,
    memory_types: &[MemoryType],
    requirements: vk::MemoryRequirements,
    required: MemoryPropertyFlags,
) -> Result<vk::DeviceMemory> {
    let Some(memory_type_index) =
        find_memory_type_index(memory_types, requirements.memory_type_bits, required)
    else {
        engine_error!(
            "ember3d::vulkan::Memory",
            "No memory type for bits {:#b} with flags {:?}",
            requirements.memory_type_bits,
            required
        );
        return Err(Error::NoSuitableMemoryType {
            type_bits: requirements.memory_type_bits,
            required: required.bits(),
        });
    };

    let allocate_info = vk::MemoryAllocateInfo::default()
        .allocation_size(requirements.size)
        .memory_type_index(memory_type_index);

    unsafe {
        device.allocate_memory(&allocate_info, None).map_err(|e| {
            engine_error!(
                "ember3d::vulkan::Memory",
                "Failed to allocate {} bytes of device memory: {:?}",
                requirements.size,
                e
            );
            match e {
                vk::Result::ERROR_OUT_OF_DEVICE_MEMORY | vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
                    Error::OutOfMemory
                }
                other => Error::BackendError(format!("vkAllocateMemory: {:?}", other)),
            }
        })
    }
}
