/// Physical device selection policy
///
/// Backends enumerate adapters and describe each one as a
/// [`PhysicalDeviceInfo`]; [`select_physical_device`] applies the selection
/// policy without touching the native API, which keeps it testable.

use crate::error::{Error, Result};

/// Kind of physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalDeviceType {
    DiscreteGpu,
    IntegratedGpu,
    VirtualGpu,
    Cpu,
    Other,
}

/// Capabilities of one queue family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueFamilyInfo {
    /// Family supports graphics commands
    pub graphics: bool,
    /// Family can present to the target surface
    pub present: bool,
}

/// Description of one physical device as seen by the selection policy
#[derive(Debug, Clone)]
pub struct PhysicalDeviceInfo {
    /// Human readable adapter name
    pub name: String,
    /// Adapter kind
    pub device_type: PhysicalDeviceType,
    /// Queue families, in native order
    pub queue_families: Vec<QueueFamilyInfo>,
    /// Device exposes every required extension and feature
    pub supports_required_features: bool,
}

/// Queue families picked for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilySelection {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilySelection {
    /// Graphics and present commands go to the same family
    pub fn is_unified(&self) -> bool {
        self.graphics == self.present
    }
}

/// Result of the physical device scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalDeviceSelection {
    /// Index into the list handed to [`select_physical_device`]
    pub device_index: usize,
    pub queue_families: QueueFamilySelection,
}

/// Find a graphics family and a present family
///
/// A family supporting both is preferred; otherwise the first graphics
/// family and the first present family are used.
pub fn find_queue_families(families: &[QueueFamilyInfo]) -> Option<QueueFamilySelection> {
    if let Some(index) = families.iter().position(|f| f.graphics && f.present) {
        return Some(QueueFamilySelection {
            graphics: index as u32,
            present: index as u32,
        });
    }

    let graphics = families.iter().position(|f| f.graphics)?;
    let present = families.iter().position(|f| f.present)?;
    Some(QueueFamilySelection {
        graphics: graphics as u32,
        present: present as u32,
    })
}

/// Pick the physical device to create the logical device on
///
/// The first device with a graphics family, a present family and the
/// required features is accepted. If it is not a discrete GPU the scan goes
/// on and a later discrete GPU replaces it. Once a discrete GPU is accepted
/// it is never replaced.
///
/// # Returns
///
/// The selection, or `Error::InitializationFailed` when no device qualifies
pub fn select_physical_device(devices: &[PhysicalDeviceInfo]) -> Result<PhysicalDeviceSelection> {
    let mut selected: Option<PhysicalDeviceSelection> = None;

    for (device_index, device) in devices.iter().enumerate() {
        if !device.supports_required_features {
            continue;
        }
        let Some(queue_families) = find_queue_families(&device.queue_families) else {
            continue;
        };

        let discrete = device.device_type == PhysicalDeviceType::DiscreteGpu;
        match selected {
            None => {
                selected = Some(PhysicalDeviceSelection { device_index, queue_families });
                if discrete {
                    break;
                }
            }
            Some(_) if discrete => {
                selected = Some(PhysicalDeviceSelection { device_index, queue_families });
                break;
            }
            Some(_) => {}
        }
    }

    selected.ok_or_else(|| {
        crate::engine_error!(
            "ember3d::PhysicalDevice",
            "No physical device with graphics and present support among {} candidate(s)",
            devices.len()
        );
        Error::InitializationFailed("no suitable physical device".to_string())
    })
}

#[cfg(test)]
#[path = "physical_device_tests.rs"]
mod tests;
