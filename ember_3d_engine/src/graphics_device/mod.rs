/// Graphics device module - backend contract and backend-independent device logic

// Module declarations
pub mod graphics_device;
pub mod memory;
pub mod physical_device;
pub mod buffer;
pub mod image;
pub mod transfer;
pub mod swapchain;
pub mod command;
pub mod pipeline;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use memory::*;
pub use physical_device::*;
pub use buffer::*;
pub use image::*;
pub use transfer::*;
pub use swapchain::*;
pub use command::*;
pub use pipeline::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
