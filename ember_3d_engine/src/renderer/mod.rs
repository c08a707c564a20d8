/// Renderer module - frame scheduling, render targets and the rendering context

// Module declarations
pub mod config;
pub mod frame_scheduler;
pub mod render_targets;
pub mod shaders;
pub mod draw;
pub mod renderer;

// Re-export everything from renderer.rs
pub use renderer::*;

// Re-export from other modules
pub use config::*;
pub use frame_scheduler::*;
pub use render_targets::*;
pub use shaders::*;
pub use draw::*;
