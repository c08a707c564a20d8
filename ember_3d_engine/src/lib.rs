/*!
# Ember3D Engine

Core types and backend-independent logic of the Ember3D real-time renderer.

The crate is generic over a `GraphicsDevice` backend. Backends (Vulkan in
`ember_3d_engine_renderer_vulkan`) implement the device contract; everything
above it (staged uploads, frame scheduling, render targets, animation,
skinning and glTF loading) lives here and is tested against a mock device.

## Architecture

- **GraphicsDevice**: Backend contract (buffers, images, swapchain, sync, commands)
- **Renderer**: Owns the device, the frame slots, the render targets and the models
- **Model**: Uploaded glTF model with nodes, skins, materials and animations
- **Camera**: View and projection matrices for a frame

There is no global engine object: the application constructs a device, hands
it to `Renderer::new` and drives `Renderer::render` from its event loop.
*/

// Internal modules
mod error;
pub mod log;
pub mod graphics_device;
pub mod resource;
pub mod scene;
pub mod camera;
pub mod renderer;

// Main ember3d namespace module
pub mod ember3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Rendering context
    pub use crate::renderer::Renderer;

    // Logging sub-module (types and setup, NOT macros)
    pub mod log {
        pub use crate::log::{
            log, reset_logger, set_logger, DefaultLogger, LogEntry, LogSeverity, Logger,
        };
    }

    // Backend contract and device-independent device logic
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Frame scheduling, render targets and draw recording
    pub mod render {
        pub use crate::renderer::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::camera::Camera;
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
