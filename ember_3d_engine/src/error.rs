//! Error types for the Ember3D engine
//!
//! Every fallible operation in the engine returns [`Result`]. The variants
//! mirror the four failure classes of the renderer: initialization, resource
//! creation, content loading and per-frame execution. None of them is
//! recoverable at the scope where it is raised.

use std::fmt;

/// Result type for Ember3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ember3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (native API call returned a failure status)
    BackendError(String),

    /// Out of GPU or host memory
    OutOfMemory,

    /// No memory type satisfies the resource's type mask and property flags
    NoSuitableMemoryType {
        /// Resource memory-type bitmask
        type_bits: u32,
        /// Required property flags (raw bits)
        required: u32,
    },

    /// Invalid resource or caller contract violation (bad offset, size, format...)
    InvalidResource(String),

    /// Initialization failed (no suitable device, missing feature, surface...)
    InitializationFailed(String),

    /// Model or texture content could not be loaded
    LoadFailed(String),

    /// A frame could not be acquired, submitted or presented
    FrameFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::NoSuitableMemoryType { type_bits, required } => write!(
                f,
                "No suitable memory type (type bits {:#b}, required flags {:#x})",
                type_bits, required
            ),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::LoadFailed(msg) => write!(f, "Load failed: {}", msg),
            Error::FrameFailed(msg) => write!(f, "Frame failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
