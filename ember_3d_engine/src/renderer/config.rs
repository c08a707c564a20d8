/// Renderer configuration

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::log::LogSeverity;

/// Minimum validation-layer severity forwarded to the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationSeverity {
    ErrorsOnly,
    #[default]
    ErrorsAndWarnings,
    All,
}

impl ValidationSeverity {
    /// Whether a message mapped to `severity` passes the threshold
    pub fn accepts(self, severity: LogSeverity) -> bool {
        match self {
            ValidationSeverity::ErrorsOnly => severity >= LogSeverity::Error,
            ValidationSeverity::ErrorsAndWarnings => severity >= LogSeverity::Warn,
            ValidationSeverity::All => true,
        }
    }
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Enable validation layer and debug messenger
    pub enable_validation: bool,
    pub validation_severity: ValidationSeverity,
    /// Number of frames the CPU may record ahead of the GPU
    pub frames_in_flight: usize,
    /// Directory holding `skinned.vert.spv` and `skinned.frag.spv`
    pub shader_dir: PathBuf,
    /// Color attachment clear value
    pub clear_color: [f32; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Ember3D Application".to_string(),
            app_version: (1, 0, 0),
            enable_validation: cfg!(debug_assertions),
            validation_severity: ValidationSeverity::default(),
            frames_in_flight: 3,
            shader_dir: PathBuf::from("shaders"),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.frames_in_flight == 0 {
            return Err(Error::InvalidResource(
                "frames_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
