/// Vulkan validation messenger - routes validation-layer messages into the engine logger
///
/// Messages are mapped to a `LogSeverity`, filtered by the configured
/// `ValidationSeverity` threshold and logged under `ember3d::vulkan::Validation`.
/// Counters per severity are kept for an end-of-run report.

use ash::vk;
use colored::*;
use ember_3d_engine::ember3d::log::LogSeverity;
use ember_3d_engine::ember3d::render::ValidationSeverity;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

/// Threshold read by the callback (None until a messenger is created)
static THRESHOLD: RwLock<Option<ValidationSeverity>> = RwLock::new(None);

/// Global validation statistics
static VALIDATION_STATS: ValidationStatsTracker = ValidationStatsTracker::new();

/// Validation message counts since the messenger was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

struct ValidationStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
}

impl ValidationStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
        }
    }

    fn increment(&self, severity: LogSeverity) {
        let counter = match severity {
            LogSeverity::Error => &self.errors,
            LogSeverity::Warn => &self.warnings,
            LogSeverity::Info => &self.info,
            LogSeverity::Debug | LogSeverity::Trace => &self.verbose,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn get_stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            verbose: self.verbose.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
        self.verbose.store(0, Ordering::Relaxed);
    }
}

/// Get current validation statistics
pub fn get_validation_stats() -> ValidationStats {
    VALIDATION_STATS.get_stats()
}

/// Print validation statistics report
pub fn print_validation_stats_report() {
    let stats = get_validation_stats();

    if stats.total() == 0 {
        println!("\n{}", "✓ No validation messages".green().bold());
        return;
    }

    println!("\n{}", "=== Validation Statistics Report ===".bright_blue().bold());
    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    if stats.info > 0 {
        println!("  {} {}", "Info:".cyan(), stats.info);
    }
    if stats.verbose > 0 {
        println!("  {} {}", "Verbose:".bright_black(), stats.verbose);
    }
    println!("  {} {}", "Total:".white().bold(), stats.total());
    println!("{}\n", "====================================".bright_blue().bold());
}

/// Engine severity of a validation message
pub(crate) fn map_severity(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> LogSeverity {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        LogSeverity::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        LogSeverity::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        LogSeverity::Info
    } else {
        LogSeverity::Debug
    }
}

/// Severities requested from the driver for a threshold
pub(crate) fn severity_flags(threshold: ValidationSeverity) -> vk::DebugUtilsMessageSeverityFlagsEXT {
    match threshold {
        ValidationSeverity::ErrorsOnly => vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        ValidationSeverity::ErrorsAndWarnings => {
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        }
        ValidationSeverity::All => {
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
        }
    }
}

fn message_type_name(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else {
        "General"
    }
}

/// Debug messenger callback
///
/// Never aborts the Vulkan call that triggered the message.
#[cfg(feature = "vulkan-validation")]
unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    let severity = map_severity(message_severity);
    let accepted = match THRESHOLD.read() {
        Ok(threshold) => threshold.is_some_and(|t| t.accepts(severity)),
        Err(_) => false,
    };
    if !accepted || p_callback_data.is_null() {
        return vk::FALSE;
    }

    let callback_data = &*p_callback_data;
    let message_id = callback_data
        .message_id_name_as_c_str()
        .and_then(|name| name.to_str().ok())
        .unwrap_or("Unknown");
    let message = callback_data
        .message_as_c_str()
        .and_then(|text| text.to_str().ok())
        .unwrap_or("No message");

    VALIDATION_STATS.increment(severity);
    ember_3d_engine::ember3d::log::log(
        severity,
        "ember3d::vulkan::Validation",
        format!("[{}] {}: {}", message_type_name(message_type), message_id, message),
    );

    vk::FALSE
}

/// Debug-utils messenger and its loader
pub(crate) struct DebugMessenger {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    /// Create a messenger forwarding messages at or above `threshold`
    #[cfg(feature = "vulkan-validation")]
    pub(crate) fn new(
        entry: &ash::Entry,
        instance: &ash::Instance,
        threshold: ValidationSeverity,
    ) -> ember_3d_engine::ember3d::Result<Self> {
        VALIDATION_STATS.reset();
        if let Ok(mut slot) = THRESHOLD.write() {
            *slot = Some(threshold);
        }

        let loader = ash::ext::debug_utils::Instance::new(entry, instance);
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(severity_flags(threshold))
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(vulkan_debug_callback));

        let messenger = unsafe { loader.create_debug_utils_messenger(&create_info, None) }.map_err(|e| {
            ember_3d_engine::engine_error!(
                "ember3d::vulkan",
                "Failed to create debug messenger: {:?}",
                e
            );
            ember_3d_engine::ember3d::Error::InitializationFailed(format!(
                "Failed to create debug messenger: {:?}",
                e
            ))
        })?;

        Ok(Self { loader, messenger })
    }

    /// Destroy the messenger and stop forwarding
    pub(crate) fn destroy(self) {
        if let Ok(mut slot) = THRESHOLD.write() {
            *slot = None;
        }
        unsafe {
            self.loader.destroy_debug_utils_messenger(self.messenger, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_severity() {
        assert_eq!(map_severity(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR), LogSeverity::Error);
        assert_eq!(map_severity(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING), LogSeverity::Warn);
        assert_eq!(map_severity(vk::DebugUtilsMessageSeverityFlagsEXT::INFO), LogSeverity::Info);
        assert_eq!(map_severity(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE), LogSeverity::Debug);
    }

    #[test]
    fn test_severity_flags_match_threshold() {
        assert_eq!(
            severity_flags(ValidationSeverity::ErrorsOnly),
            vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
        );
        let flags = severity_flags(ValidationSeverity::ErrorsAndWarnings);
        assert!(flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING));
        assert!(!flags.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO));
    }

    #[test]
    fn test_requested_flags_pass_threshold() {
        for threshold in [
            ValidationSeverity::ErrorsOnly,
            ValidationSeverity::ErrorsAndWarnings,
            ValidationSeverity::All,
        ] {
            let flags = severity_flags(threshold);
            for bit in [
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
                vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
            ] {
                assert_eq!(flags.contains(bit), threshold.accepts(map_severity(bit)));
            }
        }
    }

    #[test]
    fn test_message_type_name() {
        assert_eq!(message_type_name(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION), "Validation");
        assert_eq!(message_type_name(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE), "Performance");
        assert_eq!(message_type_name(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL), "General");
    }

    #[test]
    fn test_stats_total() {
        let stats = ValidationStats { errors: 1, warnings: 2, info: 3, verbose: 4 };
        assert_eq!(stats.total(), 10);
    }
}
