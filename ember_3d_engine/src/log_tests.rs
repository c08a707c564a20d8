//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry formatting, the global logger slot and the
//! error-producing macros.

use crate::ember3d::Error;
use crate::log::{self, DefaultLogger, LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

// ============================================================================
// CAPTURING LOGGER
// ============================================================================

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    fn install() -> Arc<Mutex<Vec<LogEntry>>> {
        let entries = Arc::new(Mutex::new(Vec::new()));
        log::set_logger(CaptureLogger { entries: entries.clone() });
        entries
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        // Other tests log concurrently; keep only this module's entries
        if entry.source == "test::log" {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

// ============================================================================
// FORMATTING TESTS
// ============================================================================

#[test]
fn test_format_plain_without_location() {
    let entry = LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "ember3d::Renderer".to_string(),
        message: "Renderer ready".to_string(),
        file: None,
        line: None,
    };

    let text = DefaultLogger::format_plain(&entry);
    assert!(text.ends_with("[INFO ] [ember3d::Renderer] Renderer ready"));
}

#[test]
fn test_format_plain_with_location() {
    let entry = LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "ember3d::vulkan".to_string(),
        message: "Failed to submit".to_string(),
        file: Some("vulkan_device.rs"),
        line: Some(42),
    };

    let text = DefaultLogger::format_plain(&entry);
    assert!(text.contains("[ERROR] [ember3d::vulkan] Failed to submit (vulkan_device.rs:42)"));
}

// ============================================================================
// GLOBAL SLOT + MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_custom_logger_receives_macro_output() {
    let entries = CaptureLogger::install();

    crate::engine_info!("test::log", "loaded {} models", 2);
    crate::engine_warn!("test::log", "slow frame");
    crate::engine_error!("test::log", "boom");

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 3);
        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[0].message, "loaded 2 models");
        assert!(captured[0].file.is_none());
        assert_eq!(captured[1].severity, LogSeverity::Warn);
        assert_eq!(captured[2].severity, LogSeverity::Error);
        assert!(captured[2].file.is_some());
        assert!(captured[2].line.is_some());
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_engine_err_logs_and_builds_backend_error() {
    let entries = CaptureLogger::install();

    let status: std::result::Result<(), &str> = Err("ERROR_DEVICE_LOST");
    let mapped = status.map_err(|e| crate::engine_err!("test::log", "Failed to submit: {}", e));

    assert_eq!(
        mapped,
        Err(Error::BackendError("Failed to submit: ERROR_DEVICE_LOST".to_string()))
    );
    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].severity, LogSeverity::Error);
        assert_eq!(captured[0].message, "Failed to submit: ERROR_DEVICE_LOST");
    }

    log::reset_logger();
}

#[test]
#[serial]
fn test_engine_bail_returns_invalid_resource() {
    fn check(offset: u64) -> crate::ember3d::Result<()> {
        if offset > 4 {
            crate::engine_bail!("test::log", "offset {} out of range", offset);
        }
        Ok(())
    }

    let entries = CaptureLogger::install();

    assert!(check(2).is_ok());
    assert_eq!(
        check(9),
        Err(Error::InvalidResource("offset 9 out of range".to_string()))
    );
    assert_eq!(entries.lock().unwrap().len(), 1);

    log::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let entries = CaptureLogger::install();
    log::reset_logger();

    crate::engine_debug!("test::log", "goes to stdout");

    assert!(entries.lock().unwrap().is_empty());
}
