//! Integration tests for the Engine logging system
//!
//! These tests verify the logging system functionality.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use aurora_3d_engine::aurora3d::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use aurora_3d_engine::aurora3d::Engine;
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                entries: entries.clone(),
            },
            entries,
        )
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.push(entry.clone());
    }
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(Box::new(test_logger));

    Engine::log(
        LogSeverity::Info,
        "test::module",
        "Test info message".to_string(),
    );
    Engine::log(
        LogSeverity::Warn,
        "test::module",
        "Test warning message".to_string(),
    );
    Engine::log(
        LogSeverity::Error,
        "test::module",
        "Test error message".to_string(),
    );

    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 3);

    assert_eq!(captured_entries[0].severity, LogSeverity::Info);
    assert_eq!(captured_entries[0].source, "test::module");
    assert_eq!(captured_entries[0].message, "Test info message");

    assert_eq!(captured_entries[1].severity, LogSeverity::Warn);
    assert_eq!(captured_entries[1].message, "Test warning message");

    assert_eq!(captured_entries[2].severity, LogSeverity::Error);
    assert_eq!(captured_entries[2].message, "Test error message");

    drop(captured_entries);
    Engine::set_logger(Box::new(DefaultLogger));
}

#[test]
#[serial]
fn test_integration_error_logging_with_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(Box::new(test_logger));

    Engine::log_detailed(
        LogSeverity::Error,
        "test::error",
        "Critical error occurred".to_string(),
        "test_file.rs",
        42,
    );

    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 1);

    let entry = &captured_entries[0];
    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.source, "test::error");
    assert_eq!(entry.message, "Critical error occurred");
    assert_eq!(entry.file, Some("test_file.rs"));
    assert_eq!(entry.line, Some(42));

    drop(captured_entries);
    Engine::set_logger(Box::new(DefaultLogger));
}

#[test]
#[serial]
fn test_integration_plain_logs_carry_no_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(Box::new(test_logger));

    Engine::log(
        LogSeverity::Debug,
        "test::module",
        "Plain message".to_string(),
    );

    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 1);
    assert_eq!(captured_entries[0].file, None);
    assert_eq!(captured_entries[0].line, None);

    drop(captured_entries);
    Engine::set_logger(Box::new(DefaultLogger));
}
