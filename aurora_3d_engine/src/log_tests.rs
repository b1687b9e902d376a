use super::*;
use crate::engine::Engine;
use crate::error::Error;
use std::sync::{Arc, Mutex};
use serial_test::serial;

/// Captures log entries into a shared vector for inspection.
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(Box::new(CaptureLogger {
        entries: entries.clone(),
    }));
    entries
}

fn restore_default() {
    Engine::set_logger(Box::new(DefaultLogger));
}

#[test]
#[serial]
fn test_info_macro_routes_through_logger() {
    let entries = install_capture();

    crate::engine_info!("aurora3d::Test", "hello {}", 42);

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].source, "aurora3d::Test");
    assert_eq!(captured[0].message, "hello 42");
    assert!(captured[0].file.is_none());
    drop(captured);

    restore_default();
}

#[test]
#[serial]
fn test_error_macro_carries_file_line() {
    let entries = install_capture();

    crate::engine_error!("aurora3d::Test", "boom");

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].file.is_some());
    assert!(captured[0].line.is_some());
    drop(captured);

    restore_default();
}

#[test]
#[serial]
fn test_engine_err_macro_logs_and_returns_error() {
    let entries = install_capture();

    let err: Error = crate::engine_err!("aurora3d::Test", "fence wait failed: {}", 7);
    assert_eq!(err, Error::BackendError("fence wait failed: 7".to_string()));

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].message, "fence wait failed: 7");
    drop(captured);

    restore_default();
}

#[test]
#[serial]
fn test_engine_bail_macro_early_returns() {
    let entries = install_capture();

    fn failing() -> crate::error::Result<u32> {
        crate::engine_bail!("aurora3d::Test", "index {} out of range", 9);
    }

    let result = failing();
    assert!(matches!(result, Err(Error::BackendError(msg)) if msg.contains("out of range")));
    assert_eq!(entries.lock().unwrap().len(), 1);

    restore_default();
}

#[test]
fn test_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}
