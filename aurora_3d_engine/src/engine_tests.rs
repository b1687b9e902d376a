use super::*;
use std::sync::{Arc, Mutex};
use serial_test::serial;

struct CountingLogger {
    count: Arc<Mutex<usize>>,
}

impl Logger for CountingLogger {
    fn log(&self, _entry: &LogEntry) {
        *self.count.lock().unwrap() += 1;
    }
}

#[test]
#[serial]
fn test_set_logger_replaces_sink() {
    let count = Arc::new(Mutex::new(0));
    Engine::set_logger(Box::new(CountingLogger {
        count: count.clone(),
    }));

    Engine::log(LogSeverity::Info, "aurora3d::Test", "one".to_string());
    Engine::log(LogSeverity::Warn, "aurora3d::Test", "two".to_string());
    assert_eq!(*count.lock().unwrap(), 2);

    Engine::set_logger(Box::new(DefaultLogger));
    Engine::log(LogSeverity::Info, "aurora3d::Test", "three".to_string());
    // Replaced logger no longer receives entries
    assert_eq!(*count.lock().unwrap(), 2);
}

#[test]
#[serial]
fn test_log_detailed_passes_location() {
    struct AssertLogger;
    impl Logger for AssertLogger {
        fn log(&self, entry: &LogEntry) {
            assert_eq!(entry.file, Some("device.rs"));
            assert_eq!(entry.line, Some(120));
        }
    }
    Engine::set_logger(Box::new(AssertLogger));
    Engine::log_detailed(
        LogSeverity::Error,
        "aurora3d::Test",
        "failure".to_string(),
        "device.rs",
        120,
    );
    Engine::set_logger(Box::new(DefaultLogger));
}
