//! Aurora3D Engine — ambient logging host
//!
//! The only process-wide state the engine keeps is the logger.
//! Every other subsystem (device, caches, scene renderer) is owned
//! explicitly by the application's top-level renderer object, so
//! construction and destruction order stay visible in the call chain.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

/// Global logger (lazily initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

/// Ambient engine facilities.
///
/// `Engine` is a namespace, not an object: it hosts the logger used by
/// the `engine_*!` macros and nothing else.
///
/// # Example
///
/// ```no_run
/// use aurora_3d_engine::aurora3d::Engine;
/// use aurora_3d_engine::engine_info;
///
/// engine_info!("aurora3d::App", "starting up");
/// Engine::set_logger(Box::new(aurora_3d_engine::aurora3d::log::DefaultLogger));
/// ```
pub struct Engine;

impl Engine {
    /// Replace the global logger.
    ///
    /// The previous logger is dropped. Safe to call at any time;
    /// in-flight log calls finish with whichever logger they observed.
    pub fn set_logger(new_logger: Box<dyn Logger>) {
        if let Ok(mut guard) = logger().write() {
            *guard = new_logger;
        }
    }

    /// Log a message through the global logger.
    ///
    /// Called by the `engine_trace!`/`engine_debug!`/`engine_info!`/
    /// `engine_warn!` macros; prefer those over calling this directly.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let entry = LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        };
        if let Ok(guard) = logger().read() {
            guard.log(&entry);
        }
    }

    /// Log a message with file:line details (used by `engine_error!`).
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let entry = LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        };
        if let Ok(guard) = logger().read() {
            guard.log(&entry);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
