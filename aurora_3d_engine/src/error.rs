//! Error types for the Aurora3D engine
//!
//! This module defines the error types used throughout the engine,
//! including rendering, initialization, and resource management.
//!
//! Two of the variants are "soft" errors that callers recover from
//! locally rather than unwinding the frame: `SwapchainOutOfDate`
//! (recreate before the next acquire) and `AssetNotReady` (skip the
//! draw this frame, retry next frame). Every other variant is
//! unrecoverable at the point it is raised — a device-level failure
//! has no safe mid-frame recovery point.

use std::fmt;

/// Result type for Aurora3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Aurora3D engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific error (Vulkan call failure)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (image, buffer, mesh, material id)
    InvalidResource(String),

    /// Initialization failed (engine, renderer, subsystems)
    InitializationFailed(String),

    /// Swapchain is out of date or suboptimal; recreate before the
    /// next acquire. Soft error — the frame is abandoned, not the app.
    SwapchainOutOfDate,

    /// An asynchronously loaded asset has not completed yet.
    /// Soft error — the consumer retries next frame.
    AssetNotReady,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::SwapchainOutOfDate => write!(f, "Swapchain out of date"),
            Error::AssetNotReady => write!(f, "Asset not ready"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Whether this error is recoverable by the frame loop
    /// (skip/retry) rather than a hard failure.
    pub fn is_soft(&self) -> bool {
        matches!(self, Error::SwapchainOutOfDate | Error::AssetNotReady)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
