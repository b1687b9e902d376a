//! Renderer configuration.

/// Validation-layer message severity selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    /// Only validation errors
    ErrorsOnly,
    /// Validation errors and warnings
    ErrorsAndWarnings,
    /// Everything, including info and verbose messages
    All,
}

/// Multisample count for the scene color/depth targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCount {
    X1,
    X2,
    X4,
    X8,
}

impl SampleCount {
    /// Raw sample count
    pub fn as_u32(self) -> u32 {
        match self {
            SampleCount::X1 => 1,
            SampleCount::X2 => 2,
            SampleCount::X4 => 4,
            SampleCount::X8 => 8,
        }
    }

    /// Whether multisampling is active (a depth resolve pass is needed)
    pub fn is_msaa(self) -> bool {
        !matches!(self, SampleCount::X1)
    }
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Enable validation/debug layers
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Validation message severity
    pub debug_severity: DebugSeverity,
    /// MSAA sample count for scene targets
    pub msaa_samples: SampleCount,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Aurora3D Application".to_string(),
            app_version: (1, 0, 0),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            msaa_samples: SampleCount::X1,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
