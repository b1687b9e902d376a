/*!
# Aurora 3D Engine

Core types for the Aurora 3D rendering engine.

This crate provides the platform-agnostic half of the engine: the scene
data model the renderer walks each frame, the camera and frustum-culling
math, the GPU wire contracts (opaque resource ids, POD buffer layouts),
and the asynchronous asset subsystem. The Vulkan backend crate
(`aurora_3d_engine_renderer_vulkan`) builds the per-frame orchestration
on top of these types.

## Architecture

- **render_data**: bindless ids and the CPU↔GPU POD contracts
- **scene**: entities, draw commands, lights, bounding volumes
- **camera**: passive camera container + frustum extraction
- **assets**: polled async loading on a fixed-size task pool
- **log / error / config**: ambient engine facilities
*/

// Internal modules
mod config;
mod engine;
mod error;
pub mod assets;
pub mod camera;
pub mod log;
pub mod render_data;
pub mod scene;
pub mod utils;

// Main aurora3d namespace module
pub mod aurora3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Ambient engine facilities (logger host)
    pub use crate::engine::Engine;

    // Renderer configuration
    pub use crate::config::{DebugSeverity, RendererConfig, SampleCount};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // GPU wire contracts
    pub mod render {
        pub use crate::render_data::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Asset sub-module
    pub mod assets {
        pub use crate::assets::*;
    }

    // Utilities
    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
