//! Asynchronous asset loading.
//!
//! A fixed-size worker pool runs decode closures off the render thread;
//! results are only ever observed by polling from the render thread, so
//! GPU resources are never touched by workers. Handles are typed ids,
//! not re-derived string keys.

mod asset_manager;
mod mesh_data;
mod task_pool;

pub use asset_manager::{AssetHandle, AssetManager, MeshPoll};
pub use mesh_data::MeshData;
pub use task_pool::{Task, TaskPool, TaskStatus};
