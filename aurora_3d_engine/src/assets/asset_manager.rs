/// Asset manager — handle/path resolution and polled async loads.
///
/// Loads are scheduled onto the task pool and observed by polling from
/// the render thread once per frame. An unready asset is a soft miss:
/// the caller skips the draw this frame and retries the next.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::engine_warn;
use super::mesh_data::MeshData;
use super::task_pool::{Task, TaskPool, TaskStatus};

/// Typed opaque asset id.
///
/// Stable for the lifetime of the manager; one handle per canonical
/// asset path. This replaces string keys as task identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetHandle(u64);

impl AssetHandle {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

enum MeshState {
    Loading(Task<Option<MeshData>>),
    Ready(MeshData),
    Taken,
    Failed,
}

/// Result of a non-blocking mesh poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshPoll {
    /// No load was ever requested for this handle
    NotRequested,
    /// Still decoding on a worker
    Pending,
    /// Decoded and ready to take
    Ready,
    /// Already taken by a previous poll cycle
    Taken,
    /// The load task failed
    Failed,
}

pub struct AssetManager {
    pool: TaskPool,
    handles: FxHashMap<PathBuf, AssetHandle>,
    paths: FxHashMap<AssetHandle, PathBuf>,
    next_handle: u64,
    meshes: FxHashMap<AssetHandle, MeshState>,
}

impl AssetManager {
    pub fn new(worker_count: usize) -> Self {
        Self {
            pool: TaskPool::new(worker_count),
            handles: FxHashMap::default(),
            paths: FxHashMap::default(),
            next_handle: 1,
            meshes: FxHashMap::default(),
        }
    }

    /// Get or create the handle for an asset path.
    pub fn handle_for_path(&mut self, path: impl AsRef<Path>) -> AssetHandle {
        let path = path.as_ref();
        if let Some(&handle) = self.handles.get(path) {
            return handle;
        }
        let handle = AssetHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(path.to_path_buf(), handle);
        self.paths.insert(handle, path.to_path_buf());
        handle
    }

    /// Path metadata for a handle.
    pub fn path_of(&self, handle: AssetHandle) -> Option<&Path> {
        self.paths.get(&handle).map(|p| p.as_path())
    }

    /// Schedule a mesh load unless one is already in flight or done.
    ///
    /// `loader` runs on a worker thread and must not touch GPU state;
    /// returning `None` (or panicking) marks the asset failed.
    pub fn request_mesh<F>(&mut self, handle: AssetHandle, loader: F)
    where
        F: FnOnce() -> Option<MeshData> + Send + 'static,
    {
        if self.meshes.contains_key(&handle) {
            return;
        }
        let task = self.pool.submit(loader);
        self.meshes.insert(handle, MeshState::Loading(task));
    }

    /// Non-blocking status check, advancing Loading → Ready/Failed when
    /// the task's status is observed as terminal.
    pub fn poll_mesh(&mut self, handle: AssetHandle) -> MeshPoll {
        let Some(state) = self.meshes.get_mut(&handle) else {
            return MeshPoll::NotRequested;
        };

        if let MeshState::Loading(task) = state {
            match task.status() {
                TaskStatus::Pending | TaskStatus::Running => return MeshPoll::Pending,
                TaskStatus::Completed => match task.take_result().flatten() {
                    Some(data) => *state = MeshState::Ready(data),
                    None => {
                        engine_warn!("aurora3d::AssetManager", "mesh load produced no data");
                        *state = MeshState::Failed;
                    }
                },
                TaskStatus::Failed => {
                    engine_warn!("aurora3d::AssetManager", "mesh load task failed");
                    *state = MeshState::Failed;
                }
            }
        }

        match state {
            MeshState::Loading(_) => MeshPoll::Pending,
            MeshState::Ready(_) => MeshPoll::Ready,
            MeshState::Taken => MeshPoll::Taken,
            MeshState::Failed => MeshPoll::Failed,
        }
    }

    /// Take ownership of a ready mesh (for GPU upload). The handle's
    /// state becomes `Taken`; polling keeps reporting that so callers
    /// know the upload already happened.
    pub fn take_mesh(&mut self, handle: AssetHandle) -> Option<MeshData> {
        match self.meshes.get_mut(&handle) {
            Some(state @ MeshState::Ready(_)) => {
                let MeshState::Ready(data) = std::mem::replace(state, MeshState::Taken) else {
                    unreachable!()
                };
                Some(data)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "asset_manager_tests.rs"]
mod tests;
