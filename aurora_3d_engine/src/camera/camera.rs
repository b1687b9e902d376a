/// Camera — low-level passive data container.
///
/// The Camera computes nothing. The caller (editor or game layer) is
/// responsible for computing and setting view matrix, projection matrix
/// and world position; the renderer only ever reads the four accessors
/// `view`, `projection`, `view_projection` and `position`.
///
/// The `kind` tag records which viewport the camera drives (editor
/// "Scene" view or the "Game" view) — the scene renderer selects its
/// render-target set and editor-only passes from it.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;

/// Which viewport a camera drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    /// Editor scene view (grid and mouse picking enabled)
    Editor,
    /// Game view (no editor overlays)
    Game,
}

/// Low-level camera. A passive data container — computes nothing
/// beyond combining its two matrices.
#[derive(Debug, Clone)]
pub struct Camera {
    kind: CameraKind,
    view: Mat4,
    projection: Mat4,
    position: Vec3,
}

impl Camera {
    /// Create a new camera with the given parameters.
    pub fn new(kind: CameraKind, view: Mat4, projection: Mat4, position: Vec3) -> Self {
        Self {
            kind,
            view,
            projection,
            position,
        }
    }

    // ===== GETTERS =====

    /// Which viewport this camera drives.
    pub fn kind(&self) -> CameraKind {
        self.kind
    }

    /// View matrix (inverse of the camera's world transform).
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Projection matrix (perspective or orthographic).
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Camera world position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Frustum planes extracted from the current view-projection.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }

    // ===== SETTERS — store, compute nothing =====

    /// Set the view matrix.
    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    /// Set the projection matrix.
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Set the world position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
