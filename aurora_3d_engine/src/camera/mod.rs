//! Camera types: passive camera container and frustum culling.

mod camera;
mod frustum;

pub use camera::{Camera, CameraKind};
pub use frustum::Frustum;
