//! Scene data model: entities, transforms, lights, and the transient
//! per-frame draw-command list the renderer consumes.

mod bounds;
mod draw_command;
mod light;
mod scene;

pub use bounds::BoundingSphere;
pub use draw_command::{cull_draw_commands, sort_by_material, MeshDrawCommand};
pub use light::{Light, LightCache, LightKind};
pub use scene::{
    Entity, EntityDesc, EntityKey, ModelComponent, ModelSource, Scene, SpriteComponent, Transform,
};
