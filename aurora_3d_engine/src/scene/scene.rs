/// Scene — the entity store the renderer walks once per frame.
///
/// A deliberately small model: entities live in a slotmap and carry
/// optional model / sprite / light components plus a transform and a
/// visibility flag. The full ECS (scripting, physics, hierarchy) lives
/// outside this crate; the renderer only needs a typed walk over
/// `(Transform, Model, Visibility)`, `(Transform, Sprite, Visibility)`
/// and `(Transform, Light)`.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use slotmap::{new_key_type, SlotMap};

use crate::assets::AssetHandle;
use crate::render_data::{ImageId, MaterialId, MeshId};
use super::light::Light;

new_key_type! {
    /// Stable key for an entity in the scene's slotmap
    pub struct EntityKey;
}

/// TRS transform component.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Local-to-world matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Where an entity's mesh comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    /// Engine primitive already resident in the mesh cache
    Builtin(MeshId),
    /// Asset-backed model resolved asynchronously through the AssetManager
    Asset(AssetHandle),
}

/// Renderable mesh component.
#[derive(Debug, Clone, Copy)]
pub struct ModelComponent {
    pub source: ModelSource,
    pub material: MaterialId,
}

/// Billboard sprite component.
#[derive(Debug, Clone, Copy)]
pub struct SpriteComponent {
    pub image: ImageId,
    /// World-space quad size
    pub size: Vec2,
    pub tint: Vec4,
}

/// One scene entity.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub model: Option<ModelComponent>,
    pub sprite: Option<SpriteComponent>,
    pub light: Option<Light>,
    /// Unique id written by the pick shader; assigned by the scene,
    /// never 0 (0 = "nothing under the cursor").
    pick_id: u32,
}

impl Entity {
    /// Pick-buffer id for this entity.
    pub fn pick_id(&self) -> u32 {
        self.pick_id
    }
}

/// Builder-style description for spawning an entity.
#[derive(Debug, Clone, Default)]
pub struct EntityDesc {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub model: Option<ModelComponent>,
    pub sprite: Option<SpriteComponent>,
    pub light: Option<Light>,
}

impl EntityDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            visible: true,
            model: None,
            sprite: None,
            light: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_model(mut self, source: ModelSource, material: MaterialId) -> Self {
        self.model = Some(ModelComponent { source, material });
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteComponent) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Entity store. Single writer (the main thread); the renderer reads it
/// once per `update` call.
pub struct Scene {
    entities: SlotMap<EntityKey, Entity>,
    next_pick_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            next_pick_id: 1,
        }
    }

    /// Spawn an entity, assigning its pick id.
    pub fn spawn(&mut self, desc: EntityDesc) -> EntityKey {
        let pick_id = self.next_pick_id;
        self.next_pick_id += 1;
        self.entities.insert(Entity {
            name: desc.name,
            transform: desc.transform,
            visible: desc.visible,
            model: desc.model,
            sprite: desc.sprite,
            light: desc.light,
            pick_id,
        })
    }

    /// Remove an entity. Returns whether it existed.
    pub fn despawn(&mut self, key: EntityKey) -> bool {
        self.entities.remove(key).is_some()
    }

    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// View over `(Transform, Model, Visibility)` — entities with a
    /// mesh to draw, whether currently visible or not.
    pub fn models(&self) -> impl Iterator<Item = (EntityKey, &Entity, &ModelComponent)> {
        self.entities
            .iter()
            .filter_map(|(key, e)| e.model.as_ref().map(|m| (key, e, m)))
    }

    /// View over `(Transform, Sprite, Visibility)`.
    pub fn sprites(&self) -> impl Iterator<Item = (EntityKey, &Entity, &SpriteComponent)> {
        self.entities
            .iter()
            .filter_map(|(key, e)| e.sprite.as_ref().map(|s| (key, e, s)))
    }

    /// View over `(Transform, Light)`.
    pub fn lights(&self) -> impl Iterator<Item = (EntityKey, &Entity, &Light)> {
        self.entities
            .iter()
            .filter_map(|(key, e)| e.light.as_ref().map(|l| (key, e, l)))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
