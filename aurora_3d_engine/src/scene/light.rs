/// Lights and the per-frame CPU light array.
///
/// Light entities are mirrored once per frame into a flat
/// `GpuLightData` array (`LightId` = array index) which the scene
/// renderer uploads through an NBuffer for the forward pass. The
/// directional "sun" index is tracked separately so shading can take
/// the single-sun shortcut.

use glam::{Mat4, Vec3};

use crate::render_data::{
    GpuLightData, LightId, LIGHT_KIND_DIRECTIONAL, LIGHT_KIND_POINT, LIGHT_KIND_SPOT, MAX_LIGHTS,
};

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

/// CPU-side light component.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub kind: LightKind,
    /// Linear RGB
    pub color: Vec3,
    pub intensity: f32,
    /// Attenuation range (point/spot)
    pub range: f32,
    /// Inner spot cone angle, radians
    pub inner_cone: f32,
    /// Outer spot cone angle, radians
    pub outer_cone: f32,
}

impl Light {
    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            intensity,
            range: 0.0,
            inner_cone: 0.0,
            outer_cone: 0.0,
        }
    }

    pub fn point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            kind: LightKind::Point,
            color,
            intensity,
            range,
            inner_cone: 0.0,
            outer_cone: 0.0,
        }
    }

    pub fn spot(color: Vec3, intensity: f32, range: f32, inner_cone: f32, outer_cone: f32) -> Self {
        Self {
            kind: LightKind::Spot,
            color,
            intensity,
            range,
            inner_cone,
            outer_cone,
        }
    }

    /// Mirror into the GPU layout using the owning entity's world matrix.
    ///
    /// Position comes from the matrix translation; direction is the
    /// entity's local -Z in world space.
    pub fn to_gpu(&self, world: &Mat4) -> GpuLightData {
        let position = world.w_axis.truncate();
        let direction = world.transform_vector3(Vec3::NEG_Z).normalize_or_zero();
        GpuLightData {
            position,
            range: self.range,
            direction,
            intensity: self.intensity,
            color: self.color,
            kind: match self.kind {
                LightKind::Directional => LIGHT_KIND_DIRECTIONAL,
                LightKind::Point => LIGHT_KIND_POINT,
                LightKind::Spot => LIGHT_KIND_SPOT,
            },
            inner_cone_cos: self.inner_cone.cos(),
            outer_cone_cos: self.outer_cone.cos(),
            _pad: [0.0; 2],
        }
    }
}

/// Per-frame CPU light array, rebuilt by `SceneRenderer::update` and
/// uploaded as one contiguous block.
pub struct LightCache {
    entries: Vec<GpuLightData>,
    sun: Option<LightId>,
}

impl LightCache {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_LIGHTS),
            sun: None,
        }
    }

    /// Reset for a new frame's scene walk.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sun = None;
    }

    /// Append a light; returns its array index as `LightId`, or NULL
    /// when `MAX_LIGHTS` is exceeded (the light is dropped this frame).
    ///
    /// The first directional light becomes the tracked sun.
    pub fn add(&mut self, data: GpuLightData) -> LightId {
        if self.entries.len() >= MAX_LIGHTS {
            return LightId::NULL;
        }
        let id = LightId::new(self.entries.len() as u32);
        if data.kind == LIGHT_KIND_DIRECTIONAL && self.sun.is_none() {
            self.sun = Some(id);
        }
        self.entries.push(data);
        id
    }

    /// Overwrite an existing entry in place.
    ///
    /// No-op for NULL or out-of-range ids.
    pub fn set(&mut self, id: LightId, data: GpuLightData) {
        if id.is_null() {
            return;
        }
        if let Some(entry) = self.entries.get_mut(id.index()) {
            *entry = data;
        }
    }

    /// Read back an entry.
    pub fn get(&self, id: LightId) -> Option<&GpuLightData> {
        if id.is_null() {
            return None;
        }
        self.entries.get(id.index())
    }

    /// Tracked directional sun index, if any.
    pub fn sun(&self) -> Option<LightId> {
        self.sun
    }

    /// Number of lights this frame.
    pub fn count(&self) -> u32 {
        self.entries.len() as u32
    }

    /// The whole array as bytes, ready for an NBuffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.entries)
    }
}

impl Default for LightCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
