//! GPU wire contracts: opaque resource ids and per-frame POD buffers.
//!
//! Everything in this module crosses the CPU/GPU boundary byte-for-byte.
//! All structs are `#[repr(C)]` and std430-compatible; their layout is the
//! contract with the shaders, so any field reorder requires matching shader
//! updates. Sizes and offsets are pinned by the tests in
//! `render_data_tests.rs`.
//!
//! Ids follow the bindless model: a shader indexes into a global descriptor
//! array (images) or a device-address buffer (materials, lights) using the
//! same integer the CPU cache handed out. `u32::MAX` is the "no resource"
//! sentinel for every id type.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Number of frames that may be in flight simultaneously.
///
/// The CPU must wait on frame slot `f % FRAME_OVERLAP`'s fence before
/// touching that slot's command buffer or staging memory again.
pub const FRAME_OVERLAP: usize = 2;

/// Capacity of the material data GPU array
pub const MAX_MATERIALS: usize = 1024;

/// Capacity of the per-frame light array
pub const MAX_LIGHTS: usize = 256;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
        pub struct $name(u32);

        impl $name {
            /// "No resource" sentinel
            pub const NULL: Self = Self(u32::MAX);

            /// Wrap a raw index. Only caches assign fresh ids.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Raw integer value, as seen by shaders
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Index into the cache's backing array.
            /// Must not be called on `NULL`.
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Whether this is the "no resource" sentinel
            pub const fn is_null(self) -> bool {
                self.0 == u32::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NULL
            }
        }
    };
}

define_id! {
    /// Stable index into the bindless sampled-image table
    ImageId
}
define_id! {
    /// Stable index into the mesh cache
    MeshId
}
define_id! {
    /// Stable index into the material data array
    MaterialId
}
define_id! {
    /// Index into the per-frame light array
    LightId
}

/// Per-frame scene constants, uploaded once at the top of the frame.
///
/// The wire contract between the orchestrator and every shader: buffer
/// device addresses and small values only, no bulk data.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuSceneData {
    pub view: Mat4,
    pub proj: Mat4,
    pub view_proj: Mat4,
    /// Camera world position (w unused)
    pub camera_pos: Vec4,
    /// Viewport-relative mouse position, for pick readback addressing
    pub mouse_pos: Vec2,
    pub _pad0: [f32; 2],
    /// Ambient color (rgb) and intensity (a)
    pub ambient: Vec4,
    /// Device address of the light array
    pub light_buffer: u64,
    /// Number of valid entries in the light array
    pub light_count: u32,
    pub _pad1: u32,
    /// Device address of the material data array
    pub material_buffer: u64,
    pub _pad2: [u32; 2],
}

/// One light, mirrored into the GPU light array (`LightId` = array index).
///
/// `kind` discriminates directional/point/spot; vec3 fields pack their
/// scalar partner into the std430 padding slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuLightData {
    /// World position (ignored for directional lights)
    pub position: Vec3,
    /// Attenuation range (point/spot)
    pub range: f32,
    /// Direction (directional/spot)
    pub direction: Vec3,
    pub intensity: f32,
    /// Linear RGB color
    pub color: Vec3,
    /// 0 = directional, 1 = point, 2 = spot
    pub kind: u32,
    /// Cosine of the inner spot cone angle
    pub inner_cone_cos: f32,
    /// Cosine of the outer spot cone angle
    pub outer_cone_cos: f32,
    pub _pad: [f32; 2],
}

/// Light kind discriminants used in `GpuLightData::kind`
pub const LIGHT_KIND_DIRECTIONAL: u32 = 0;
pub const LIGHT_KIND_POINT: u32 = 1;
pub const LIGHT_KIND_SPOT: u32 = 2;

/// GPU-side mirror of a `Material`, one slot per `MaterialId` in a
/// pre-sized array of `MAX_MATERIALS` entries.
///
/// Texture ids index the bindless image table; `ImageId::NULL` never
/// reaches the GPU — the material cache substitutes default textures
/// at pack time.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialData {
    pub base_color_factor: Vec4,
    pub emissive_factor: Vec3,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub color_image: ImageId,
    pub normal_image: ImageId,
    pub metal_rough_image: ImageId,
    pub emissive_image: ImageId,
    pub _pad: [u32; 3],
}

bitflags::bitflags! {
    /// Which passes the orchestrator runs for a given viewport.
    ///
    /// The pass sequence itself is fixed; the mask only switches
    /// optional members on or off (the editor grid and mouse picking
    /// exist only in the editor's Scene view).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PassMask: u32 {
        const SKY     = 1 << 0;
        const GRID    = 1 << 1;
        const FORWARD = 1 << 2;
        const SPRITES = 1 << 3;
        const PICK    = 1 << 4;
        const POST_FX = 1 << 5;
    }
}

impl PassMask {
    /// Editor "Scene" viewport: everything, including grid and picking.
    pub const SCENE_VIEW: Self = Self::all();

    /// "Game" viewport: no editor overlays.
    pub const GAME_VIEW: Self = Self::SKY
        .union(Self::FORWARD)
        .union(Self::SPRITES)
        .union(Self::POST_FX);
}

/// Interleaved vertex layout shared by every mesh in the mesh cache.
///
/// UVs are split across the two padding slots so the struct packs into
/// 48 bytes with no waste (classic pulled-vertex layout: shaders read
/// this through the vertex buffer's device address, there is no
/// fixed-function vertex input).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub uv_x: f32,
    pub normal: Vec3,
    pub uv_y: f32,
    pub color: Vec4,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            uv_x: uv.x,
            normal,
            uv_y: uv.y,
            color: Vec4::ONE,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "render_data_tests.rs"]
mod tests;
