/// Transient per-frame draw commands.
///
/// `SceneRenderer::update` rebuilds the command list from scratch every
/// frame; the forward pass consumes it and the list is discarded. Nothing
/// here is persisted — the only stable identities are the cache ids and
/// the entity pick id.

use glam::Mat4;
use rdst::{RadixKey, RadixSort};

use crate::camera::Frustum;
use crate::render_data::{MaterialId, MeshId};
use super::bounds::BoundingSphere;

/// One mesh draw, produced by the scene walk and consumed by the
/// forward pass within the same frame.
#[derive(Debug, Clone, Copy)]
pub struct MeshDrawCommand {
    pub mesh_id: MeshId,
    /// Local-to-world matrix
    pub model: Mat4,
    /// Whether the owning entity is visible this frame
    pub visible: bool,
    /// Unique per-entity id written by the pick shader
    pub entity_id: u32,
    /// World-space bounding sphere for frustum culling
    pub bounds: BoundingSphere,
    pub material_id: MaterialId,
}

/// Radix key: material id, so sorted submission groups state by material.
impl RadixKey for MeshDrawCommand {
    const LEVELS: usize = 4;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (self.material_id.raw() >> (level * 8)) as u8
    }
}

/// Filter commands down to the ones the forward pass must record.
///
/// A command survives when its entity is visible and its world-space
/// bounding sphere touches the camera frustum. Evaluated every frame,
/// never cached — correctness over throughput at moderate scene sizes.
pub fn cull_draw_commands<'a>(
    commands: &'a [MeshDrawCommand],
    frustum: &Frustum,
) -> Vec<&'a MeshDrawCommand> {
    commands
        .iter()
        .filter(|cmd| {
            cmd.visible && frustum.contains_sphere(cmd.bounds.center, cmd.bounds.radius)
        })
        .collect()
}

/// Sort commands by material id (radix sort, O(n)).
///
/// Grouping draws by material keeps push-constant churn low; ordering
/// within a material group is not specified.
pub fn sort_by_material(commands: &mut Vec<MeshDrawCommand>) {
    commands.radix_sort_unstable();
}

#[cfg(test)]
#[path = "draw_command_tests.rs"]
mod tests;
