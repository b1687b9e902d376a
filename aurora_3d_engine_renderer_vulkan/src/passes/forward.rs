/// ForwardPass - the culled, material-sorted mesh draw list

use aurora_3d_engine::aurora3d::render::{MaterialId, MeshId};
use aurora_3d_engine::aurora3d::scene::MeshDrawCommand;
use aurora_3d_engine::aurora3d::Result;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::path::Path;

use crate::device::Device;
use crate::mesh_cache::MeshCache;
use super::{PassPipeline, PipelineDesc};

/// Per-draw push block: everything the forward shaders need beyond the
/// bindless sets. Material and light data are pulled through the scene
/// buffer address, vertices through the vertex buffer address.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ForwardPushConstants {
    pub model: Mat4,
    pub scene_buffer: u64,
    pub vertex_buffer: u64,
    pub material_id: MaterialId,
    pub entity_id: u32,
    pub _pad: [u32; 2],
}

const _: () = assert!(std::mem::size_of::<ForwardPushConstants>() <= 128);

pub struct ForwardPass {
    pipeline: PassPipeline,
}

impl ForwardPass {
    pub fn new(
        device: &Device,
        shader_dir: &Path,
        color_format: vk::Format,
        depth_format: vk::Format,
        samples: vk::SampleCountFlags,
    ) -> Result<Self> {
        let pipeline = PassPipeline::build(
            device,
            &PipelineDesc {
                vert: &shader_dir.join("forward.vert.spv"),
                frag: &shader_dir.join("forward.frag.spv"),
                color_format: Some(color_format),
                depth_format: Some(depth_format),
                samples,
                depth_test: true,
                depth_write: true,
                blend: false,
                cull: vk::CullModeFlags::BACK,
                push_constant_size: std::mem::size_of::<ForwardPushConstants>() as u32,
            },
        )?;
        Ok(Self { pipeline })
    }

    /// Record the draw list. Commands are already culled and sorted by
    /// material; commands whose mesh is missing from the cache are skipped.
    pub fn draw(
        &self,
        device: &Device,
        cmd: vk::CommandBuffer,
        extent: vk::Extent2D,
        scene_buffer: u64,
        meshes: &MeshCache,
        commands: &[&MeshDrawCommand],
    ) {
        if commands.is_empty() {
            return;
        }
        self.pipeline.bind(device, cmd, extent);

        let vk_device = device.handle();
        let mut bound_index_buffer = MeshId::NULL;
        for draw in commands {
            let Some(mesh) = meshes.get(draw.mesh_id) else {
                continue;
            };
            if draw.mesh_id != bound_index_buffer {
                unsafe {
                    vk_device.cmd_bind_index_buffer(
                        cmd,
                        mesh.index_buffer(),
                        0,
                        vk::IndexType::UINT32,
                    );
                }
                bound_index_buffer = draw.mesh_id;
            }
            self.pipeline.push(
                cmd,
                &ForwardPushConstants {
                    model: draw.model,
                    scene_buffer,
                    vertex_buffer: mesh.vertex_address(),
                    material_id: draw.material_id,
                    entity_id: draw.entity_id,
                    _pad: [0; 2],
                },
            );
            unsafe {
                vk_device.cmd_draw_indexed(cmd, mesh.index_count(), 1, 0, 0, 0);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "forward_tests.rs"]
mod tests;
