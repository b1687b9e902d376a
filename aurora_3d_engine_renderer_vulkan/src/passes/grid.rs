/// InfiniteGridPass - editor-only fullscreen ground grid
///
/// Draws the classic infinite editor grid as a fullscreen triangle that
/// ray-casts the ground plane in the fragment shader. Runs only for the
/// editor's Scene view, blended over the scene after opaque geometry.

use aurora_3d_engine::aurora3d::Result;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use std::path::Path;

use crate::device::Device;
use super::{PassPipeline, PipelineDesc};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GridPushConstants {
    pub scene_buffer: u64,
}

const _: () = assert!(std::mem::size_of::<GridPushConstants>() <= 128);

pub struct InfiniteGridPass {
    pipeline: PassPipeline,
}

impl InfiniteGridPass {
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
                vert: &shader_dir.join("fullscreen.vert.spv"),
                frag: &shader_dir.join("grid.frag.spv"),
                color_format: Some(color_format),
                // Tested against scene depth so geometry occludes the grid
                depth_format: Some(depth_format),
                samples,
                depth_test: true,
                depth_write: false,
                blend: true,
                cull: vk::CullModeFlags::NONE,
                push_constant_size: std::mem::size_of::<GridPushConstants>() as u32,
            },
        )?;
        Ok(Self { pipeline })
    }

    pub fn draw(
        &self,
        device: &Device,
        cmd: vk::CommandBuffer,
        extent: vk::Extent2D,
        scene_buffer: u64,
    ) {
        self.pipeline.bind(device, cmd, extent);
        self.pipeline.push(cmd, &GridPushConstants { scene_buffer });
        unsafe {
            device.handle().cmd_draw(cmd, 3, 1, 0, 0);
        }
    }
}
