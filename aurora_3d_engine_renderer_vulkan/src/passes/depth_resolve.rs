/// DepthResolvePass - collapse the MSAA depth target to one sample
///
/// Dynamic rendering has no automatic depth resolve the way color resolve
/// attachments work, so this is a fullscreen pass: the fragment shader
/// samples the multisampled depth image through its bindless id, takes the
/// minimum over the samples and writes it to gl_FragDepth. Only built when
/// the renderer runs with MSAA; pickers and post effects read the resolved
/// image.

use aurora_3d_engine::aurora3d::render::ImageId;
use aurora_3d_engine::aurora3d::Result;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use std::path::Path;

use crate::device::Device;
use crate::targets::SCENE_DEPTH_FORMAT;
use super::{PassPipeline, PipelineDesc};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DepthResolvePushConstants {
    pub depth_image: ImageId,
    pub sample_count: u32,
}

const _: () = assert!(std::mem::size_of::<DepthResolvePushConstants>() <= 128);

pub struct DepthResolvePass {
    pipeline: PassPipeline,
}

impl DepthResolvePass {
    pub fn new(device: &Device, shader_dir: &Path) -> Result<Self> {
        let pipeline = PassPipeline::build(
            device,
            &PipelineDesc {
                vert: &shader_dir.join("fullscreen.vert.spv"),
                frag: &shader_dir.join("depth_resolve.frag.spv"),
                color_format: None,
                depth_format: Some(SCENE_DEPTH_FORMAT),
                samples: vk::SampleCountFlags::TYPE_1,
                depth_test: false,
                depth_write: true,
                blend: false,
                cull: vk::CullModeFlags::NONE,
                push_constant_size: std::mem::size_of::<DepthResolvePushConstants>() as u32,
            },
        )?;
        Ok(Self { pipeline })
    }

    pub fn draw(
        &self,
        device: &Device,
        cmd: vk::CommandBuffer,
        extent: vk::Extent2D,
        msaa_depth_image: ImageId,
        sample_count: u32,
    ) {
        self.pipeline.bind(device, cmd, extent);
        self.pipeline.push(
            cmd,
            &DepthResolvePushConstants {
                depth_image: msaa_depth_image,
                sample_count,
            },
        );
        unsafe {
            device.handle().cmd_draw(cmd, 3, 1, 0, 0);
        }
    }
}
