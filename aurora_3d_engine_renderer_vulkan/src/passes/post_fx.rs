/// PostFxPass - tonemap the HDR scene color into the presentable target
///
/// Fullscreen pass reading the scene color through its bindless id and
/// writing the 8-bit post fx image the viewport displays.

use aurora_3d_engine::aurora3d::render::ImageId;
use aurora_3d_engine::aurora3d::Result;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use std::path::Path;

use crate::device::Device;
use crate::targets::POST_FX_FORMAT;
use super::{PassPipeline, PipelineDesc};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PostFxPushConstants {
    pub color_image: ImageId,
    pub _pad: u32,
}

const _: () = assert!(std::mem::size_of::<PostFxPushConstants>() <= 128);

pub struct PostFxPass {
    pipeline: PassPipeline,
}

impl PostFxPass {
    pub fn new(device: &Device, shader_dir: &Path) -> Result<Self> {
        let pipeline = PassPipeline::build(
            device,
            &PipelineDesc {
                vert: &shader_dir.join("fullscreen.vert.spv"),
                frag: &shader_dir.join("post_fx.frag.spv"),
                color_format: Some(POST_FX_FORMAT),
                depth_format: None,
                samples: vk::SampleCountFlags::TYPE_1,
                depth_test: false,
                depth_write: false,
                blend: false,
                cull: vk::CullModeFlags::NONE,
                push_constant_size: std::mem::size_of::<PostFxPushConstants>() as u32,
            },
        )?;
        Ok(Self { pipeline })
    }

    pub fn draw(
        &self,
        device: &Device,
        cmd: vk::CommandBuffer,
        extent: vk::Extent2D,
        scene_color: ImageId,
    ) {
        self.pipeline.bind(device, cmd, extent);
        self.pipeline.push(
            cmd,
            &PostFxPushConstants {
                color_image: scene_color,
                _pad: 0,
            },
        );
        unsafe {
            device.handle().cmd_draw(cmd, 3, 1, 0, 0);
        }
    }
}
