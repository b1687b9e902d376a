/// SkyPass - fullscreen sky draw, fed by a lazily precomputed environment
///
/// `IblPrecompute` owns a small environment image rebuilt only when the
/// environment parameters change (dirty flag); `SkyPass` samples it behind
/// the scene geometry every frame.

use aurora_3d_engine::aurora3d::render::ImageId;
use aurora_3d_engine::aurora3d::Result;
use aurora_3d_engine::engine_debug;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use std::path::Path;

use crate::device::{transition_image, Device};
use crate::image::{AllocatedImage, ImageDesc};
use crate::image_cache::ImageCache;
use super::{PassPipeline, PipelineDesc};

const ENV_MAP_SIZE: u32 = 256;
const ENV_MAP_FORMAT: vk::Format = vk::Format::R16G16B16A16_SFLOAT;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SkyPushConstants {
    pub scene_buffer: u64,
    pub env_image: ImageId,
    pub _pad: u32,
}

const _: () = assert!(std::mem::size_of::<SkyPushConstants>() <= 128);

/// Lazily rebuilt environment map.
pub struct IblPrecompute {
    pipeline: PassPipeline,
    env: AllocatedImage,
    env_id: ImageId,
    dirty: bool,
}

impl IblPrecompute {
    pub fn new(device: &Device, images: &mut ImageCache, shader_dir: &Path) -> Result<Self> {
        let pipeline = PassPipeline::build(
            device,
            &PipelineDesc {
                vert: &shader_dir.join("fullscreen.vert.spv"),
                frag: &shader_dir.join("ibl_precompute.frag.spv"),
                color_format: Some(ENV_MAP_FORMAT),
                depth_format: None,
                samples: vk::SampleCountFlags::TYPE_1,
                depth_test: false,
                depth_write: false,
                blend: false,
                cull: vk::CullModeFlags::NONE,
                push_constant_size: std::mem::size_of::<SkyPushConstants>() as u32,
            },
        )?;
        let env = device.create_image(
            &ImageDesc {
                width: ENV_MAP_SIZE,
                height: ENV_MAP_SIZE,
                format: ENV_MAP_FORMAT,
                usage: vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::SAMPLED,
                samples: vk::SampleCountFlags::TYPE_1,
                mipmapped: false,
            },
            None,
        )?;
        let env_id = images.reserve_id()?;
        device.register_bindless_image(env_id, env.view());
        Ok(Self {
            pipeline,
            env,
            env_id,
            dirty: true,
        })
    }

    /// Bindless id of the environment map.
    pub fn env_id(&self) -> ImageId {
        self.env_id
    }

    /// Flag the environment for a rebuild at the top of the next frame.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Rebuild the environment map if the dirty flag is set.
    ///
    /// Recorded before the main rendering block of the frame.
    pub fn run_if_dirty(&mut self, device: &Device, cmd: vk::CommandBuffer, scene_buffer: u64) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        engine_debug!("aurora3d::SkyPass", "Rebuilding environment map");

        let vk_device = device.handle();
        let extent = self.env.extent();
        transition_image(
            vk_device,
            cmd,
            self.env.handle(),
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            0,
            1,
        );
        let color_attachment = vk::RenderingAttachmentInfo::default()
            .image_view(self.env.view())
            .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .load_op(vk::AttachmentLoadOp::DONT_CARE)
            .store_op(vk::AttachmentStoreOp::STORE);
        let color_attachments = [color_attachment];
        let rendering_info = vk::RenderingInfo::default()
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .layer_count(1)
            .color_attachments(&color_attachments);
        unsafe {
            vk_device.cmd_begin_rendering(cmd, &rendering_info);
        }
        self.pipeline.bind(device, cmd, extent);
        self.pipeline.push(
            cmd,
            &SkyPushConstants {
                scene_buffer,
                env_image: ImageId::NULL,
                _pad: 0,
            },
        );
        unsafe {
            vk_device.cmd_draw(cmd, 3, 1, 0, 0);
            vk_device.cmd_end_rendering(cmd);
        }
        transition_image(
            vk_device,
            cmd,
            self.env.handle(),
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            0,
            1,
        );
    }
}

pub struct SkyPass {
    pipeline: PassPipeline,
}

impl SkyPass {
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
                frag: &shader_dir.join("sky.frag.spv"),
                color_format: Some(color_format),
                // Depth test keeps the sky behind already-drawn geometry;
                // it never writes depth itself
                depth_format: Some(depth_format),
                samples,
                depth_test: false,
                depth_write: false,
                blend: false,
                cull: vk::CullModeFlags::NONE,
                push_constant_size: std::mem::size_of::<SkyPushConstants>() as u32,
            },
        )?;
        Ok(Self { pipeline })
    }

    /// Fullscreen sky draw. First draw inside the main rendering block.
    pub fn draw(
        &self,
        device: &Device,
        cmd: vk::CommandBuffer,
        extent: vk::Extent2D,
        scene_buffer: u64,
        env_image: ImageId,
    ) {
        self.pipeline.bind(device, cmd, extent);
        self.pipeline.push(
            cmd,
            &SkyPushConstants {
                scene_buffer,
                env_image,
                _pad: 0,
            },
        );
        unsafe {
            device.handle().cmd_draw(cmd, 3, 1, 0, 0);
        }
    }
}
