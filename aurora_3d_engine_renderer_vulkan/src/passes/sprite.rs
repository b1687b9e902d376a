/// SpriteBatchPass - instanced billboard quads, batched by image
///
/// Sprites collected from the scene walk are sorted by image id and drawn
/// as one instanced draw per contiguous run. Instance data goes through an
/// NBuffer so the CPU never rewrites a region a previous frame still reads.

use aurora_3d_engine::aurora3d::render::{ImageId, FRAME_OVERLAP};
use aurora_3d_engine::aurora3d::Result;
use ash::vk;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use std::path::Path;

use crate::device::Device;
use crate::nbuffer::NBuffer;
use super::{PassPipeline, PipelineDesc};

/// Instance capacity of the sprite buffer; sprites beyond this are dropped
/// for the frame.
pub const MAX_SPRITES: usize = 4096;

/// One sprite instance as the vertex shader pulls it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// World-space center
    pub position: Vec3,
    pub _pad0: f32,
    /// World-space quad size
    pub size: Vec2,
    pub _pad1: [f32; 2],
    pub tint: Vec4,
    pub image: ImageId,
    pub _pad2: [u32; 3],
}

const _: () = assert!(std::mem::size_of::<SpriteInstance>() == 64);

/// A contiguous run of instances sharing one image: one instanced draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRun {
    pub image: ImageId,
    pub first: u32,
    pub count: u32,
}

/// Sort instances by image id and compute the draw runs.
///
/// Sorting makes every image's instances contiguous, so the pass issues
/// exactly one draw per distinct image.
pub fn batch_sprites(instances: &mut [SpriteInstance]) -> Vec<SpriteRun> {
    instances.sort_unstable_by_key(|s| s.image);
    let mut runs: Vec<SpriteRun> = Vec::new();
    for (index, instance) in instances.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.image == instance.image => run.count += 1,
            _ => runs.push(SpriteRun {
                image: instance.image,
                first: index as u32,
                count: 1,
            }),
        }
    }
    runs
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SpritePushConstants {
    pub scene_buffer: u64,
    pub instance_buffer: u64,
    /// Index of the run's first instance in the instance buffer
    pub first_instance: u32,
    pub image: ImageId,
}

const _: () = assert!(std::mem::size_of::<SpritePushConstants>() <= 128);

pub struct SpriteBatchPass {
    pipeline: PassPipeline,
    instances: NBuffer,
}

impl SpriteBatchPass {
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
                vert: &shader_dir.join("sprite.vert.spv"),
                frag: &shader_dir.join("sprite.frag.spv"),
                color_format: Some(color_format),
                depth_format: Some(depth_format),
                samples,
                depth_test: true,
                depth_write: false,
                blend: true,
                cull: vk::CullModeFlags::NONE,
                push_constant_size: std::mem::size_of::<SpritePushConstants>() as u32,
            },
        )?;
        let instances = NBuffer::new(
            device,
            vk::BufferUsageFlags::STORAGE_BUFFER,
            (MAX_SPRITES * std::mem::size_of::<SpriteInstance>()) as u64,
            FRAME_OVERLAP,
            "sprite instances",
        )?;
        Ok(Self {
            pipeline,
            instances,
        })
    }

    /// Stage this frame's instances. Must be recorded before the main
    /// rendering block (transfers cannot run inside dynamic rendering).
    pub fn upload(
        &self,
        device: &Device,
        cmd: vk::CommandBuffer,
        frame_slot: usize,
        instances: &[SpriteInstance],
    ) -> Result<()> {
        let instances = &instances[..instances.len().min(MAX_SPRITES)];
        self.instances.upload_new_data(
            device.handle(),
            cmd,
            frame_slot,
            bytemuck::cast_slice(instances),
            0,
            true,
        )
    }

    /// One instanced draw per run (6 vertices per sprite quad).
    pub fn draw(
        &self,
        device: &Device,
        cmd: vk::CommandBuffer,
        extent: vk::Extent2D,
        scene_buffer: u64,
        runs: &[SpriteRun],
    ) {
        if runs.is_empty() {
            return;
        }
        self.pipeline.bind(device, cmd, extent);
        for run in runs {
            self.pipeline.push(
                cmd,
                &SpritePushConstants {
                    scene_buffer,
                    instance_buffer: self.instances.device_address(),
                    first_instance: run.first,
                    image: run.image,
                },
            );
            unsafe {
                device.handle().cmd_draw(cmd, 6, run.count, 0, 0);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "sprite_tests.rs"]
mod tests;
