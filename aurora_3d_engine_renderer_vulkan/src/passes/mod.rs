/// Render passes - one pipeline each, dynamic rendering, push constants only
///
/// Every pass follows the same shape: `new` builds exactly one graphics
/// pipeline and layout against the bindless set layouts, `draw` binds the
/// pipeline plus the two bindless sets, pushes a POD block and records its
/// draws. Passes hold no per-frame mutable state beyond their pipeline
/// handles; everything varying reaches shaders through push constants and
/// buffer device addresses.

mod depth_resolve;
mod forward;
mod grid;
mod post_fx;
mod sky;
mod sprite;

pub use depth_resolve::DepthResolvePass;
pub use forward::{ForwardPass, ForwardPushConstants};
pub use grid::InfiniteGridPass;
pub use post_fx::PostFxPass;
pub use sky::{IblPrecompute, SkyPass};
pub use sprite::{batch_sprites, SpriteBatchPass, SpriteInstance, SpriteRun, MAX_SPRITES};

use aurora_3d_engine::aurora3d::{Error, Result};
use aurora_3d_engine::engine_error;
use ash::vk;
use std::path::Path;

use crate::device::Device;
use crate::shader::load_shader_module;

/// Push constants are visible to both stages of every pass pipeline.
pub(crate) const PUSH_CONSTANT_STAGES: vk::ShaderStageFlags =
    vk::ShaderStageFlags::from_raw(
        vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw(),
    );

/// What a pass pipeline needs beyond the common fixed state.
pub(crate) struct PipelineDesc<'a> {
    pub vert: &'a Path,
    pub frag: &'a Path,
    pub color_format: Option<vk::Format>,
    pub depth_format: Option<vk::Format>,
    pub samples: vk::SampleCountFlags,
    pub depth_test: bool,
    pub depth_write: bool,
    pub blend: bool,
    pub cull: vk::CullModeFlags,
    pub push_constant_size: u32,
}

/// A pass pipeline and its layout, destroyed together.
pub(crate) struct PassPipeline {
    device: ash::Device,
    pub pipeline: vk::Pipeline,
    pub layout: vk::PipelineLayout,
}

impl PassPipeline {
    /// Build the one pipeline of a pass.
    ///
    /// No vertex input state: every pass pulls its data from buffer device
    /// addresses or generates fullscreen geometry from the vertex index.
    pub fn build(device: &Device, desc: &PipelineDesc) -> Result<Self> {
        let vk_device = device.handle().clone();

        let vert_module = load_shader_module(&vk_device, desc.vert)?;
        let frag_module = match load_shader_module(&vk_device, desc.frag) {
            Ok(m) => m,
            Err(e) => {
                unsafe { vk_device.destroy_shader_module(vert_module, None) };
                return Err(e);
            }
        };

        let result = Self::build_with_modules(device, desc, vert_module, frag_module);
        unsafe {
            vk_device.destroy_shader_module(vert_module, None);
            vk_device.destroy_shader_module(frag_module, None);
        }
        result
    }

    fn build_with_modules(
        device: &Device,
        desc: &PipelineDesc,
        vert_module: vk::ShaderModule,
        frag_module: vk::ShaderModule,
    ) -> Result<Self> {
        let vk_device = device.handle().clone();
        unsafe {
            let set_layouts = device.bindless().set_layouts();
            let push_ranges = [vk::PushConstantRange {
                stage_flags: PUSH_CONSTANT_STAGES,
                offset: 0,
                size: desc.push_constant_size,
            }];
            let layout_info = vk::PipelineLayoutCreateInfo::default()
                .set_layouts(&set_layouts)
                .push_constant_ranges(&push_ranges);
            let layout = vk_device
                .create_pipeline_layout(&layout_info, None)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create pipeline layout: {:?}", e);
                    Error::InitializationFailed(format!(
                        "Failed to create pipeline layout: {:?}",
                        e
                    ))
                })?;

            let stages = [
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::VERTEX)
                    .module(vert_module)
                    .name(c"main"),
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::FRAGMENT)
                    .module(frag_module)
                    .name(c"main"),
            ];

            let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
            let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
                .topology(vk::PrimitiveTopology::TRIANGLE_LIST);
            let viewport_state = vk::PipelineViewportStateCreateInfo::default()
                .viewport_count(1)
                .scissor_count(1);
            let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
                .polygon_mode(vk::PolygonMode::FILL)
                .cull_mode(desc.cull)
                .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
                .line_width(1.0);
            let multisample = vk::PipelineMultisampleStateCreateInfo::default()
                .rasterization_samples(desc.samples);
            // Depth writes only happen while the test is enabled, so a
            // write-only pass still enables the test with compare ALWAYS.
            let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
                .depth_test_enable(desc.depth_test || desc.depth_write)
                .depth_write_enable(desc.depth_write)
                .depth_compare_op(if desc.depth_test {
                    vk::CompareOp::LESS_OR_EQUAL
                } else {
                    vk::CompareOp::ALWAYS
                });

            let blend_attachments = [if desc.blend {
                vk::PipelineColorBlendAttachmentState::default()
                    .blend_enable(true)
                    .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
                    .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
                    .color_blend_op(vk::BlendOp::ADD)
                    .src_alpha_blend_factor(vk::BlendFactor::ONE)
                    .dst_alpha_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
                    .alpha_blend_op(vk::BlendOp::ADD)
                    .color_write_mask(vk::ColorComponentFlags::RGBA)
            } else {
                vk::PipelineColorBlendAttachmentState::default()
                    .color_write_mask(vk::ColorComponentFlags::RGBA)
            }];
            let attachments: &[vk::PipelineColorBlendAttachmentState] =
                if desc.color_format.is_some() {
                    &blend_attachments
                } else {
                    &[]
                };
            let color_blend =
                vk::PipelineColorBlendStateCreateInfo::default().attachments(attachments);

            let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
            let dynamic_state =
                vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

            let color_formats: Vec<vk::Format> = desc.color_format.into_iter().collect();
            let mut rendering_info = vk::PipelineRenderingCreateInfo::default()
                .color_attachment_formats(&color_formats)
                .depth_attachment_format(desc.depth_format.unwrap_or(vk::Format::UNDEFINED));

            let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
                .stages(&stages)
                .vertex_input_state(&vertex_input)
                .input_assembly_state(&input_assembly)
                .viewport_state(&viewport_state)
                .rasterization_state(&rasterization)
                .multisample_state(&multisample)
                .depth_stencil_state(&depth_stencil)
                .color_blend_state(&color_blend)
                .dynamic_state(&dynamic_state)
                .layout(layout)
                .push_next(&mut rendering_info);

            let pipeline = vk_device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
                .map_err(|(_, e)| {
                    vk_device.destroy_pipeline_layout(layout, None);
                    engine_error!("aurora3d::vulkan", "Failed to create graphics pipeline: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create pipeline: {:?}", e))
                })?[0];

            Ok(Self {
                device: vk_device,
                pipeline,
                layout,
            })
        }
    }

    /// Bind the pipeline, both bindless sets and the viewport/scissor.
    pub fn bind(&self, device: &Device, cmd: vk::CommandBuffer, extent: vk::Extent2D) {
        unsafe {
            self.device
                .cmd_bind_pipeline(cmd, vk::PipelineBindPoint::GRAPHICS, self.pipeline);
            device
                .bindless()
                .bind(cmd, vk::PipelineBindPoint::GRAPHICS, self.layout);
            let viewport = vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            };
            self.device.cmd_set_viewport(cmd, 0, &[viewport]);
            let scissor = vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            };
            self.device.cmd_set_scissor(cmd, 0, &[scissor]);
        }
    }

    /// Push a POD constant block.
    pub fn push<T: bytemuck::Pod>(&self, cmd: vk::CommandBuffer, constants: &T) {
        unsafe {
            self.device.cmd_push_constants(
                cmd,
                self.layout,
                PUSH_CONSTANT_STAGES,
                0,
                bytemuck::bytes_of(constants),
            );
        }
    }
}

impl Drop for PassPipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}
