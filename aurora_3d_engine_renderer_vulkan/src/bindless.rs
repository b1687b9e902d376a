/// Bindless descriptor table - the only descriptor state in the renderer
///
/// Two sets, allocated once at device init and never reallocated:
/// - set 0: one runtime-sized array of combined image samplers, indexed by
///   `ImageId` from shaders (partially bound, update-after-bind)
/// - set 1: a single storage buffer for mouse-pick readback
///
/// There are no per-material or per-mesh descriptor sets anywhere; all other
/// data reaches shaders through buffer device addresses in push constants.

use aurora_3d_engine::aurora3d::render::ImageId;
use aurora_3d_engine::aurora3d::{Error, Result};
use aurora_3d_engine::engine_error;
use ash::vk;

/// Capacity of the global sampled-image array.
pub const MAX_BINDLESS_IMAGES: u32 = 4096;

pub struct BindlessTable {
    device: ash::Device,
    pool: vk::DescriptorPool,
    image_layout: vk::DescriptorSetLayout,
    pick_layout: vk::DescriptorSetLayout,
    image_set: vk::DescriptorSet,
    pick_set: vk::DescriptorSet,
}

impl BindlessTable {
    pub fn new(device: ash::Device) -> Result<Self> {
        unsafe {
            let pool_sizes = [
                vk::DescriptorPoolSize {
                    ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                    descriptor_count: MAX_BINDLESS_IMAGES,
                },
                vk::DescriptorPoolSize {
                    ty: vk::DescriptorType::STORAGE_BUFFER,
                    descriptor_count: 1,
                },
            ];
            let pool_info = vk::DescriptorPoolCreateInfo::default()
                .flags(vk::DescriptorPoolCreateFlags::UPDATE_AFTER_BIND)
                .pool_sizes(&pool_sizes)
                .max_sets(2);
            let pool = device.create_descriptor_pool(&pool_info, None).map_err(|e| {
                engine_error!("aurora3d::vulkan", "Failed to create bindless descriptor pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create descriptor pool: {:?}", e))
            })?;

            // Set 0: global sampled-image array
            let image_bindings = [vk::DescriptorSetLayoutBinding::default()
                .binding(0)
                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .descriptor_count(MAX_BINDLESS_IMAGES)
                .stage_flags(vk::ShaderStageFlags::ALL)];
            let binding_flags = [vk::DescriptorBindingFlags::PARTIALLY_BOUND
                | vk::DescriptorBindingFlags::UPDATE_AFTER_BIND
                | vk::DescriptorBindingFlags::UPDATE_UNUSED_WHILE_PENDING];
            let mut flags_info = vk::DescriptorSetLayoutBindingFlagsCreateInfo::default()
                .binding_flags(&binding_flags);
            let image_layout_info = vk::DescriptorSetLayoutCreateInfo::default()
                .flags(vk::DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL)
                .bindings(&image_bindings)
                .push_next(&mut flags_info);
            let image_layout = device
                .create_descriptor_set_layout(&image_layout_info, None)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create image array layout: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create set layout: {:?}", e))
                })?;

            // Set 1: pick storage buffer
            let pick_bindings = [vk::DescriptorSetLayoutBinding::default()
                .binding(0)
                .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
                .descriptor_count(1)
                .stage_flags(vk::ShaderStageFlags::ALL)];
            let pick_layout_info =
                vk::DescriptorSetLayoutCreateInfo::default().bindings(&pick_bindings);
            let pick_layout = device
                .create_descriptor_set_layout(&pick_layout_info, None)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create pick buffer layout: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create set layout: {:?}", e))
                })?;

            let layouts = [image_layout, pick_layout];
            let alloc_info = vk::DescriptorSetAllocateInfo::default()
                .descriptor_pool(pool)
                .set_layouts(&layouts);
            let sets = device.allocate_descriptor_sets(&alloc_info).map_err(|e| {
                engine_error!("aurora3d::vulkan", "Failed to allocate bindless sets: {:?}", e);
                Error::InitializationFailed(format!("Failed to allocate descriptor sets: {:?}", e))
            })?;

            Ok(Self {
                device,
                pool,
                image_layout,
                pick_layout,
                image_set: sets[0],
                pick_set: sets[1],
            })
        }
    }

    /// The two set layouts, in binding order, for pipeline layout creation.
    pub fn set_layouts(&self) -> [vk::DescriptorSetLayout; 2] {
        [self.image_layout, self.pick_layout]
    }

    /// Write `view` + `sampler` into the image array at `id`.
    ///
    /// Update-after-bind: safe to call while previous frames still
    /// reference other slots of the array.
    pub fn register_image(&self, id: ImageId, view: vk::ImageView, sampler: vk::Sampler) {
        debug_assert!(!id.is_null());
        debug_assert!(id.raw() < MAX_BINDLESS_IMAGES);
        let image_info = [vk::DescriptorImageInfo {
            sampler,
            image_view: view,
            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        }];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(self.image_set)
            .dst_binding(0)
            .dst_array_element(id.raw())
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(&image_info);
        unsafe {
            self.device.update_descriptor_sets(&[write], &[]);
        }
    }

    /// Point set 1 at the pick storage buffer. Called once at init.
    pub fn register_pick_buffer(&self, buffer: vk::Buffer, size: u64) {
        let buffer_info = [vk::DescriptorBufferInfo {
            buffer,
            offset: 0,
            range: size,
        }];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(self.pick_set)
            .dst_binding(0)
            .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
            .buffer_info(&buffer_info);
        unsafe {
            self.device.update_descriptor_sets(&[write], &[]);
        }
    }

    /// Bind both sets for graphics. Every pass does this first.
    pub fn bind(
        &self,
        cmd: vk::CommandBuffer,
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
    ) {
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                cmd,
                bind_point,
                layout,
                0,
                &[self.image_set, self.pick_set],
                &[],
            );
        }
    }
}

impl Drop for BindlessTable {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_set_layout(self.image_layout, None);
            self.device.destroy_descriptor_set_layout(self.pick_layout, None);
            self.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}
