/// MaterialCache - CPU materials mirrored into one GPU array
///
/// The CPU side holds editable `Material` values; the GPU side is a single
/// persistently-mapped array of `MaterialData` (`MAX_MATERIALS` slots) that
/// shaders index by `MaterialId` through its device address. Every add or
/// update writes its GPU slot before returning, so a material id handed out
/// is immediately valid to draw with.

use aurora_3d_engine::aurora3d::render::{ImageId, MaterialData, MaterialId, MAX_MATERIALS};
use aurora_3d_engine::aurora3d::utils::IdAllocator;
use aurora_3d_engine::aurora3d::{Error, Result};
use aurora_3d_engine::engine_err;
use ash::vk;
use glam::{Vec3, Vec4};
use gpu_allocator::MemoryLocation;

use crate::buffer::AllocatedBuffer;
use crate::device::Device;
use crate::image_cache::DefaultImages;

/// Editable CPU-side material.
///
/// Texture slots may be `ImageId::NULL`; packing substitutes the matching
/// default image, so the GPU never sees a null id.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub base_color_factor: Vec4,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub emissive_factor: Vec3,
    pub color_image: ImageId,
    pub normal_image: ImageId,
    pub metal_rough_image: ImageId,
    pub emissive_image: ImageId,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color_factor: Vec4::ONE,
            metallic_factor: 0.0,
            roughness_factor: 1.0,
            emissive_factor: Vec3::ZERO,
            color_image: ImageId::NULL,
            normal_image: ImageId::NULL,
            metal_rough_image: ImageId::NULL,
            emissive_image: ImageId::NULL,
        }
    }
}

/// Pack a material into its GPU layout, substituting default images for
/// unset texture slots.
pub fn pack_material(material: &Material, defaults: &DefaultImages) -> MaterialData {
    let or_default = |id: ImageId, fallback: ImageId| if id.is_null() { fallback } else { id };
    MaterialData {
        base_color_factor: material.base_color_factor,
        emissive_factor: material.emissive_factor,
        metallic_factor: material.metallic_factor,
        roughness_factor: material.roughness_factor,
        color_image: or_default(material.color_image, defaults.white),
        normal_image: or_default(material.normal_image, defaults.flat_normal),
        metal_rough_image: or_default(material.metal_rough_image, defaults.white),
        emissive_image: or_default(material.emissive_image, defaults.black),
        _pad: [0; 3],
    }
}

pub struct MaterialCache {
    materials: Vec<Material>,
    ids: IdAllocator,
    /// Persistently mapped `MaterialData` array of MAX_MATERIALS slots
    gpu_array: AllocatedBuffer,
    defaults: DefaultImages,
}

impl MaterialCache {
    pub fn new(device: &Device, defaults: DefaultImages) -> Result<Self> {
        let gpu_array = device.create_buffer(
            (MAX_MATERIALS * std::mem::size_of::<MaterialData>()) as u64,
            vk::BufferUsageFlags::STORAGE_BUFFER | vk::BufferUsageFlags::SHADER_DEVICE_ADDRESS,
            MemoryLocation::CpuToGpu,
            "material array",
        )?;
        Ok(Self {
            materials: Vec::new(),
            ids: IdAllocator::with_capacity(MAX_MATERIALS as u32),
            gpu_array,
            defaults,
        })
    }

    /// Device address of the material array (goes into `GpuSceneData`).
    pub fn device_address(&self) -> u64 {
        self.gpu_array.device_address()
    }

    /// Register a material; its GPU slot is written before the id is
    /// returned.
    pub fn add_material(&mut self, material: Material) -> Result<MaterialId> {
        let raw = self
            .ids
            .alloc()
            .ok_or_else(|| engine_err!("aurora3d::MaterialCache", "Material array is full ({} slots)", MAX_MATERIALS))?;
        let id = MaterialId::new(raw);
        self.write_slot(id, &material)?;
        self.materials.push(material);
        Ok(id)
    }

    /// Rewrite an existing material in place, CPU and GPU sides together.
    pub fn update_material(&mut self, id: MaterialId, material: Material) -> Result<()> {
        if id.is_null() || !self.ids.is_live(id.raw()) {
            return Err(Error::InvalidResource(format!("material id {}", id.raw())));
        }
        self.write_slot(id, &material)?;
        self.materials[id.index()] = material;
        Ok(())
    }

    /// O(1) lookup of the CPU-side material.
    pub fn get_material(&self, id: MaterialId) -> Option<&Material> {
        if id.is_null() {
            return None;
        }
        self.materials.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    fn write_slot(&self, id: MaterialId, material: &Material) -> Result<()> {
        let packed = pack_material(material, &self.defaults);
        let offset = (id.index() * std::mem::size_of::<MaterialData>()) as u64;
        self.gpu_array.write(offset, bytemuck::bytes_of(&packed))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "material_cache_tests.rs"]
mod tests;
