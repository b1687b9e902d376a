/// MeshCache - GPU-resident meshes addressed by MeshId
///
/// Uploads `MeshData` into device-local vertex/index buffers through the
/// staging path and keeps what the forward pass needs per mesh: index
/// count, vertex-buffer device address (pulled vertex fetch) and the local
/// bounding sphere. Ids are assigned monotonically and never recycled.

use aurora_3d_engine::aurora3d::assets::MeshData;
use aurora_3d_engine::aurora3d::render::{MeshId, Vertex};
use aurora_3d_engine::aurora3d::scene::BoundingSphere;
use aurora_3d_engine::aurora3d::utils::IdAllocator;
use aurora_3d_engine::aurora3d::Result;
use aurora_3d_engine::{engine_debug, engine_err};
use ash::vk;
use glam::{Vec2, Vec3};
use gpu_allocator::MemoryLocation;

use crate::buffer::AllocatedBuffer;
use crate::device::Device;

/// One GPU-resident mesh.
pub struct GpuMesh {
    pub name: String,
    vertex_buffer: AllocatedBuffer,
    index_buffer: AllocatedBuffer,
    index_count: u32,
    /// Local-space bounds; world bounds come from the entity transform
    local_bounds: BoundingSphere,
}

impl GpuMesh {
    pub fn index_buffer(&self) -> vk::Buffer {
        self.index_buffer.handle()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Device address shaders use to pull vertices.
    pub fn vertex_address(&self) -> u64 {
        self.vertex_buffer.device_address()
    }

    pub fn local_bounds(&self) -> BoundingSphere {
        self.local_bounds
    }
}

pub struct MeshCache {
    meshes: Vec<GpuMesh>,
    ids: IdAllocator,
    cube: MeshId,
    quad: MeshId,
}

impl MeshCache {
    /// Create the cache and upload the built-in primitives.
    pub fn new(device: &Device) -> Result<Self> {
        let mut cache = Self {
            meshes: Vec::new(),
            ids: IdAllocator::new(),
            cube: MeshId::NULL,
            quad: MeshId::NULL,
        };
        cache.cube = cache.upload_mesh(device, &unit_cube_data())?;
        cache.quad = cache.upload_mesh(device, &unit_quad_data())?;
        engine_debug!("aurora3d::MeshCache", "Built-in primitives uploaded");
        Ok(cache)
    }

    /// Upload a decoded mesh into device-local buffers.
    ///
    /// Called on the render thread only, on the import path (never inside
    /// a frame): the staging copy goes through a blocking one-shot submit.
    pub fn upload_mesh(&mut self, device: &Device, data: &MeshData) -> Result<MeshId> {
        let raw = self
            .ids
            .alloc()
            .ok_or_else(|| engine_err!("aurora3d::MeshCache", "Mesh id space exhausted"))?;

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&data.vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&data.indices);

        let vertex_buffer = device.create_buffer(
            vertex_bytes.len() as u64,
            vk::BufferUsageFlags::STORAGE_BUFFER
                | vk::BufferUsageFlags::TRANSFER_DST
                | vk::BufferUsageFlags::SHADER_DEVICE_ADDRESS,
            MemoryLocation::GpuOnly,
            &format!("{} vertices", data.name),
        )?;
        let index_buffer = device.create_buffer(
            index_bytes.len() as u64,
            vk::BufferUsageFlags::INDEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
            MemoryLocation::GpuOnly,
            &format!("{} indices", data.name),
        )?;

        let staging = device.create_buffer(
            (vertex_bytes.len() + index_bytes.len()) as u64,
            vk::BufferUsageFlags::TRANSFER_SRC,
            MemoryLocation::CpuToGpu,
            "mesh staging",
        )?;
        staging.write(0, vertex_bytes)?;
        staging.write(vertex_bytes.len() as u64, index_bytes)?;

        let vk_device = device.handle().clone();
        let staging_handle = staging.handle();
        let vertex_handle = vertex_buffer.handle();
        let index_handle = index_buffer.handle();
        let vertex_len = vertex_bytes.len() as u64;
        let index_len = index_bytes.len() as u64;
        device.immediate_submit(|cmd| unsafe {
            let vertex_copy = vk::BufferCopy {
                src_offset: 0,
                dst_offset: 0,
                size: vertex_len,
            };
            vk_device.cmd_copy_buffer(cmd, staging_handle, vertex_handle, &[vertex_copy]);
            let index_copy = vk::BufferCopy {
                src_offset: vertex_len,
                dst_offset: 0,
                size: index_len,
            };
            vk_device.cmd_copy_buffer(cmd, staging_handle, index_handle, &[index_copy]);
        })?;

        self.meshes.push(GpuMesh {
            name: data.name.clone(),
            vertex_buffer,
            index_buffer,
            index_count: data.index_count(),
            local_bounds: data.local_bounds,
        });
        Ok(MeshId::new(raw))
    }

    pub fn get(&self, id: MeshId) -> Option<&GpuMesh> {
        if id.is_null() {
            return None;
        }
        self.meshes.get(id.index())
    }

    /// Built-in unit cube
    pub fn cube(&self) -> MeshId {
        self.cube
    }

    /// Built-in unit quad (XY plane)
    pub fn quad(&self) -> MeshId {
        self.quad
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

// ===== BUILT-IN PRIMITIVES =====

/// Axis-aligned unit cube centered at the origin, 4 vertices per face.
pub fn unit_cube_data() -> MeshData {
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        // (normal, tangent u, tangent v)
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let corners = [
        (Vec2::new(-0.5, -0.5), Vec2::new(0.0, 1.0)),
        (Vec2::new(0.5, -0.5), Vec2::new(1.0, 1.0)),
        (Vec2::new(0.5, 0.5), Vec2::new(1.0, 0.0)),
        (Vec2::new(-0.5, 0.5), Vec2::new(0.0, 0.0)),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (normal, u, v)) in faces.iter().enumerate() {
        let base = (face * 4) as u32;
        for (corner, uv) in corners {
            let position = *normal * 0.5 + *u * corner.x + *v * corner.y;
            vertices.push(Vertex::new(position, *normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    MeshData::new("cube", vertices, indices)
}

/// Unit quad in the XY plane, facing +Z.
pub fn unit_quad_data() -> MeshData {
    let vertices = vec![
        Vertex::new(Vec3::new(-0.5, -0.5, 0.0), Vec3::Z, Vec2::new(0.0, 1.0)),
        Vertex::new(Vec3::new(0.5, -0.5, 0.0), Vec3::Z, Vec2::new(1.0, 1.0)),
        Vertex::new(Vec3::new(0.5, 0.5, 0.0), Vec3::Z, Vec2::new(1.0, 0.0)),
        Vertex::new(Vec3::new(-0.5, 0.5, 0.0), Vec3::Z, Vec2::new(0.0, 0.0)),
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    MeshData::new("quad", vertices, indices)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mesh_cache_tests.rs"]
mod tests;
