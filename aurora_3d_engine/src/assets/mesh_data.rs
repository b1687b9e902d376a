/// CPU-side mesh payload produced by asset-loading tasks.
///
/// Workers only ever produce this struct — decoded vertices and indices
/// plus a precomputed local bounding sphere. Uploading it into GPU
/// buffers happens later, on the render thread, through the mesh cache.

use crate::render_data::Vertex;
use crate::scene::BoundingSphere;

#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Local-space bounds, computed once at decode time
    pub local_bounds: BoundingSphere,
}

impl MeshData {
    /// Build mesh data, computing the local bounding sphere.
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let local_bounds = BoundingSphere::from_points(vertices.iter().map(|v| v.position));
        Self {
            name: name.into(),
            vertices,
            indices,
            local_bounds,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}
