/// Bounding sphere used for per-draw frustum culling.
///
/// Meshes carry a local-space sphere computed once at upload time;
/// the scene renderer transforms it into world space every frame.

use glam::{Mat4, Vec3};

/// A sphere enclosing a mesh's vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere enclosing a point set: centroid center, max-distance radius.
    ///
    /// Not the minimal enclosing sphere, but cheap and conservative —
    /// good enough for culling, computed once per mesh at upload.
    pub fn from_points(points: impl IntoIterator<Item = Vec3> + Clone) -> Self {
        let mut count = 0u32;
        let mut sum = Vec3::ZERO;
        for p in points.clone() {
            sum += p;
            count += 1;
        }
        if count == 0 {
            return Self::new(Vec3::ZERO, 0.0);
        }
        let center = sum / count as f32;

        let mut radius_sq = 0f32;
        for p in points {
            radius_sq = radius_sq.max(center.distance_squared(p));
        }
        Self::new(center, radius_sq.sqrt())
    }

    /// Transform the sphere into another space.
    ///
    /// The center follows the full matrix; the radius scales by the
    /// longest axis scale so non-uniform scaling stays conservative.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let center = matrix.transform_point3(self.center);
        let max_scale = matrix.x_axis.truncate().length()
            .max(matrix.y_axis.truncate().length())
            .max(matrix.z_axis.truncate().length());
        Self::new(center, self.radius * max_scale)
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
