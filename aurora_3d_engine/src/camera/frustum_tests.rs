use super::*;
use glam::{Mat4, Vec3};

fn test_frustum() -> Frustum {
    // Perspective camera at origin looking down -Z
    let proj = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
    Frustum::from_view_projection(&(proj * view))
}

// ============================================================================
// Plane extraction
// ============================================================================

#[test]
fn test_planes_are_normalized() {
    let frustum = test_frustum();
    for plane in &frustum.planes {
        let len = Vec3::new(plane.x, plane.y, plane.z).length();
        assert!((len - 1.0).abs() < 1e-5, "plane normal not unit: {}", len);
    }
}

#[test]
fn test_point_in_front_is_inside() {
    let frustum = test_frustum();
    assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -10.0)));
}

#[test]
fn test_point_behind_camera_is_outside() {
    let frustum = test_frustum();
    assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
}

#[test]
fn test_point_beyond_far_plane_is_outside() {
    let frustum = test_frustum();
    assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -200.0)));
}

// ============================================================================
// Sphere culling — the per-draw-command test
// ============================================================================

#[test]
fn test_sphere_fully_inside() {
    let frustum = test_frustum();
    assert!(frustum.contains_sphere(Vec3::new(0.0, 0.0, -10.0), 1.0));
}

#[test]
fn test_sphere_fully_outside_all_planes() {
    let frustum = test_frustum();
    // Far behind the camera, nowhere near any plane
    assert!(!frustum.contains_sphere(Vec3::new(0.0, 0.0, 50.0), 1.0));
}

#[test]
fn test_sphere_straddling_near_plane_survives() {
    let frustum = test_frustum();
    // Center slightly behind the near plane, radius reaches through it
    assert!(frustum.contains_sphere(Vec3::new(0.0, 0.0, 0.0), 0.5));
}

#[test]
fn test_sphere_outside_side_plane() {
    let frustum = test_frustum();
    // Far to the left at a shallow depth — outside the left plane
    assert!(!frustum.contains_sphere(Vec3::new(-100.0, 0.0, -1.0), 1.0));
}

#[test]
fn test_large_sphere_enclosing_frustum_survives() {
    let frustum = test_frustum();
    // A sphere so large it contains the entire frustum must not be culled
    assert!(frustum.contains_sphere(Vec3::new(0.0, 0.0, -50.0), 1000.0));
}

#[test]
fn test_orthographic_projection_works() {
    let proj = Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
    let frustum = Frustum::from_view_projection(&(proj * view));

    assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -10.0)));
    assert!(!frustum.contains_point(Vec3::new(20.0, 0.0, -10.0)));
    assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
}
