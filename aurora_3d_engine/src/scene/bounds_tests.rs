use super::*;
use glam::{Mat4, Quat, Vec3};

#[test]
fn test_from_points_unit_cube() {
    let corners = [
        Vec3::new(-0.5, -0.5, -0.5),
        Vec3::new(0.5, -0.5, -0.5),
        Vec3::new(-0.5, 0.5, -0.5),
        Vec3::new(0.5, 0.5, -0.5),
        Vec3::new(-0.5, -0.5, 0.5),
        Vec3::new(0.5, -0.5, 0.5),
        Vec3::new(-0.5, 0.5, 0.5),
        Vec3::new(0.5, 0.5, 0.5),
    ];
    let sphere = BoundingSphere::from_points(corners);
    assert!(sphere.center.length() < 1e-6);
    // Half-diagonal of a unit cube
    let expected = (3f32).sqrt() * 0.5;
    assert!((sphere.radius - expected).abs() < 1e-5);
}

#[test]
fn test_from_points_empty() {
    let sphere = BoundingSphere::from_points(std::iter::empty());
    assert_eq!(sphere.center, Vec3::ZERO);
    assert_eq!(sphere.radius, 0.0);
}

#[test]
fn test_from_points_contains_all() {
    let points = [
        Vec3::new(1.0, 2.0, 3.0),
        Vec3::new(-4.0, 0.0, 1.0),
        Vec3::new(2.0, -7.0, 0.5),
    ];
    let sphere = BoundingSphere::from_points(points);
    for p in points {
        assert!(sphere.center.distance(p) <= sphere.radius + 1e-5);
    }
}

#[test]
fn test_transformed_translation() {
    let sphere = BoundingSphere::new(Vec3::ZERO, 1.0);
    let moved = sphere.transformed(&Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
    assert_eq!(moved.center, Vec3::new(5.0, 0.0, 0.0));
    assert_eq!(moved.radius, 1.0);
}

#[test]
fn test_transformed_uniform_scale() {
    let sphere = BoundingSphere::new(Vec3::X, 2.0);
    let scaled = sphere.transformed(&Mat4::from_scale(Vec3::splat(3.0)));
    assert_eq!(scaled.center, Vec3::new(3.0, 0.0, 0.0));
    assert!((scaled.radius - 6.0).abs() < 1e-6);
}

#[test]
fn test_transformed_nonuniform_scale_uses_max_axis() {
    let sphere = BoundingSphere::new(Vec3::ZERO, 1.0);
    let scaled = sphere.transformed(&Mat4::from_scale(Vec3::new(1.0, 4.0, 2.0)));
    // Conservative: radius follows the largest axis
    assert!((scaled.radius - 4.0).abs() < 1e-6);
}

#[test]
fn test_transformed_rotation_preserves_radius() {
    let sphere = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 0.5);
    let rot = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
    let rotated = sphere.transformed(&rot);
    assert!((rotated.radius - 0.5).abs() < 1e-6);
    assert!(rotated.center.distance(Vec3::new(0.0, 0.0, -1.0)) < 1e-5);
}
