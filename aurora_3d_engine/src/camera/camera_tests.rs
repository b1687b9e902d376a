use super::*;
use glam::{Mat4, Vec3};

fn editor_camera() -> Camera {
    let view = Mat4::look_at_rh(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh(45f32.to_radians(), 1.0, 0.1, 100.0);
    Camera::new(CameraKind::Editor, view, proj, Vec3::new(0.0, 2.0, 5.0))
}

#[test]
fn test_accessors() {
    let cam = editor_camera();
    assert_eq!(cam.kind(), CameraKind::Editor);
    assert_eq!(cam.position(), Vec3::new(0.0, 2.0, 5.0));
}

#[test]
fn test_view_projection_is_projection_times_view() {
    let cam = editor_camera();
    let expected = *cam.projection() * *cam.view();
    assert_eq!(cam.view_projection(), expected);
}

#[test]
fn test_setters_store_without_computation() {
    let mut cam = editor_camera();
    let new_view = Mat4::IDENTITY;
    cam.set_view(new_view);
    assert_eq!(*cam.view(), new_view);

    cam.set_projection(Mat4::IDENTITY);
    assert_eq!(cam.view_projection(), Mat4::IDENTITY);

    cam.set_position(Vec3::ONE);
    assert_eq!(cam.position(), Vec3::ONE);
}

#[test]
fn test_frustum_follows_matrices() {
    let cam = editor_camera();
    let frustum = cam.frustum();
    // Looking at the origin from (0, 2, 5): the origin is visible
    assert!(frustum.contains_point(Vec3::ZERO));
    // A point far behind the camera is not
    assert!(!frustum.contains_point(Vec3::new(0.0, 2.0, 50.0)));
}
