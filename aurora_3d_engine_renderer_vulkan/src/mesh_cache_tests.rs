use super::{unit_cube_data, unit_quad_data};
use glam::Vec3;

#[test]
fn test_unit_cube_shape() {
    let cube = unit_cube_data();
    assert_eq!(cube.vertex_count(), 24);
    assert_eq!(cube.index_count(), 36);
    // All indices reference a vertex
    assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertices.len()));
    // Every position sits on the unit cube surface
    for v in &cube.vertices {
        let p = v.position.abs();
        assert!(p.max_element() <= 0.5 + 1e-6);
        assert!((p.x - 0.5).abs() < 1e-6 || (p.y - 0.5).abs() < 1e-6 || (p.z - 0.5).abs() < 1e-6);
    }
}

#[test]
fn test_unit_cube_bounds() {
    let cube = unit_cube_data();
    let bounds = cube.local_bounds;
    assert!(bounds.center.distance(Vec3::ZERO) < 1e-5);
    // Corner distance: sqrt(3)/2
    assert!((bounds.radius - 0.75f32.sqrt()).abs() < 1e-5);
}

#[test]
fn test_unit_quad_shape() {
    let quad = unit_quad_data();
    assert_eq!(quad.vertex_count(), 4);
    assert_eq!(quad.index_count(), 6);
    assert!(quad.vertices.iter().all(|v| v.position.z == 0.0));
    assert!(quad.vertices.iter().all(|v| v.normal == Vec3::Z));
}
