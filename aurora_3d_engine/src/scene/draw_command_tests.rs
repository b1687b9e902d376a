use super::*;
use crate::camera::Frustum;
use glam::{Mat4, Vec3};

fn command(mesh: u32, material: u32, center: Vec3, radius: f32) -> MeshDrawCommand {
    MeshDrawCommand {
        mesh_id: MeshId::new(mesh),
        model: Mat4::IDENTITY,
        visible: true,
        entity_id: mesh + 1,
        bounds: BoundingSphere::new(center, radius),
        material_id: MaterialId::new(material),
    }
}

fn camera_frustum() -> Frustum {
    let proj = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
    Frustum::from_view_projection(&(proj * view))
}

// ============================================================================
// Culling — spec scenario: outside sphere records zero draws, inside one
// ============================================================================

#[test]
fn test_sphere_outside_all_planes_is_culled() {
    let frustum = camera_frustum();
    let commands = vec![command(0, 0, Vec3::new(0.0, 0.0, 50.0), 1.0)];
    assert!(cull_draw_commands(&commands, &frustum).is_empty());
}

#[test]
fn test_sphere_inside_survives_exactly_once() {
    let frustum = camera_frustum();
    let commands = vec![command(0, 0, Vec3::new(0.0, 0.0, -10.0), 1.0)];
    let visible = cull_draw_commands(&commands, &frustum);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].mesh_id, MeshId::new(0));
}

#[test]
fn test_invisible_entity_is_skipped_even_in_frustum() {
    let frustum = camera_frustum();
    let mut cmd = command(0, 0, Vec3::new(0.0, 0.0, -10.0), 1.0);
    cmd.visible = false;
    assert!(cull_draw_commands(&[cmd], &frustum).is_empty());
}

#[test]
fn test_mixed_visibility() {
    let frustum = camera_frustum();
    let commands = vec![
        command(0, 0, Vec3::new(0.0, 0.0, -5.0), 1.0),   // in
        command(1, 0, Vec3::new(0.0, 0.0, 50.0), 1.0),   // behind camera
        command(2, 0, Vec3::new(-200.0, 0.0, -5.0), 1.0), // far left
        command(3, 0, Vec3::new(0.0, 0.0, -20.0), 1.0),  // in
    ];
    let visible = cull_draw_commands(&commands, &frustum);
    let ids: Vec<u32> = visible.iter().map(|c| c.mesh_id.raw()).collect();
    assert_eq!(ids, vec![0, 3]);
}

// ============================================================================
// Material sorting
// ============================================================================

#[test]
fn test_sort_groups_by_material() {
    let mut commands = vec![
        command(0, 7, Vec3::ZERO, 1.0),
        command(1, 2, Vec3::ZERO, 1.0),
        command(2, 7, Vec3::ZERO, 1.0),
        command(3, 0, Vec3::ZERO, 1.0),
        command(4, 2, Vec3::ZERO, 1.0),
    ];
    sort_by_material(&mut commands);

    let materials: Vec<u32> = commands.iter().map(|c| c.material_id.raw()).collect();
    assert_eq!(materials, vec![0, 2, 2, 7, 7]);
}

#[test]
fn test_sort_handles_large_ids() {
    let mut commands = vec![
        command(0, 0x0101_0000, Vec3::ZERO, 1.0),
        command(1, 0x0000_0001, Vec3::ZERO, 1.0),
        command(2, 0x0001_0000, Vec3::ZERO, 1.0),
    ];
    sort_by_material(&mut commands);
    let materials: Vec<u32> = commands.iter().map(|c| c.material_id.raw()).collect();
    assert_eq!(materials, vec![0x0000_0001, 0x0001_0000, 0x0101_0000]);
}

#[test]
fn test_sort_empty_and_single() {
    let mut empty: Vec<MeshDrawCommand> = Vec::new();
    sort_by_material(&mut empty);
    assert!(empty.is_empty());

    let mut single = vec![command(0, 5, Vec3::ZERO, 1.0)];
    sort_by_material(&mut single);
    assert_eq!(single[0].material_id, MaterialId::new(5));
}
