use super::*;
use crate::render_data::Vertex;
use glam::{Vec2, Vec3};
use std::time::{Duration, Instant};

fn triangle() -> MeshData {
    MeshData::new(
        "triangle",
        vec![
            Vertex::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::Z, Vec2::ZERO),
            Vertex::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Z, Vec2::X),
            Vertex::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, Vec2::Y),
        ],
        vec![0, 1, 2],
    )
}

fn poll_until_terminal(manager: &mut AssetManager, handle: AssetHandle) -> MeshPoll {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let poll = manager.poll_mesh(handle);
        if poll != MeshPoll::Pending || Instant::now() > deadline {
            return poll;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

// ============================================================================
// Handle resolution
// ============================================================================

#[test]
fn test_handle_for_path_is_stable() {
    let mut manager = AssetManager::new(1);
    let a = manager.handle_for_path("meshes/hero.mesh");
    let b = manager.handle_for_path("meshes/hero.mesh");
    assert_eq!(a, b);
}

#[test]
fn test_distinct_paths_get_distinct_handles() {
    let mut manager = AssetManager::new(1);
    let a = manager.handle_for_path("meshes/hero.mesh");
    let b = manager.handle_for_path("meshes/enemy.mesh");
    assert_ne!(a, b);
}

#[test]
fn test_path_of_roundtrip() {
    let mut manager = AssetManager::new(1);
    let handle = manager.handle_for_path("meshes/hero.mesh");
    assert_eq!(
        manager.path_of(handle),
        Some(std::path::Path::new("meshes/hero.mesh"))
    );
}

// ============================================================================
// Async loading
// ============================================================================

#[test]
fn test_unrequested_mesh() {
    let mut manager = AssetManager::new(1);
    let handle = manager.handle_for_path("meshes/hero.mesh");
    assert_eq!(manager.poll_mesh(handle), MeshPoll::NotRequested);
    assert!(manager.take_mesh(handle).is_none());
}

#[test]
fn test_request_then_poll_to_ready() {
    let mut manager = AssetManager::new(1);
    let handle = manager.handle_for_path("meshes/hero.mesh");
    manager.request_mesh(handle, || Some(triangle()));

    assert_eq!(poll_until_terminal(&mut manager, handle), MeshPoll::Ready);

    let data = manager.take_mesh(handle).unwrap();
    assert_eq!(data.vertex_count(), 3);
    assert_eq!(data.index_count(), 3);

    // Taken, not re-loadable by accident
    assert_eq!(manager.poll_mesh(handle), MeshPoll::Taken);
    assert!(manager.take_mesh(handle).is_none());
}

#[test]
fn test_loader_returning_none_fails() {
    let mut manager = AssetManager::new(1);
    let handle = manager.handle_for_path("meshes/missing.mesh");
    manager.request_mesh(handle, || None);

    assert_eq!(poll_until_terminal(&mut manager, handle), MeshPoll::Failed);
    assert!(manager.take_mesh(handle).is_none());
}

#[test]
fn test_panicking_loader_fails() {
    let mut manager = AssetManager::new(1);
    let handle = manager.handle_for_path("meshes/corrupt.mesh");
    manager.request_mesh(handle, || panic!("bad file"));

    assert_eq!(poll_until_terminal(&mut manager, handle), MeshPoll::Failed);
}

#[test]
fn test_duplicate_request_is_ignored() {
    let mut manager = AssetManager::new(1);
    let handle = manager.handle_for_path("meshes/hero.mesh");
    manager.request_mesh(handle, || Some(triangle()));
    // Second request with a would-fail loader must not replace the first
    manager.request_mesh(handle, || None);

    assert_eq!(poll_until_terminal(&mut manager, handle), MeshPoll::Ready);
}

#[test]
fn test_mesh_data_bounds_computed() {
    let data = triangle();
    // All three vertices are within the computed sphere
    for v in &data.vertices {
        assert!(
            data.local_bounds.center.distance(v.position) <= data.local_bounds.radius + 1e-5
        );
    }
}
