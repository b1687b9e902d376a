//! Integration tests for the scene-to-draw-command pipeline
//!
//! These tests run the full CPU half of a frame: entity store, async
//! asset resolution, draw command build, frustum culling and material
//! sorting. No GPU required.
//!
//! Run with: cargo test --test scene_integration_tests

use aurora_3d_engine::aurora3d::assets::{AssetManager, MeshData, MeshPoll};
use aurora_3d_engine::aurora3d::camera::{Camera, CameraKind};
use aurora_3d_engine::aurora3d::render::{MaterialId, MeshId, Vertex};
use aurora_3d_engine::aurora3d::scene::{
    cull_draw_commands, sort_by_material, BoundingSphere, EntityDesc, Light, LightCache,
    MeshDrawCommand, ModelSource, Scene, Transform,
};
use glam::{Mat4, Vec2, Vec3};
use std::time::{Duration, Instant};

fn test_mesh_data(name: &str) -> MeshData {
    let vertices = vec![
        Vertex::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::Z, Vec2::new(0.0, 0.0)),
        Vertex::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Z, Vec2::new(1.0, 0.0)),
        Vertex::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, Vec2::new(0.5, 1.0)),
    ];
    MeshData::new(name, vertices, vec![0, 1, 2])
}

fn look_at_camera(eye: Vec3, target: Vec3) -> Camera {
    let view = Mat4::look_at_rh(eye, target, Vec3::Y);
    let projection = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    Camera::new(CameraKind::Editor, view, projection, eye)
}

/// Poll until the asset manager reports a terminal state.
fn wait_for_mesh(assets: &mut AssetManager, handle: aurora_3d_engine::aurora3d::assets::AssetHandle) -> MeshPoll {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match assets.poll_mesh(handle) {
            MeshPoll::Pending => {
                assert!(Instant::now() < deadline, "mesh load timed out");
                std::thread::sleep(Duration::from_millis(1));
            }
            terminal => return terminal,
        }
    }
}

#[test]
fn test_integration_asset_to_draw_command() {
    let mut assets = AssetManager::new(2);
    let handle = assets.handle_for_path("meshes/rock.mesh");
    assets.request_mesh(handle, || Some(test_mesh_data("rock")));

    assert_eq!(wait_for_mesh(&mut assets, handle), MeshPoll::Ready);
    let data = assets.take_mesh(handle).unwrap();
    assert_eq!(data.index_count(), 3);
    assert_eq!(assets.poll_mesh(handle), MeshPoll::Taken);

    // The renderer would upload `data` here and record the cache id.
    let mesh_id = MeshId::new(0);
    let bounds = BoundingSphere::from_points(data.vertices.iter().map(|v| v.position));

    let mut scene = Scene::new();
    let key = scene.spawn(
        EntityDesc::new("rock").with_model(ModelSource::Asset(handle), MaterialId::new(0)),
    );
    let entity = scene.get(key).unwrap();

    let world = entity.transform.matrix();
    let command = MeshDrawCommand {
        mesh_id,
        model: world,
        visible: entity.visible,
        entity_id: entity.pick_id(),
        bounds: bounds.transformed(&world),
        material_id: MaterialId::new(0),
    };
    assert!(command.visible);
    assert_ne!(command.entity_id, 0);
}

#[test]
fn test_integration_failed_load_is_terminal() {
    let mut assets = AssetManager::new(1);
    let handle = assets.handle_for_path("meshes/missing.mesh");
    assets.request_mesh(handle, || None);

    assert_eq!(wait_for_mesh(&mut assets, handle), MeshPoll::Failed);
    assert!(assets.take_mesh(handle).is_none());
    assert_eq!(assets.poll_mesh(handle), MeshPoll::Failed);
}

#[test]
fn test_integration_cull_and_sort() {
    let camera = look_at_camera(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
    let unit = BoundingSphere::new(Vec3::ZERO, 1.0);

    let command = |material: u32, center: Vec3, visible: bool| MeshDrawCommand {
        mesh_id: MeshId::new(0),
        model: Mat4::from_translation(center),
        visible,
        entity_id: 1,
        bounds: BoundingSphere::new(center, unit.radius),
        material_id: MaterialId::new(material),
    };

    let mut commands = vec![
        command(2, Vec3::ZERO, true),
        command(0, Vec3::new(0.0, 0.0, 500.0), true), // far behind the camera
        command(1, Vec3::new(1.0, 0.0, 0.0), true),
        command(0, Vec3::ZERO, false), // hidden
        command(0, Vec3::new(-1.0, 0.0, 0.0), true),
    ];
    sort_by_material(&mut commands);

    let materials: Vec<u32> = commands.iter().map(|c| c.material_id.raw()).collect();
    let mut sorted = materials.clone();
    sorted.sort();
    assert_eq!(materials, sorted);

    let visible = cull_draw_commands(&commands, &camera.frustum());
    assert_eq!(visible.len(), 3);
    assert!(visible.iter().all(|c| c.visible));
    assert!(visible
        .iter()
        .all(|c| c.bounds.center.z.abs() < 100.0));
}

/// The CPU half of `update()`: walk builtin models, build a command per
/// visible-or-not entity, sort by material.
fn build_commands(scene: &Scene, bounds: BoundingSphere) -> Vec<MeshDrawCommand> {
    let mut commands = Vec::new();
    for (_, entity, model) in scene.models() {
        let ModelSource::Builtin(mesh_id) = model.source else {
            continue;
        };
        let world = entity.transform.matrix();
        commands.push(MeshDrawCommand {
            mesh_id,
            model: world,
            visible: entity.visible,
            entity_id: entity.pick_id(),
            bounds: bounds.transformed(&world),
            material_id: model.material,
        });
    }
    sort_by_material(&mut commands);
    commands
}

#[test]
fn test_integration_rebuild_is_idempotent() {
    let mut scene = Scene::new();
    for i in 0..4 {
        scene.spawn(
            EntityDesc::new(format!("box-{}", i))
                .with_transform(Transform::from_position(Vec3::new(i as f32, 0.0, 0.0)))
                .with_model(ModelSource::Builtin(MeshId::new(i)), MaterialId::new(3 - i)),
        );
    }

    let bounds = BoundingSphere::new(Vec3::ZERO, 1.0);
    let first = build_commands(&scene, bounds);
    let second = build_commands(&scene, bounds);

    assert_eq!(first.len(), 4);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.entity_id, b.entity_id);
        assert_eq!(a.mesh_id, b.mesh_id);
        assert_eq!(a.material_id, b.material_id);
        assert_eq!(a.model, b.model);
    }
}

#[test]
fn test_integration_scene_lights_to_gpu_array() {
    let mut scene = Scene::new();
    scene.spawn(
        EntityDesc::new("sun").with_light(Light::directional(Vec3::ONE, 2.0)),
    );
    scene.spawn(
        EntityDesc::new("lamp")
            .with_transform(Transform::from_position(Vec3::new(0.0, 3.0, 0.0)))
            .with_light(Light::point(Vec3::new(1.0, 0.8, 0.6), 10.0, 8.0)),
    );

    let mut lights = LightCache::new();
    for (_, entity, light) in scene.lights() {
        lights.add(light.to_gpu(&entity.transform.matrix()));
    }

    assert_eq!(lights.count(), 2);
    let sun = lights.sun().expect("directional light becomes the sun");
    let sun_data = lights.get(sun).unwrap();
    assert_eq!(sun_data.intensity, 2.0);

    // One contiguous upload block, 64 bytes per light.
    assert_eq!(lights.as_bytes().len(), 2 * 64);
}
