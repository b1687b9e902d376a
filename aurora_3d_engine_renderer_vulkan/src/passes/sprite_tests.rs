use super::*;
use aurora_3d_engine::aurora3d::render::ImageId;
use glam::{Vec2, Vec3, Vec4};

fn sprite(image: u32, x: f32) -> SpriteInstance {
    SpriteInstance {
        position: Vec3::new(x, 0.0, 0.0),
        _pad0: 0.0,
        size: Vec2::ONE,
        _pad1: [0.0; 2],
        tint: Vec4::ONE,
        image: ImageId::new(image),
        _pad2: [0; 3],
    }
}

#[test]
fn instance_layout_is_stable() {
    assert_eq!(std::mem::size_of::<SpriteInstance>(), 64);
    assert_eq!(std::mem::offset_of!(SpriteInstance, position), 0);
    assert_eq!(std::mem::offset_of!(SpriteInstance, size), 16);
    assert_eq!(std::mem::offset_of!(SpriteInstance, tint), 32);
    assert_eq!(std::mem::offset_of!(SpriteInstance, image), 48);
}

#[test]
fn empty_input_produces_no_runs() {
    let mut instances: Vec<SpriteInstance> = Vec::new();
    assert!(batch_sprites(&mut instances).is_empty());
}

#[test]
fn single_image_is_one_run() {
    let mut instances = vec![sprite(3, 0.0), sprite(3, 1.0), sprite(3, 2.0)];
    let runs = batch_sprites(&mut instances);
    assert_eq!(
        runs,
        vec![SpriteRun {
            image: ImageId::new(3),
            first: 0,
            count: 3,
        }]
    );
}

#[test]
fn interleaved_images_are_grouped() {
    let mut instances = vec![
        sprite(2, 0.0),
        sprite(0, 1.0),
        sprite(2, 2.0),
        sprite(1, 3.0),
        sprite(0, 4.0),
    ];
    let runs = batch_sprites(&mut instances);

    assert_eq!(runs.len(), 3);
    assert_eq!(runs[0].image, ImageId::new(0));
    assert_eq!(runs[0].count, 2);
    assert_eq!(runs[1].image, ImageId::new(1));
    assert_eq!(runs[1].count, 1);
    assert_eq!(runs[2].image, ImageId::new(2));
    assert_eq!(runs[2].count, 2);

    // Runs tile the instance slice without gaps or overlap.
    let mut next = 0;
    for run in &runs {
        assert_eq!(run.first, next);
        next += run.count;
    }
    assert_eq!(next as usize, instances.len());

    // Every instance landed in its run's image group.
    for run in &runs {
        for instance in &instances[run.first as usize..(run.first + run.count) as usize] {
            assert_eq!(instance.image, run.image);
        }
    }
}

#[test]
fn sort_is_by_image_id() {
    let mut instances = vec![sprite(7, 0.0), sprite(1, 1.0), sprite(4, 2.0)];
    batch_sprites(&mut instances);
    let ids: Vec<u32> = instances.iter().map(|s| s.image.raw()).collect();
    assert_eq!(ids, vec![1, 4, 7]);
}
