use super::{pack_material, Material};
use crate::image_cache::DefaultImages;
use aurora_3d_engine::aurora3d::render::ImageId;
use glam::{Vec3, Vec4};

fn test_defaults() -> DefaultImages {
    DefaultImages {
        white: ImageId::new(0),
        black: ImageId::new(1),
        checkerboard: ImageId::new(2),
        flat_normal: ImageId::new(3),
    }
}

#[test]
fn test_pack_substitutes_defaults_for_null_slots() {
    let packed = pack_material(&Material::default(), &test_defaults());
    assert_eq!(packed.color_image, ImageId::new(0));
    assert_eq!(packed.normal_image, ImageId::new(3));
    assert_eq!(packed.metal_rough_image, ImageId::new(0));
    assert_eq!(packed.emissive_image, ImageId::new(1));
}

#[test]
fn test_pack_keeps_set_textures() {
    let material = Material {
        color_image: ImageId::new(42),
        emissive_image: ImageId::new(7),
        ..Material::default()
    };
    let packed = pack_material(&material, &test_defaults());
    assert_eq!(packed.color_image, ImageId::new(42));
    assert_eq!(packed.emissive_image, ImageId::new(7));
    // Unset slots still fall back
    assert_eq!(packed.normal_image, ImageId::new(3));
}

#[test]
fn test_pack_preserves_factors() {
    let material = Material {
        base_color_factor: Vec4::new(0.5, 0.25, 1.0, 1.0),
        metallic_factor: 0.8,
        roughness_factor: 0.3,
        emissive_factor: Vec3::new(1.0, 2.0, 3.0),
        ..Material::default()
    };
    let packed = pack_material(&material, &test_defaults());
    assert_eq!(packed.base_color_factor, material.base_color_factor);
    assert_eq!(packed.metallic_factor, 0.8);
    assert_eq!(packed.roughness_factor, 0.3);
    assert_eq!(packed.emissive_factor, material.emissive_factor);
}
