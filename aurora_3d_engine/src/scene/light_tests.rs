use super::*;
use bytemuck::Zeroable;
use glam::{Mat4, Quat, Vec3};

#[test]
fn test_to_gpu_point_light_position() {
    let light = Light::point(Vec3::ONE, 10.0, 25.0);
    let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let gpu = light.to_gpu(&world);

    assert_eq!(gpu.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(gpu.kind, LIGHT_KIND_POINT);
    assert_eq!(gpu.range, 25.0);
    assert_eq!(gpu.intensity, 10.0);
}

#[test]
fn test_to_gpu_directional_direction() {
    let light = Light::directional(Vec3::ONE, 2.0);
    // Rotated 90° around Y: local -Z points toward -X
    let world = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
    let gpu = light.to_gpu(&world);

    assert_eq!(gpu.kind, LIGHT_KIND_DIRECTIONAL);
    assert!(gpu.direction.distance(Vec3::NEG_X) < 1e-5);
}

#[test]
fn test_to_gpu_spot_cone_cosines() {
    let inner = 0.3;
    let outer = 0.5;
    let light = Light::spot(Vec3::ONE, 5.0, 10.0, inner, outer);
    let gpu = light.to_gpu(&Mat4::IDENTITY);

    assert_eq!(gpu.kind, LIGHT_KIND_SPOT);
    assert!((gpu.inner_cone_cos - inner.cos()).abs() < 1e-6);
    assert!((gpu.outer_cone_cos - outer.cos()).abs() < 1e-6);
}

// ============================================================================
// LightCache
// ============================================================================

#[test]
fn test_add_assigns_array_indices() {
    let mut cache = LightCache::new();
    let a = cache.add(Light::point(Vec3::ONE, 1.0, 5.0).to_gpu(&Mat4::IDENTITY));
    let b = cache.add(Light::point(Vec3::ONE, 1.0, 5.0).to_gpu(&Mat4::IDENTITY));
    assert_eq!(a, LightId::new(0));
    assert_eq!(b, LightId::new(1));
    assert_eq!(cache.count(), 2);
}

#[test]
fn test_first_directional_becomes_sun() {
    let mut cache = LightCache::new();
    cache.add(Light::point(Vec3::ONE, 1.0, 5.0).to_gpu(&Mat4::IDENTITY));
    let sun = cache.add(Light::directional(Vec3::ONE, 1.0).to_gpu(&Mat4::IDENTITY));
    // A second directional does not displace the first
    cache.add(Light::directional(Vec3::ONE, 0.5).to_gpu(&Mat4::IDENTITY));

    assert_eq!(cache.sun(), Some(sun));
    assert_eq!(sun, LightId::new(1));
}

#[test]
fn test_clear_resets_sun_and_entries() {
    let mut cache = LightCache::new();
    cache.add(Light::directional(Vec3::ONE, 1.0).to_gpu(&Mat4::IDENTITY));
    cache.clear();
    assert_eq!(cache.count(), 0);
    assert_eq!(cache.sun(), None);
}

#[test]
fn test_set_updates_in_place() {
    let mut cache = LightCache::new();
    let id = cache.add(Light::point(Vec3::ONE, 1.0, 5.0).to_gpu(&Mat4::IDENTITY));

    let brighter = Light::point(Vec3::ONE, 99.0, 5.0).to_gpu(&Mat4::IDENTITY);
    cache.set(id, brighter);

    assert_eq!(cache.get(id).unwrap().intensity, 99.0);
    assert_eq!(cache.count(), 1);
}

#[test]
fn test_set_null_id_is_noop() {
    let mut cache = LightCache::new();
    cache.add(Light::point(Vec3::ONE, 1.0, 5.0).to_gpu(&Mat4::IDENTITY));
    cache.set(LightId::NULL, GpuLightData::zeroed());
    assert_eq!(cache.get(LightId::new(0)).unwrap().intensity, 1.0);
}

#[test]
fn test_overflow_returns_null() {
    let mut cache = LightCache::new();
    let data = Light::point(Vec3::ONE, 1.0, 5.0).to_gpu(&Mat4::IDENTITY);
    for _ in 0..MAX_LIGHTS {
        assert!(!cache.add(data).is_null());
    }
    assert!(cache.add(data).is_null());
    assert_eq!(cache.count(), MAX_LIGHTS as u32);
}

#[test]
fn test_as_bytes_length() {
    let mut cache = LightCache::new();
    cache.add(Light::point(Vec3::ONE, 1.0, 5.0).to_gpu(&Mat4::IDENTITY));
    cache.add(Light::directional(Vec3::ONE, 1.0).to_gpu(&Mat4::IDENTITY));
    assert_eq!(
        cache.as_bytes().len(),
        2 * std::mem::size_of::<GpuLightData>()
    );
}
