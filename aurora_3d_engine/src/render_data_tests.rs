use super::*;
use std::mem::{align_of, offset_of, size_of};

// ============================================================================
// Id semantics
// ============================================================================

#[test]
fn test_null_sentinel() {
    assert!(ImageId::NULL.is_null());
    assert!(MeshId::NULL.is_null());
    assert!(MaterialId::NULL.is_null());
    assert!(LightId::NULL.is_null());
    assert_eq!(ImageId::NULL.raw(), u32::MAX);
}

#[test]
fn test_id_default_is_null() {
    assert!(ImageId::default().is_null());
    assert!(MaterialId::default().is_null());
}

#[test]
fn test_id_roundtrip() {
    let id = MeshId::new(7);
    assert!(!id.is_null());
    assert_eq!(id.raw(), 7);
    assert_eq!(id.index(), 7);
}

#[test]
fn test_ids_are_pod_u32() {
    assert_eq!(size_of::<ImageId>(), 4);
    assert_eq!(size_of::<MeshId>(), 4);
    assert_eq!(size_of::<MaterialId>(), 4);
    assert_eq!(size_of::<LightId>(), 4);
    // Shader sees the raw integer
    let id = ImageId::new(0xAABBCCDD);
    let bytes = bytemuck::bytes_of(&id);
    assert_eq!(bytes, 0xAABBCCDDu32.to_ne_bytes());
}

// ============================================================================
// GpuSceneData layout — the shader-side struct must match these offsets
// ============================================================================

#[test]
fn test_scene_data_size_and_alignment() {
    assert_eq!(size_of::<GpuSceneData>(), 272);
    assert_eq!(align_of::<GpuSceneData>() % 16, 0);
    // std430: struct size must be a multiple of its base alignment
    assert_eq!(size_of::<GpuSceneData>() % 16, 0);
}

#[test]
fn test_scene_data_offsets() {
    assert_eq!(offset_of!(GpuSceneData, view), 0);
    assert_eq!(offset_of!(GpuSceneData, proj), 64);
    assert_eq!(offset_of!(GpuSceneData, view_proj), 128);
    assert_eq!(offset_of!(GpuSceneData, camera_pos), 192);
    assert_eq!(offset_of!(GpuSceneData, mouse_pos), 208);
    assert_eq!(offset_of!(GpuSceneData, ambient), 224);
    assert_eq!(offset_of!(GpuSceneData, light_buffer), 240);
    assert_eq!(offset_of!(GpuSceneData, light_count), 248);
    assert_eq!(offset_of!(GpuSceneData, material_buffer), 256);
}

// ============================================================================
// GpuLightData layout
// ============================================================================

#[test]
fn test_light_data_size() {
    assert_eq!(size_of::<GpuLightData>(), 64);
    assert_eq!(size_of::<GpuLightData>() % 16, 0);
}

#[test]
fn test_light_data_offsets() {
    assert_eq!(offset_of!(GpuLightData, position), 0);
    assert_eq!(offset_of!(GpuLightData, range), 12);
    assert_eq!(offset_of!(GpuLightData, direction), 16);
    assert_eq!(offset_of!(GpuLightData, intensity), 28);
    assert_eq!(offset_of!(GpuLightData, color), 32);
    assert_eq!(offset_of!(GpuLightData, kind), 44);
    assert_eq!(offset_of!(GpuLightData, inner_cone_cos), 48);
    assert_eq!(offset_of!(GpuLightData, outer_cone_cos), 52);
}

// ============================================================================
// MaterialData layout
// ============================================================================

#[test]
fn test_material_data_size() {
    assert_eq!(size_of::<MaterialData>(), 64);
    assert_eq!(size_of::<MaterialData>() % 16, 0);
}

#[test]
fn test_material_data_offsets() {
    assert_eq!(offset_of!(MaterialData, base_color_factor), 0);
    assert_eq!(offset_of!(MaterialData, emissive_factor), 16);
    assert_eq!(offset_of!(MaterialData, metallic_factor), 28);
    assert_eq!(offset_of!(MaterialData, roughness_factor), 32);
    assert_eq!(offset_of!(MaterialData, color_image), 36);
    assert_eq!(offset_of!(MaterialData, normal_image), 40);
    assert_eq!(offset_of!(MaterialData, metal_rough_image), 44);
    assert_eq!(offset_of!(MaterialData, emissive_image), 48);
}

#[test]
fn test_material_array_fits_nbuffer_sizing() {
    // The material cache allocates MAX_MATERIALS slots up front
    assert_eq!(MAX_MATERIALS * size_of::<MaterialData>(), 65536);
}

#[test]
fn test_pass_masks() {
    assert!(PassMask::SCENE_VIEW.contains(PassMask::GRID));
    assert!(PassMask::SCENE_VIEW.contains(PassMask::PICK));
    assert!(!PassMask::GAME_VIEW.contains(PassMask::GRID));
    assert!(!PassMask::GAME_VIEW.contains(PassMask::PICK));
    // Both viewports share the core sequence
    for mask in [PassMask::SCENE_VIEW, PassMask::GAME_VIEW] {
        assert!(mask.contains(PassMask::SKY));
        assert!(mask.contains(PassMask::FORWARD));
        assert!(mask.contains(PassMask::SPRITES));
        assert!(mask.contains(PassMask::POST_FX));
    }
}

#[test]
fn test_vertex_layout() {
    assert_eq!(size_of::<Vertex>(), 48);
    assert_eq!(offset_of!(Vertex, position), 0);
    assert_eq!(offset_of!(Vertex, uv_x), 12);
    assert_eq!(offset_of!(Vertex, normal), 16);
    assert_eq!(offset_of!(Vertex, uv_y), 28);
    assert_eq!(offset_of!(Vertex, color), 32);
}

#[test]
fn test_light_array_sizing() {
    assert_eq!(MAX_LIGHTS * size_of::<GpuLightData>(), 16384);
}
