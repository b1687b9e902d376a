use super::ForwardPushConstants;
use std::mem::{offset_of, size_of};

#[test]
fn test_push_constants_fit_the_guaranteed_budget() {
    assert!(size_of::<ForwardPushConstants>() <= 128);
}

#[test]
fn test_push_constants_layout() {
    assert_eq!(size_of::<ForwardPushConstants>(), 96);
    assert_eq!(offset_of!(ForwardPushConstants, model), 0);
    assert_eq!(offset_of!(ForwardPushConstants, scene_buffer), 64);
    assert_eq!(offset_of!(ForwardPushConstants, vertex_buffer), 72);
    assert_eq!(offset_of!(ForwardPushConstants, material_id), 80);
    assert_eq!(offset_of!(ForwardPushConstants, entity_id), 84);
}
