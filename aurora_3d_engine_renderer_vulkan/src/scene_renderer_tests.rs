use super::*;

#[test]
fn scene_mode_enables_editor_passes() {
    let mask = RenderMode::Scene.pass_mask();
    assert!(mask.contains(PassMask::GRID));
    assert!(mask.contains(PassMask::PICK));
    assert!(mask.contains(PassMask::SKY));
    assert!(mask.contains(PassMask::FORWARD));
    assert!(mask.contains(PassMask::SPRITES));
    assert!(mask.contains(PassMask::POST_FX));
}

#[test]
fn game_mode_has_no_editor_overlays() {
    let mask = RenderMode::Game.pass_mask();
    assert!(!mask.contains(PassMask::GRID));
    assert!(!mask.contains(PassMask::PICK));
    assert!(mask.contains(PassMask::SKY));
    assert!(mask.contains(PassMask::FORWARD));
    assert!(mask.contains(PassMask::SPRITES));
    assert!(mask.contains(PassMask::POST_FX));
}
