use super::checkerboard_pixels;

#[test]
fn test_checkerboard_dimensions() {
    let pixels = checkerboard_pixels();
    assert_eq!(pixels.len(), 16 * 16 * 4);
}

#[test]
fn test_checkerboard_alternates() {
    let pixels = checkerboard_pixels();
    let at = |x: usize, y: usize| &pixels[(y * 16 + x) * 4..(y * 16 + x) * 4 + 4];
    // Top-left square is magenta, its right neighbor square black
    assert_eq!(at(0, 0), &[255, 0, 255, 255]);
    assert_eq!(at(8, 0), &[0, 0, 0, 255]);
    assert_eq!(at(0, 8), &[0, 0, 0, 255]);
    assert_eq!(at(8, 8), &[255, 0, 255, 255]);
    // Everything is fully opaque
    assert!(pixels.chunks(4).all(|p| p[3] == 255));
}
