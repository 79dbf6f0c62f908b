use super::*;

#[test]
fn covering_rounds_fractional_extents_up() {
    assert_eq!(
        PixelSize::covering(Size::new(10.2, 3.0)),
        PixelSize::new(11, 3)
    );
    assert_eq!(PixelSize::covering(Size::new(-4.0, f64::NAN)), PixelSize::new(0, 0));
}

#[test]
fn contains_and_enlarge() {
    let base = PixelSize::new(100, 50);
    assert!(base.contains(PixelSize::new(100, 50)));
    assert!(!base.contains(PixelSize::new(101, 10)));
    assert_eq!(base.enlarged(PixelSize::new(8, 4)), PixelSize::new(108, 54));
    assert_eq!(base.to_rect(), Rect::new(0.0, 0.0, 100.0, 50.0));
}

#[test]
fn premultiply_halves_channels_at_half_alpha() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.a, 128);
    assert_eq!(c.r, 128);
    assert_eq!(c.g, 64);
    assert!(!c.is_opaque());
    assert!(Rgba8Premul::from_straight_rgba(1, 2, 3, 255).is_opaque());
}
