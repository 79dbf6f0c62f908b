use super::*;

fn approx_eq(a: &Transform3d, b: &Transform3d) -> bool {
    a.cols
        .iter()
        .flatten()
        .zip(b.cols.iter().flatten())
        .all(|(x, y)| (x - y).abs() < 1e-9)
}

#[test]
fn default_is_identity() {
    assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    assert!(Transform3d::IDENTITY.is_identity());
}

#[test]
fn translation_composition() {
    let a = Transform3d::from_translation(1.0, 0.0, 0.0);
    let b = Transform3d::from_translation(0.0, 2.0, 0.0);
    assert_eq!((a * b).translation(), Vec3::new(1.0, 2.0, 0.0));
}

#[test]
fn pre_translate_applies_in_local_space() {
    let t = Transform3d::from_scale(2.0, 2.0, 1.0).pre_translate(5.0, 0.0, 0.0);
    let p = t.map_point(Point3::ORIGIN).unwrap();
    assert_eq!(p, Point3::new(10.0, 0.0, 0.0));
}

#[test]
fn inverse_round_trips() {
    let t = Transform3d::from_translation(10.0, -4.0, 3.0)
        * Transform3d::from_rotation_y(0.4)
        * Transform3d::from_rotation_x(-0.3)
        * Transform3d::from_scale(2.0, 3.0, 1.5);
    let inv = t.inverse().unwrap();
    assert!(approx_eq(&(t * inv), &Transform3d::IDENTITY));
    assert!(approx_eq(&(inv * t), &Transform3d::IDENTITY));
}

#[test]
fn inverse_of_perspective_maps_back() {
    let t = Transform3d::from_perspective(500.0) * Transform3d::from_rotation_y(0.5);
    let inv = t.inverse().unwrap();
    let p = Point3::new(30.0, 40.0, 0.0);
    let mapped = t.map_point(p).unwrap();
    let back = inv.map_point(mapped).unwrap();
    assert!((back.x - p.x).abs() < 1e-9);
    assert!((back.y - p.y).abs() < 1e-9);
    assert!(back.z.abs() < 1e-9);
}

#[test]
fn singular_matrix_has_no_inverse() {
    assert!(Transform3d::from_scale(1.0, 0.0, 1.0).inverse().is_none());
}

#[test]
fn classification_predicates() {
    assert!(Transform3d::from_translation(3.0, 4.0, 0.0).is_translation());
    assert!(!Transform3d::from_scale(2.0, 1.0, 1.0).is_translation());
    assert!(Transform3d::from_scale(2.0, 1.0, 1.0).is_scale_or_translation());
    assert!(!Transform3d::from_rotation_z(0.2).is_scale_or_translation());
    assert!(Transform3d::from_perspective(100.0).has_perspective());
    assert!(!Transform3d::from_perspective(-1.0).has_perspective());
}

#[test]
fn map_rect_2d_bounds_rotated_rect() {
    let t = Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_2);
    let r = t.map_rect_2d(Rect::new(0.0, 0.0, 10.0, 5.0)).unwrap();
    assert!((r.x0 + 5.0).abs() < 1e-9);
    assert!((r.x1 - 0.0).abs() < 1e-9);
    assert!((r.y0 - 0.0).abs() < 1e-9);
    assert!((r.y1 - 10.0).abs() < 1e-9);
    assert!(
        Transform3d::from_perspective(10.0)
            .map_rect_2d(Rect::new(0.0, 0.0, 1.0, 1.0))
            .is_none()
    );
}

#[test]
fn from_affine_matches_kurbo() {
    let affine = kurbo::Affine::translate((7.0, 9.0)) * kurbo::Affine::scale(2.0);
    let t = Transform3d::from_affine(affine);
    let p = Point::new(1.5, -2.0);
    assert_eq!(t.map_point_2d(p).unwrap(), affine * p);
}

#[test]
fn nan_is_not_finite() {
    let mut t = Transform3d::IDENTITY;
    t.cols[2][1] = f64::NAN;
    assert!(!t.is_finite());
}
