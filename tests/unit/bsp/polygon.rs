use super::*;
use crate::foundation::core::Rect;
use crate::model::quad::SharedQuadState;

fn square(z: f64) -> DrawPolygon {
    DrawPolygon::from_points(
        [
            Point3::new(0.0, 0.0, z),
            Point3::new(10.0, 0.0, z),
            Point3::new(10.0, 10.0, z),
            Point3::new(0.0, 10.0, z),
        ],
        0,
        1,
    )
    .unwrap()
}

fn wall_at_x(x: f64, quad_index: usize) -> DrawPolygon {
    DrawPolygon::from_points(
        [
            Point3::new(x, -20.0, -20.0),
            Point3::new(x, -20.0, 20.0),
            Point3::new(x, 20.0, 20.0),
            Point3::new(x, 20.0, -20.0),
        ],
        quad_index,
        1,
    )
    .unwrap()
}

#[test]
fn identity_quad_faces_viewer() {
    let quad = DrawQuad::solid_color(
        Rect::new(0.0, 0.0, 4.0, 3.0),
        crate::foundation::core::Rgba8Premul::transparent(),
        SharedQuadState::default().in_sorting_context(3),
    );
    let poly = DrawPolygon::from_quad(&quad, 7).unwrap();
    assert_eq!(poly.points().len(), 4);
    assert_eq!(poly.quad_index(), 7);
    assert_eq!(poly.sorting_context_id(), 3);
    assert!(!poly.is_split());
    assert!(poly.faces_viewer());
    assert!((poly.normal().z - 1.0).abs() < 1e-12);
}

#[test]
fn zero_area_quad_is_dropped() {
    let quad = DrawQuad::solid_color(
        Rect::new(5.0, 0.0, 5.0, 3.0),
        crate::foundation::core::Rgba8Premul::transparent(),
        SharedQuadState::default(),
    );
    assert!(DrawPolygon::from_quad(&quad, 0).is_none());
}

#[test]
fn too_few_or_collinear_points_are_degenerate() {
    assert!(DrawPolygon::from_points([Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)], 0, 0).is_none());
    assert!(
        DrawPolygon::from_points(
            [
                Point3::ORIGIN,
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(2.0, 2.0, 2.0),
            ],
            0,
            0,
        )
        .is_none()
    );
}

#[test]
fn corners_behind_the_eye_are_clipped() {
    let corners = [
        [0.0, 0.0, 0.0, 1.0],
        [10.0, 0.0, 0.0, 1.0],
        [10.0, 10.0, 0.0, -1.0],
        [0.0, 10.0, 0.0, -1.0],
    ];
    let points = clip_to_positive_w(&corners);
    assert_eq!(points.len(), 4);
    assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
}

#[test]
fn parallel_planes_classify_by_distance() {
    let back = square(0.0);
    assert!(matches!(back.classify(&square(10.0)), PlaneSide::Front));
    assert!(matches!(back.classify(&square(-10.0)), PlaneSide::Back));
    assert!(matches!(back.classify(&square(0.01)), PlaneSide::Coplanar));
}

#[test]
fn straddling_polygon_splits_in_two() {
    let plane = wall_at_x(5.0, 0);
    let crossing = square(0.0);
    let PlaneSide::Straddling { front, back } = plane.classify(&crossing) else {
        panic!("expected a split");
    };
    let front = front.unwrap();
    let back = back.unwrap();
    assert!(front.is_split() && back.is_split());
    assert_eq!(front.normal(), crossing.normal());
    assert_eq!(back.quad_index(), crossing.quad_index());
    assert!(front.points().iter().all(|p| plane.signed_distance(*p) >= -PLANE_EPSILON));
    assert!(back.points().iter().all(|p| plane.signed_distance(*p) <= PLANE_EPSILON));
}

#[test]
fn fans_into_quads_in_local_space() {
    let poly = square(0.0);
    let quads = poly.to_quads_2d(&Transform3d::IDENTITY).unwrap();
    assert_eq!(
        quads,
        vec![[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]]
    );

    let triangle = DrawPolygon::from_points(
        [
            Point3::ORIGIN,
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ],
        0,
        0,
    )
    .unwrap();
    let quads = triangle.to_quads_2d(&Transform3d::IDENTITY).unwrap();
    assert_eq!(quads.len(), 1);
    assert_eq!(quads[0][2], quads[0][3]);

    let pentagon = DrawPolygon::from_points(
        [
            Point3::ORIGIN,
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(5.0, 3.0, 0.0),
            Point3::new(2.0, 5.0, 0.0),
            Point3::new(-1.0, 3.0, 0.0),
        ],
        0,
        0,
    )
    .unwrap();
    assert_eq!(pentagon.to_quads_2d(&Transform3d::IDENTITY).unwrap().len(), 2);
}

#[test]
fn fragments_map_back_through_inverse() {
    let transform = Transform3d::from_translation(100.0, 50.0, 0.0);
    let quad = DrawQuad::solid_color(
        Rect::new(0.0, 0.0, 10.0, 10.0),
        crate::foundation::core::Rgba8Premul::transparent(),
        SharedQuadState::with_transform(transform),
    );
    let poly = DrawPolygon::from_quad(&quad, 0).unwrap();
    assert_eq!(poly.points()[0], Point3::new(100.0, 50.0, 0.0));
    let quads = poly.to_quads_2d(&transform.inverse().unwrap()).unwrap();
    let p = quads[0][2];
    assert!((p.x - 10.0).abs() < 1e-9 && (p.y - 10.0).abs() < 1e-9);
}
