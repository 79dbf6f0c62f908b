use super::*;
use crate::foundation::core::{Rect, Rgba8Premul};
use crate::model::quad::{DrawQuad, SharedQuadState};
use crate::transform::matrix::Transform3d;

fn polygon(rect: Rect, transform: Transform3d, quad_index: usize) -> DrawPolygon {
    let quad = DrawQuad::solid_color(
        rect,
        Rgba8Premul::transparent(),
        SharedQuadState::with_transform(transform).in_sorting_context(1),
    );
    DrawPolygon::from_quad(&quad, quad_index).unwrap()
}

fn order_of(list: Vec<DrawPolygon>) -> Vec<usize> {
    let mut deque: VecDeque<DrawPolygon> = list.into();
    let tree = BspTree::new(&mut deque);
    assert!(deque.is_empty());
    tree.into_draw_order()
        .iter()
        .map(DrawPolygon::quad_index)
        .collect()
}

#[test]
fn empty_list_builds_empty_tree() {
    let mut deque = VecDeque::new();
    let tree = BspTree::new(&mut deque);
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 0);
    assert!(tree.into_draw_order().is_empty());
}

#[test]
fn parallel_planes_draw_far_before_near() {
    let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
    let near = || polygon(rect, Transform3d::from_translation(0.0, 0.0, 10.0), 0);
    let far = || polygon(rect, Transform3d::IDENTITY, 1);

    assert_eq!(order_of(vec![near(), far()]), vec![1, 0]);
    assert_eq!(order_of(vec![far(), near()]), vec![1, 0]);
}

#[test]
fn crossing_quads_split_into_fragments() {
    let vertical = polygon(
        Rect::new(0.0, -5.0, 10.0, 5.0),
        Transform3d::from_rotation_y(-core::f64::consts::FRAC_PI_2),
        0,
    );
    let horizontal = polygon(
        Rect::new(-5.0, -5.0, 5.0, 5.0),
        Transform3d::from_translation(0.0, 0.0, 5.0),
        1,
    );
    let mut deque: VecDeque<DrawPolygon> = vec![vertical, horizontal].into();
    let tree = BspTree::new(&mut deque);
    assert!(deque.is_empty());

    let mut fragments = Vec::new();
    tree.traverse(|p| fragments.push((p.quad_index(), p.is_split())));
    assert!(fragments.len() >= 3);
    assert_eq!(fragments.iter().filter(|(q, _)| *q == 1).count(), 2);
    assert!(
        fragments
            .iter()
            .filter(|(q, _)| *q == 1)
            .all(|(_, split)| *split)
    );
}

#[test]
fn coplanar_polygons_keep_input_order() {
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    let list = vec![
        polygon(rect, Transform3d::IDENTITY, 0),
        polygon(rect, Transform3d::from_translation(2.0, 0.0, 0.0), 1),
        polygon(rect, Transform3d::from_translation(4.0, 0.0, 0.0), 2),
    ];
    assert_eq!(order_of(list), vec![0, 1, 2]);
}

#[test]
fn no_fragment_is_drawn_before_one_it_occludes() {
    // Two quads tilted in opposite directions, crossing along the y axis.
    let rect = Rect::new(-10.0, -10.0, 10.0, 10.0);
    let angle = core::f64::consts::FRAC_PI_6;
    let list = vec![
        polygon(rect, Transform3d::from_rotation_y(angle), 0),
        polygon(rect, Transform3d::from_rotation_y(-angle), 1),
    ];
    let mut deque: VecDeque<DrawPolygon> = list.into();
    let drawn = BspTree::new(&mut deque).into_draw_order();
    assert_eq!(drawn.len(), 3);

    for (i, earlier) in drawn.iter().enumerate() {
        // Orient the earlier fragment's plane so positive distance is towards the viewer.
        let sign = if earlier.faces_viewer() { 1.0 } else { -1.0 };
        for later in &drawn[i + 1..] {
            let distances: Vec<f64> = later
                .points()
                .iter()
                .map(|p| sign * earlier.signed_distance(*p))
                .collect();
            let coplanar = distances
                .iter()
                .all(|d| d.abs() <= crate::bsp::polygon::PLANE_EPSILON);
            let behind = distances
                .iter()
                .all(|d| *d <= crate::bsp::polygon::PLANE_EPSILON);
            assert!(coplanar || !behind, "fragment drawn after something in front of it");
        }
    }
}
