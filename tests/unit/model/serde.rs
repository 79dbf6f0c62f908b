use crate::foundation::core::{Rect, RenderPassId, ResourceId, Rgba8Premul};
use crate::model::filters::{FilterOperation, FilterOperations};
use crate::model::pass::RenderPass;
use crate::model::quad::{BlendMode, DrawQuad, Material, SharedQuadState};

#[test]
fn minimal_pass_json_fills_defaults() {
    let json = r#"{
        "id": 7,
        "output_rect": {"x0": 0.0, "y0": 0.0, "x1": 64.0, "y1": 32.0},
        "damage_rect": {"x0": 0.0, "y0": 0.0, "x1": 8.0, "y1": 8.0},
        "quads": [{
            "rect": {"x0": 0.0, "y0": 0.0, "x1": 64.0, "y1": 32.0},
            "visible_rect": {"x0": 0.0, "y0": 0.0, "x1": 64.0, "y1": 32.0},
            "material": {"kind": "solid_color", "color": {"r": 1, "g": 2, "b": 3, "a": 255}}
        }]
    }"#;
    let pass: RenderPass = serde_json::from_str(json).unwrap();
    assert_eq!(pass.id, RenderPassId(7));
    assert!(pass.filters.is_empty());
    assert!(pass.copy_requests.is_empty());
    let quad = &pass.quads[0];
    assert_eq!(quad.shared, SharedQuadState::default());
    assert_eq!(quad.shared.blend_mode, BlendMode::SourceOver);
    assert!(matches!(quad.material, Material::SolidColor { .. }));
}

#[test]
fn render_pass_quad_reports_source_pass() {
    let quad = DrawQuad::render_pass(
        Rect::new(0.0, 0.0, 10.0, 10.0),
        RenderPassId(3),
        SharedQuadState::default(),
    );
    assert_eq!(quad.render_pass_id(), Some(RenderPassId(3)));
    assert!(quad.needs_blending);

    let tile = DrawQuad::tile(
        Rect::new(0.0, 0.0, 10.0, 10.0),
        ResourceId(1),
        crate::foundation::core::PixelSize::new(10, 10),
        SharedQuadState::default(),
    );
    assert_eq!(tile.render_pass_id(), None);
}

#[test]
fn solid_color_blending_follows_alpha() {
    let rect = Rect::new(0.0, 0.0, 1.0, 1.0);
    let opaque = DrawQuad::solid_color(
        rect,
        Rgba8Premul::from_straight_rgba(9, 9, 9, 255),
        SharedQuadState::default(),
    );
    let translucent = DrawQuad::solid_color(
        rect,
        Rgba8Premul::from_straight_rgba(9, 9, 9, 10),
        SharedQuadState::default(),
    );
    assert!(!opaque.needs_blending);
    assert!(translucent.needs_blending);
}

#[test]
fn filter_operations_round_trip_through_json() {
    let ops = FilterOperations(vec![
        FilterOperation::Blur { sigma: 2.0 },
        FilterOperation::Reference {
            name: "night-mode".to_string(),
        },
    ]);
    let text = serde_json::to_string(&ops).unwrap();
    let back: FilterOperations = serde_json::from_str(&text).unwrap();
    assert_eq!(back, ops);
    assert!(back.has_filter_that_moves_pixels());
    assert_eq!(back.len(), 2);
}
