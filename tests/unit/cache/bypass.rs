use super::*;
use crate::foundation::core::{PixelSize, Rect, RenderPassId, ResourceId, Rgba8Premul};
use crate::model::filters::FilterOperation;
use crate::model::quad::SharedQuadState;
use crate::transform::matrix::Transform3d;

fn tile_pass(tile: Rect, shared: SharedQuadState) -> RenderPass {
    RenderPass::new(RenderPassId(2), Rect::new(0.0, 0.0, 100.0, 100.0)).with_quad(DrawQuad::tile(
        tile,
        ResourceId(1),
        PixelSize::new(100, 100),
        shared,
    ))
}

fn full_tile() -> RenderPass {
    tile_pass(Rect::new(0.0, 0.0, 100.0, 100.0), SharedQuadState::default())
}

#[test]
fn never_bypass_ignores_everything() {
    assert!(NeverBypass.bypass_quad(&full_tile()).is_none());
}

#[test]
fn full_coverage_opaque_tile_bypasses() {
    let pass = full_tile();
    let quad = SingleTileBypass::default().bypass_quad(&pass).unwrap();
    assert_eq!(quad, &pass.quads[0]);
}

#[test]
fn translated_tile_still_bypasses() {
    let pass = tile_pass(
        Rect::new(0.0, 0.0, 100.0, 100.0),
        SharedQuadState::with_transform(Transform3d::from_translation(0.0, 0.0, 0.0)),
    );
    assert!(SingleTileBypass::default().bypass_quad(&pass).is_some());

    let rotated = tile_pass(
        Rect::new(0.0, 0.0, 100.0, 100.0),
        SharedQuadState::with_transform(Transform3d::from_rotation_z(0.1)),
    );
    assert!(SingleTileBypass::default().bypass_quad(&rotated).is_none());
}

#[test]
fn transformed_pass_is_not_bypassed() {
    let mut pass = full_tile();
    pass.transform_to_root_target = Transform3d::from_translation(10.0, 0.0, 0.0);
    assert!(SingleTileBypass::default().bypass_quad(&pass).is_none());
}

#[test]
fn partial_coverage_respects_threshold() {
    let pass = tile_pass(Rect::new(0.0, 0.0, 100.0, 50.0), SharedQuadState::default());
    assert!(SingleTileBypass::default().bypass_quad(&pass).is_none());
    assert!(
        SingleTileBypass { min_coverage: 0.5 }
            .bypass_quad(&pass)
            .is_some()
    );
}

#[test]
fn filters_copies_and_extra_quads_prevent_bypass() {
    let policy = SingleTileBypass::default();

    let mut filtered = full_tile();
    filtered.filters = vec![FilterOperation::Blur { sigma: 2.0 }].into();
    assert!(policy.bypass_quad(&filtered).is_none());

    let mut copied = full_tile();
    copied.copy_requests.push(Default::default());
    assert!(policy.bypass_quad(&copied).is_none());

    let two = full_tile().with_quad(DrawQuad::solid_color(
        Rect::new(0.0, 0.0, 10.0, 10.0),
        Rgba8Premul::from_straight_rgba(255, 0, 0, 255),
        SharedQuadState::default(),
    ));
    assert!(policy.bypass_quad(&two).is_none());
}

#[test]
fn translucent_or_clipped_tiles_are_drawn_normally() {
    let policy = SingleTileBypass::default();

    let faded = SharedQuadState {
        opacity: 0.5,
        ..SharedQuadState::default()
    };
    let pass = tile_pass(Rect::new(0.0, 0.0, 100.0, 100.0), faded);
    assert!(policy.bypass_quad(&pass).is_none());

    let clipped = SharedQuadState::default().clipped_to(Rect::new(0.0, 0.0, 50.0, 50.0));
    let pass = tile_pass(Rect::new(0.0, 0.0, 100.0, 100.0), clipped);
    assert!(policy.bypass_quad(&pass).is_none());

    let loose_clip = SharedQuadState::default().clipped_to(Rect::new(-10.0, -10.0, 200.0, 200.0));
    let pass = tile_pass(Rect::new(0.0, 0.0, 100.0, 100.0), loose_clip);
    assert!(policy.bypass_quad(&pass).is_some());
}

#[test]
fn mode_builds_matching_policy() {
    let mode: BypassMode = serde_json::from_str(r#"{"mode":"single_tile"}"#).unwrap();
    assert_eq!(mode, BypassMode::SingleTile { min_coverage: 1.0 });
    assert!(mode.policy().bypass_quad(&full_tile()).is_some());
    assert!(BypassMode::default().policy().bypass_quad(&full_tile()).is_none());
}
