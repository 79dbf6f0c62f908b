//! Hardware overlay negotiation.

use crate::foundation::core::{Rect, ResourceId, TextureFormat};
use crate::foundation::geom::{intersect_rects, is_empty_rect, subtract_rect, union_non_empty};
use crate::model::pass::RenderPass;
use crate::model::quad::{BlendMode, DrawQuad, Material};
use crate::render::frame::FilterLookup;

/// Content proposed for (or assigned to) a display overlay plane.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayCandidate {
    /// Where the plane is shown, in root target space.
    pub display_rect: Rect,
    /// Buffer format.
    pub format: TextureFormat,
    /// Resource scanned out; `None` for the output surface itself.
    pub resource: Option<ResourceId>,
    /// The plane is backed by the output surface's framebuffer.
    pub use_output_surface_for_resource: bool,
    /// Display hardware accepted the plane.
    pub overlay_handled: bool,
    /// Stacking order relative to the primary plane (which is `0`).
    pub plane_z_order: i32,
}

impl OverlayCandidate {
    /// Candidate for the output surface itself, always handled.
    pub fn output_surface_plane(display_rect: Rect, format: TextureFormat) -> Self {
        Self {
            display_rect,
            format,
            resource: None,
            use_output_surface_for_resource: true,
            overlay_handled: true,
            plane_z_order: 0,
        }
    }
}

/// Negotiates which root-pass content display hardware can take over.
pub trait OverlayProcessor: std::fmt::Debug {
    /// Move quads from `root` onto overlay planes.
    ///
    /// May remove quads from `root`, append to `candidates` and change `damage_rect`.
    fn process_for_overlays(
        &mut self,
        root: &mut RenderPass,
        filters: &FilterLookup,
        candidates: &mut Vec<OverlayCandidate>,
        damage_rect: &mut Rect,
    );

    /// Damage caused by last frame's overlays; resets it.
    fn take_pending_overlay_damage(&mut self) -> Rect;

    /// Hand back damage taken by a frame that was aborted before it was presented.
    fn restore_pending_overlay_damage(&mut self, damage: Rect);
}

/// Never promotes anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOverlayProcessor;

impl OverlayProcessor for NullOverlayProcessor {
    fn process_for_overlays(
        &mut self,
        _root: &mut RenderPass,
        _filters: &FilterLookup,
        _candidates: &mut Vec<OverlayCandidate>,
        _damage_rect: &mut Rect,
    ) {
    }

    fn take_pending_overlay_damage(&mut self) -> Rect {
        Rect::ZERO
    }

    fn restore_pending_overlay_damage(&mut self, _damage: Rect) {}
}

/// Promotes the front-most unoccluded overlay-capable texture quad to a plane above the surface.
#[derive(Clone, Debug, Default)]
pub struct SingleOnTopOverlayProcessor {
    pending_damage: Rect,
    format: TextureFormat,
}

impl SingleOnTopOverlayProcessor {
    /// Processor producing planes in `format`.
    pub fn new(format: TextureFormat) -> Self {
        Self {
            pending_damage: Rect::ZERO,
            format,
        }
    }

    fn promotable_rect(quad: &DrawQuad) -> Option<(ResourceId, Rect)> {
        let Material::Texture {
            resource,
            overlay_candidate: true,
            ..
        } = quad.material
        else {
            return None;
        };
        let shared = &quad.shared;
        if !shared.quad_to_target_transform.is_scale_or_translation()
            || shared.opacity < 1.0
            || shared.blend_mode != BlendMode::SourceOver
        {
            return None;
        }
        let rect = quad.visible_rect_in_target()?;
        // A clip that cuts into the quad cannot be expressed by a plane.
        if shared.is_clipped && intersect_rects(rect, shared.clip_rect) != rect {
            return None;
        }
        (!is_empty_rect(rect)).then_some((resource, rect))
    }
}

impl OverlayProcessor for SingleOnTopOverlayProcessor {
    fn process_for_overlays(
        &mut self,
        root: &mut RenderPass,
        filters: &FilterLookup,
        candidates: &mut Vec<OverlayCandidate>,
        damage_rect: &mut Rect,
    ) {
        // Background filters read everything underneath, overlays included.
        if filters.background_filters(root.id).is_some() {
            return;
        }

        let mut above = Rect::ZERO;
        let mut found = None;
        for (index, quad) in root.quads.iter().enumerate() {
            let promotable = Self::promotable_rect(quad);
            if let Some((resource, rect)) = promotable
                && is_empty_rect(intersect_rects(above, rect))
            {
                found = Some((index, resource, rect));
                break;
            }
            // Unknown bounds occlude everything below.
            let bounds = quad.visible_rect_in_target().unwrap_or(root.output_rect);
            above = union_non_empty(above, bounds);
        }

        let Some((index, resource, rect)) = found else {
            return;
        };
        root.quads.remove(index);
        candidates.push(OverlayCandidate {
            display_rect: rect,
            format: self.format,
            resource: Some(resource),
            use_output_surface_for_resource: false,
            overlay_handled: true,
            plane_z_order: 1,
        });
        *damage_rect = subtract_rect(*damage_rect, rect);
        self.pending_damage = union_non_empty(self.pending_damage, rect);
        tracing::debug!(quad = index, ?rect, "quad promoted to overlay plane");
    }

    fn take_pending_overlay_damage(&mut self) -> Rect {
        std::mem::replace(&mut self.pending_damage, Rect::ZERO)
    }

    fn restore_pending_overlay_damage(&mut self, damage: Rect) {
        self.pending_damage = union_non_empty(self.pending_damage, damage);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
