//! Strategies for drawing a pass's single quad directly instead of through an offscreen texture.

use crate::foundation::geom::{contains_rect, intersect_rects, is_empty_rect};
use crate::model::pass::RenderPass;
use crate::model::quad::{BlendMode, DrawQuad, Material};

/// Decides whether a non-root pass can be bypassed.
///
/// Returning a quad means the pass gets no texture this frame; parents draw the returned quad in
/// place of the pass output.
pub trait BypassPolicy: std::fmt::Debug {
    /// The quad to draw in place of `pass`, or `None` to render the pass normally.
    fn bypass_quad<'a>(&self, pass: &'a RenderPass) -> Option<&'a DrawQuad>;
}

/// Never bypasses; always safe.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverBypass;

impl BypassPolicy for NeverBypass {
    fn bypass_quad<'a>(&self, _pass: &'a RenderPass) -> Option<&'a DrawQuad> {
        None
    }
}

/// Bypasses passes made of one opaque, translated tile quad covering the output rect.
#[derive(Clone, Copy, Debug)]
pub struct SingleTileBypass {
    /// Minimum fraction of the output rect the tile must cover, in `(0, 1]`.
    pub min_coverage: f64,
}

impl Default for SingleTileBypass {
    fn default() -> Self {
        Self { min_coverage: 1.0 }
    }
}

impl BypassPolicy for SingleTileBypass {
    fn bypass_quad<'a>(&self, pass: &'a RenderPass) -> Option<&'a DrawQuad> {
        let [quad] = pass.quads.as_slice() else {
            return None;
        };
        if !matches!(quad.material, Material::Tile { .. }) || quad.needs_blending {
            return None;
        }
        if !pass.filters.is_empty()
            || !pass.background_filters.is_empty()
            || !pass.copy_requests.is_empty()
            || is_empty_rect(pass.output_rect)
            || !pass.transform_to_root_target.is_identity()
        {
            return None;
        }

        let shared = &quad.shared;
        if !shared.quad_to_target_transform.is_translation()
            || shared.opacity < 1.0
            || shared.blend_mode != BlendMode::SourceOver
        {
            return None;
        }
        if shared.is_clipped && !contains_rect(shared.clip_rect, pass.output_rect) {
            return None;
        }

        let target = quad.visible_rect_in_target()?;
        let covered = intersect_rects(target, pass.output_rect).area();
        let coverage = covered / pass.output_rect.area();
        (coverage + 1e-9 >= self.min_coverage).then_some(quad)
    }
}

/// Serializable selection of a built-in [`BypassPolicy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BypassMode {
    /// Use [`NeverBypass`].
    #[default]
    Never,
    /// Use [`SingleTileBypass`].
    SingleTile {
        /// See [`SingleTileBypass::min_coverage`].
        #[serde(default = "full_coverage")]
        min_coverage: f64,
    },
}

fn full_coverage() -> f64 {
    1.0
}

impl BypassMode {
    /// Instantiate the selected policy.
    pub fn policy(self) -> Box<dyn BypassPolicy> {
        match self {
            Self::Never => Box::new(NeverBypass),
            Self::SingleTile { min_coverage } => Box::new(SingleTileBypass { min_coverage }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/bypass.rs"]
mod tests;
