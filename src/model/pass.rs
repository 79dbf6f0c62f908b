use crate::foundation::core::{Rect, RenderPassId};
use crate::model::filters::FilterOperations;
use crate::model::quad::DrawQuad;
use crate::transform::matrix::Transform3d;

/// Result encoding a copy request asks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyResultFormat {
    /// CPU-readable RGBA bitmap.
    #[default]
    Rgba,
    /// GPU texture handed to the requester.
    Texture,
}

/// Request to read back the drawn content of a pass.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CopyOutputRequest {
    /// Optional sub-area in pass draw space; `None` copies the whole output rect.
    pub area: Option<Rect>,
    /// Requested result encoding.
    pub result_format: CopyResultFormat,
    /// Free-form tag identifying the requester.
    pub source: Option<String>,
}

/// An ordered list of quads composited into one destination.
///
/// Quads are stored front-to-back: index 0 draws on top.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderPass {
    /// Stable id, unique within a frame.
    pub id: RenderPassId,
    /// Origin and size of the pass in its own draw space.
    pub output_rect: Rect,
    /// Region changed since the previous frame.
    pub damage_rect: Rect,
    /// Maps the pass into the root pass's space.
    #[serde(default)]
    pub transform_to_root_target: Transform3d,
    /// Filters applied when this pass is drawn into its parent.
    #[serde(default)]
    pub filters: FilterOperations,
    /// Filters applied to the content behind this pass.
    #[serde(default)]
    pub background_filters: FilterOperations,
    /// Whether the pass starts transparent rather than opaque.
    #[serde(default)]
    pub has_transparent_background: bool,
    /// Whether the backing texture needs mipmaps.
    #[serde(default)]
    pub generate_mipmap: bool,
    /// Readbacks to run after the pass is drawn.
    #[serde(default)]
    pub copy_requests: Vec<CopyOutputRequest>,
    /// Quads, front-to-back.
    #[serde(default)]
    pub quads: Vec<DrawQuad>,
}

/// Passes of one frame in draw order; the last one is the root.
pub type RenderPassList = Vec<RenderPass>;

impl RenderPass {
    /// Empty pass whose damage covers the whole output rect.
    pub fn new(id: RenderPassId, output_rect: Rect) -> Self {
        Self {
            id,
            output_rect,
            damage_rect: output_rect,
            transform_to_root_target: Transform3d::IDENTITY,
            filters: FilterOperations::default(),
            background_filters: FilterOperations::default(),
            has_transparent_background: false,
            generate_mipmap: false,
            copy_requests: Vec::new(),
            quads: Vec::new(),
        }
    }

    /// Replace the damage rect.
    pub fn with_damage(mut self, damage_rect: Rect) -> Self {
        self.damage_rect = damage_rect;
        self
    }

    /// Append a quad behind every quad already present.
    pub fn push_quad(&mut self, quad: DrawQuad) -> &mut Self {
        self.quads.push(quad);
        self
    }

    /// Builder form of [`Self::push_quad`].
    pub fn with_quad(mut self, quad: DrawQuad) -> Self {
        self.quads.push(quad);
        self
    }
}
