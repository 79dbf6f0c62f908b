use crate::foundation::core::{
    PixelSize, Point, Rect, RenderPassId, ResourceId, Rgba8Premul, Vec2,
};
use crate::transform::matrix::Transform3d;

/// A quadrilateral outline in quad-local space, used for split polygon fragments.
pub type QuadF = [Point; 4];

/// Blend mode for compositing a quad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Standard source-over alpha compositing.
    #[default]
    SourceOver,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
}

/// State shared by every quad produced from the same layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SharedQuadState {
    /// Maps quad-local space into the space of the pass the quad draws into.
    pub quad_to_target_transform: Transform3d,
    /// Clip in target (draw) space; only honored when `is_clipped`.
    pub clip_rect: Rect,
    /// Whether `clip_rect` applies.
    pub is_clipped: bool,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f32,
    /// Blend mode used against the destination.
    pub blend_mode: BlendMode,
    /// `0` for flat content; quads sharing a non-zero id form one 3-D scene.
    pub sorting_context_id: u32,
}

impl Default for SharedQuadState {
    fn default() -> Self {
        Self {
            quad_to_target_transform: Transform3d::IDENTITY,
            clip_rect: Rect::ZERO,
            is_clipped: false,
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            sorting_context_id: 0,
        }
    }
}

impl SharedQuadState {
    /// State with the given transform and defaults elsewhere.
    pub fn with_transform(transform: Transform3d) -> Self {
        Self {
            quad_to_target_transform: transform,
            ..Self::default()
        }
    }

    /// Clip to `rect` (target space).
    pub fn clipped_to(mut self, rect: Rect) -> Self {
        self.clip_rect = rect;
        self.is_clipped = true;
        self
    }

    /// Place the quad into a 3-D sorting context.
    pub fn in_sorting_context(mut self, id: u32) -> Self {
        self.sorting_context_id = id;
        self
    }
}

/// What a quad draws.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Material {
    /// A flat color.
    SolidColor {
        /// Premultiplied color.
        color: Rgba8Premul,
    },
    /// A rasterized content tile.
    Tile {
        /// Backing resource.
        resource: ResourceId,
        /// Texel rect sampled from the resource.
        tex_coord_rect: Rect,
        /// Size of the backing resource.
        texture_size: PixelSize,
        /// Sample with nearest-neighbour filtering.
        #[serde(default)]
        nearest_neighbor: bool,
    },
    /// An externally produced texture (video frame, canvas, ...).
    Texture {
        /// Backing resource.
        resource: ResourceId,
        /// Normalized UV rect.
        uv_rect: Rect,
        /// Whether the resource holds premultiplied alpha.
        #[serde(default)]
        premultiplied_alpha: bool,
        /// Whether the quad may be promoted to a hardware overlay plane.
        #[serde(default)]
        overlay_candidate: bool,
    },
    /// The output of another render pass of the same frame.
    RenderPass {
        /// Source pass.
        pass_id: RenderPassId,
        /// Optional mask resource.
        #[serde(default)]
        mask: Option<ResourceId>,
        /// Scale applied to filter parameters.
        #[serde(default = "unit_scale")]
        filters_scale: Vec2,
    },
    /// A debugging outline.
    DebugBorder {
        /// Border color.
        color: Rgba8Premul,
        /// Border width in pixels.
        width: f32,
    },
}

impl Material {
    /// Short snake_case name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SolidColor { .. } => "solid_color",
            Self::Tile { .. } => "tile",
            Self::Texture { .. } => "texture",
            Self::RenderPass { .. } => "render_pass",
            Self::DebugBorder { .. } => "debug_border",
        }
    }
}

fn unit_scale() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

/// A single draw primitive.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawQuad {
    /// Quad bounds in quad-local space.
    pub rect: Rect,
    /// Sub-rect of `rect` that is actually visible.
    pub visible_rect: Rect,
    /// Whether the quad must be blended with the destination.
    #[serde(default)]
    pub needs_blending: bool,
    /// Transform, clip and sorting state.
    #[serde(default)]
    pub shared: SharedQuadState,
    /// What to draw.
    pub material: Material,
}

impl DrawQuad {
    /// Fully visible quad with the given state and material.
    pub fn new(rect: Rect, shared: SharedQuadState, material: Material) -> Self {
        Self {
            rect,
            visible_rect: rect,
            needs_blending: false,
            shared,
            material,
        }
    }

    /// Solid color quad; blending is inferred from the color alpha.
    pub fn solid_color(rect: Rect, color: Rgba8Premul, shared: SharedQuadState) -> Self {
        let mut quad = Self::new(rect, shared, Material::SolidColor { color });
        quad.needs_blending = !color.is_opaque();
        quad
    }

    /// Quad drawing the output of render pass `pass_id`.
    pub fn render_pass(rect: Rect, pass_id: RenderPassId, shared: SharedQuadState) -> Self {
        let mut quad = Self::new(
            rect,
            shared,
            Material::RenderPass {
                pass_id,
                mask: None,
                filters_scale: unit_scale(),
            },
        );
        quad.needs_blending = true;
        quad
    }

    /// Opaque tile quad sampling all of `resource`.
    pub fn tile(rect: Rect, resource: ResourceId, size: PixelSize, shared: SharedQuadState) -> Self {
        Self::new(
            rect,
            shared,
            Material::Tile {
                resource,
                tex_coord_rect: size.to_rect(),
                texture_size: size,
                nearest_neighbor: false,
            },
        )
    }

    /// Texture quad; `overlay_candidate` marks it as promotable to a hardware plane.
    pub fn texture(
        rect: Rect,
        resource: ResourceId,
        overlay_candidate: bool,
        shared: SharedQuadState,
    ) -> Self {
        Self::new(
            rect,
            shared,
            Material::Texture {
                resource,
                uv_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
                premultiplied_alpha: true,
                overlay_candidate,
            },
        )
    }

    /// The 3-D sorting context this quad belongs to (`0` for flat content).
    pub fn sorting_context_id(&self) -> u32 {
        self.shared.sorting_context_id
    }

    /// Source pass id for [`Material::RenderPass`] quads.
    pub fn render_pass_id(&self) -> Option<RenderPassId> {
        match self.material {
            Material::RenderPass { pass_id, .. } => Some(pass_id),
            _ => None,
        }
    }

    /// Visible rect mapped into target space, when the transform has no perspective.
    pub fn visible_rect_in_target(&self) -> Option<Rect> {
        self.shared
            .quad_to_target_transform
            .map_rect_2d(self.visible_rect)
    }
}
