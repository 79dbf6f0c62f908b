//! Contracts for the collaborators the compositor drives.
//!
//! [`OutputSurface`] owns the presentation framebuffer; [`RenderBackend`] issues the actual
//! API-specific draw calls and backs offscreen textures through [`TextureAllocator`].

use crate::cache::texture::{TextureAllocator, TextureId};
use crate::foundation::core::{ColorSpace, PixelSize, Rect, TextureFormat};
use crate::foundation::error::CompositorResult;
use crate::model::filters::FilterOperations;
use crate::model::pass::CopyOutputRequest;
use crate::model::quad::{DrawQuad, QuadF};
use crate::transform::coords::quad_rect_transform;
use crate::transform::matrix::Transform3d;

/// Static properties of an output surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SurfaceCapabilities {
    /// Presenting a sub-rectangle of the surface is supported.
    pub supports_partial_swap: bool,
    /// Overlay planes can be committed without presenting new surface content.
    pub supports_commit_overlay_planes: bool,
    /// The framebuffer stores rows bottom-up.
    pub flipped_output_surface: bool,
    /// A stencil buffer can be attached on reshape.
    pub supports_stencil: bool,
}

/// Parameters the surface was last reshaped with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReshapeParams {
    /// Device viewport size.
    pub size: PixelSize,
    /// Device scale factor.
    pub scale_factor: f64,
    /// Output color space.
    pub color_space: ColorSpace,
    /// Whether the root pass has a transparent background.
    pub has_alpha: bool,
    /// Whether a stencil buffer is needed.
    pub needs_stencil: bool,
}

/// Notification sent to the surface when a frame completes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameCompletion {
    /// Region of the surface updated by this frame.
    pub damage_rect: Rect,
    /// The root pass was not drawn.
    pub root_skipped: bool,
    /// Number of overlay candidates handed to display hardware.
    pub overlay_count: usize,
}

/// The presentation target of the root pass.
pub trait OutputSurface {
    /// Capabilities; queried once by `initialize`.
    fn capabilities(&self) -> SurfaceCapabilities;

    /// Resize or reconfigure the backing framebuffer.
    fn reshape(&mut self, params: &ReshapeParams) -> CompositorResult<()>;

    /// Bind the surface framebuffer as the draw target, allocating it lazily.
    fn bind_framebuffer(&mut self) -> CompositorResult<()>;

    /// The surface itself is scanned out as an overlay plane.
    fn is_displayed_as_overlay_plane(&self) -> bool {
        false
    }

    /// Buffer format used when the surface is an overlay plane.
    fn overlay_buffer_format(&self) -> TextureFormat {
        TextureFormat::Rgba8
    }

    /// An externally driven stencil test is active on the framebuffer.
    fn has_external_stencil_test(&self) -> bool {
        false
    }

    /// Present or otherwise complete the frame.
    fn finish_frame(&mut self, completion: &FrameCompletion);
}

/// How a pass destination is prepared before its quads are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceInitMode {
    /// Clear only the scissor rect.
    ScissoredClear,
    /// Clear the whole destination.
    FullClear,
    /// Keep prior contents.
    Preserve,
}

/// Arguments of [`RenderBackend::prepare_surface_for_pass`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceInit {
    /// Initialization mode.
    pub mode: SurfaceInitMode,
    /// Pass scissor rect in window space.
    pub scissor_window_rect: Rect,
    /// Clear to transparent rather than opaque.
    pub transparent: bool,
}

/// One draw call.
#[derive(Clone, Copy, Debug)]
pub struct QuadDraw<'a> {
    /// The quad being drawn.
    pub quad: &'a DrawQuad,
    /// Outline in quad-local space for split BSP fragments; `None` draws the whole quad.
    pub outline: Option<&'a QuadF>,
    /// Projection of the bound pass.
    pub projection: &'a Transform3d,
    /// Window matrix of the bound pass.
    pub window: &'a Transform3d,
    /// Texture of the source pass, for render-pass quads.
    pub pass_texture: Option<TextureId>,
    /// Quad to draw instead of the source pass texture when that pass was bypassed.
    pub bypass_quad: Option<&'a DrawQuad>,
    /// Filters of the source pass, for render-pass quads.
    pub filters: Option<&'a FilterOperations>,
    /// Background filters of the source pass, for render-pass quads.
    pub background_filters: Option<&'a FilterOperations>,
}

impl QuadDraw<'_> {
    /// Clip-space transform of the unit quad: projection, quad transform and rect placement.
    pub fn draw_transform(&self) -> Transform3d {
        *self.projection
            * quad_rect_transform(self.quad.shared.quad_to_target_transform, self.quad.rect)
    }
}

/// A copy request ready to execute against the bound pass.
#[derive(Clone, Debug, PartialEq)]
pub struct CopyDispatch {
    /// Compositor-assigned id, unique per compositor.
    pub request_id: u64,
    /// The request itself.
    pub request: CopyOutputRequest,
    /// Region to read back, in window space.
    pub window_rect: Rect,
}

/// API-specific draw implementation.
pub trait RenderBackend: TextureAllocator {
    /// Called once at the start of every frame.
    fn begin_drawing_frame(&mut self) {}

    /// Bind an offscreen texture as the draw target.
    fn bind_framebuffer_to_texture(&mut self, texture: TextureId) -> CompositorResult<()>;

    /// Offscreen framebuffers store rows bottom-up.
    fn flipped_texture_framebuffer(&self) -> bool {
        false
    }

    /// Enable the scissor test with a window-space rect.
    fn set_scissor_test_rect(&mut self, window_rect: Rect);

    /// Disable the scissor test.
    fn ensure_scissor_test_disabled(&mut self);

    /// Initialize the bound destination.
    fn prepare_surface_for_pass(&mut self, init: &SurfaceInit);

    /// Draw one quad, or one fragment of it.
    fn draw_quad(&mut self, draw: &QuadDraw<'_>);

    /// Called after the last quad of a pass.
    fn finish_drawing_quad_list(&mut self) {}

    /// Read back the bound pass.
    fn copy_current_render_pass(&mut self, copy: CopyDispatch);

    /// Called once at the end of every frame.
    fn finish_drawing_frame(&mut self) {}
}
