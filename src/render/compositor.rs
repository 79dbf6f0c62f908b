use std::collections::{BTreeSet, VecDeque};

use crate::bsp::polygon::DrawPolygon;
use crate::bsp::tree::BspTree;
use crate::cache::bypass::BypassPolicy;
use crate::cache::pass_textures::RenderPassTextureCache;
use crate::foundation::core::{ColorSpace, PixelSize, Point, Rect, RenderPassId};
use crate::foundation::error::{CompositorError, CompositorResult};
use crate::foundation::geom::{contains_rect, intersect_rects, is_empty_rect, union_non_empty};
use crate::model::pass::{CopyOutputRequest, RenderPass};
use crate::model::quad::{DrawQuad, QuadF};
use crate::render::backend::{
    CopyDispatch, FrameCompletion, OutputSurface, QuadDraw, RenderBackend, ReshapeParams,
    SurfaceInit, SurfaceInitMode,
};
use crate::render::frame::{DrawingFrame, FilterLookup, FramePhase, FrameReport};
use crate::render::overlay::{NullOverlayProcessor, OverlayCandidate, OverlayProcessor};
use crate::render::settings::RendererSettings;
use crate::transform::coords::ViewportState;
use crate::transform::matrix::Transform3d;

/// Per-pass values shared by every quad draw of that pass.
struct PassDrawContext {
    scissor: Rect,
    use_scissor: bool,
    projection: Transform3d,
    window: Transform3d,
}

/// Drives one output surface through a sequence of frames.
///
/// Frames are drawn one at a time; `draw_frame` runs every stage to completion before returning.
pub struct FrameCompositor<S, B> {
    settings: RendererSettings,
    surface: S,
    backend: B,
    overlay: Box<dyn OverlayProcessor>,
    cache: RenderPassTextureCache,
    initialized: bool,
    use_partial_swap: bool,
    allow_empty_swap: bool,
    overdraw_feedback: bool,
    last_reshape: Option<ReshapeParams>,
    next_copy_request_id: u64,
}

impl<S: OutputSurface, B: RenderBackend> FrameCompositor<S, B> {
    /// Compositor over `surface` and `backend`; call [`Self::initialize`] before drawing.
    pub fn new(settings: RendererSettings, surface: S, backend: B) -> Self {
        let cache = RenderPassTextureCache::new(settings.bypass.policy())
            .with_enlargement(settings.enlarge_pass_texture_amount)
            .with_format(settings.pass_texture_format);
        Self {
            settings,
            surface,
            backend,
            overlay: Box::new(NullOverlayProcessor),
            cache,
            initialized: false,
            use_partial_swap: false,
            allow_empty_swap: false,
            overdraw_feedback: false,
            last_reshape: None,
            next_copy_request_id: 0,
        }
    }

    /// Use `processor` for overlay negotiation.
    pub fn with_overlay_processor(mut self, processor: Box<dyn OverlayProcessor>) -> Self {
        self.overlay = processor;
        self
    }

    /// Override the bypass strategy selected by the settings.
    pub fn with_bypass_policy(mut self, policy: Box<dyn BypassPolicy>) -> Self {
        self.cache.set_bypass_policy(policy);
        self
    }

    /// Query the surface and derive the swap policy. Must run once before the first frame.
    pub fn initialize(&mut self) -> CompositorResult<()> {
        if self.initialized {
            return Err(CompositorError::validation("compositor already initialized"));
        }
        let caps = self.surface.capabilities();
        self.use_partial_swap = self.settings.partial_swap_enabled && caps.supports_partial_swap;
        self.allow_empty_swap = self.use_partial_swap || caps.supports_commit_overlay_planes;
        self.overdraw_feedback = self.settings.show_overdraw_feedback && caps.supports_stencil;
        self.initialized = true;
        tracing::debug!(
            use_partial_swap = self.use_partial_swap,
            allow_empty_swap = self.allow_empty_swap,
            "compositor initialized"
        );
        Ok(())
    }

    /// Settings the compositor was built with.
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Whether only damaged regions are redrawn.
    pub fn use_partial_swap(&self) -> bool {
        self.use_partial_swap
    }

    /// Whether a frame may present without drawing the root pass.
    pub fn allow_empty_swap(&self) -> bool {
        self.allow_empty_swap
    }

    /// The output surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the output surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The draw backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the draw backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The pass texture cache.
    pub fn texture_cache(&self) -> &RenderPassTextureCache {
        &self.cache
    }

    /// `true` when pass `id` currently owns an allocated texture.
    pub fn has_render_pass_resource(&self, id: RenderPassId) -> bool {
        self.cache.has_resource(id)
    }

    /// Free every cached pass texture.
    pub fn release_all_resources(&mut self) {
        self.cache.release_all(&mut self.backend);
    }

    /// Take the collaborators back.
    pub fn into_parts(self) -> (S, B) {
        (self.surface, self.backend)
    }

    /// Draw one frame. The last pass of `passes` is the root.
    ///
    /// A non-root pass whose texture cannot be bound is dropped and the frame continues. Failing
    /// to reshape or bind the output surface aborts the frame without presenting it.
    #[tracing::instrument(level = "debug", skip_all, fields(passes = passes.len(), scale_factor = scale_factor))]
    pub fn draw_frame(
        &mut self,
        mut passes: Vec<RenderPass>,
        scale_factor: f64,
        color_space: ColorSpace,
        viewport_size: PixelSize,
    ) -> CompositorResult<FrameReport> {
        if !self.initialized {
            return Err(CompositorError::validation(
                "draw_frame called before initialize",
            ));
        }
        let Some(root) = passes.last() else {
            return Err(CompositorError::validation("render pass list is empty"));
        };
        let mut seen = BTreeSet::new();
        if let Some(dup) = passes.iter().find(|p| !seen.insert(p.id)) {
            return Err(CompositorError::validation(format!(
                "render pass id {} appears more than once",
                dup.id.0
            )));
        }

        let overlay_damage = self.overlay.take_pending_overlay_damage();
        let mut frame = DrawingFrame::new(root, viewport_size, color_space);
        frame.root_damage_rect = intersect_rects(
            union_non_empty(root.damage_rect, overlay_damage),
            viewport_size.to_rect(),
        );

        let result = self.run_frame(&mut passes, &mut frame, scale_factor);
        self.cache.clear_bypass();
        if let Err(err) = result {
            // Nothing was presented, so last frame's overlay area is still stale.
            self.overlay.restore_pending_overlay_damage(overlay_damage);
            return Err(err);
        }

        tracing::debug!(report = ?frame.report, "frame finished");
        Ok(frame.report)
    }

    fn run_frame(
        &mut self,
        passes: &mut [RenderPass],
        frame: &mut DrawingFrame,
        scale_factor: f64,
    ) -> CompositorResult<()> {
        let has_alpha = passes.last().is_some_and(|p| p.has_transparent_background);
        let reshape = ReshapeParams {
            size: frame.device_viewport_size,
            scale_factor,
            color_space: frame.color_space,
            has_alpha,
            needs_stencil: self.overdraw_feedback,
        };
        if self.last_reshape != Some(reshape) {
            tracing::debug!(?reshape, "reshaping output surface");
            self.surface.reshape(&reshape)?;
            self.last_reshape = Some(reshape);
        }

        let stats = self
            .cache
            .reconcile_for_frame(passes, frame.color_space, &mut self.backend);
        frame.report.passes_bypassed = stats.bypassed;
        frame.filters = FilterLookup::collect(passes);

        self.backend.begin_drawing_frame();
        let drawn = self.draw_passes(passes, frame);
        self.backend.finish_drawing_frame();
        let skip_root = drawn?;

        frame.report.root_damage_rect = frame.root_damage_rect;
        frame.report.root_skipped = skip_root;
        self.surface.finish_frame(&FrameCompletion {
            damage_rect: frame.root_damage_rect,
            root_skipped: skip_root,
            overlay_count: frame.overlay_list.len(),
        });
        Ok(())
    }

    /// Everything between `begin_drawing_frame` and `finish_drawing_frame`. Returns whether the
    /// root was skipped.
    fn draw_passes(
        &mut self,
        passes: &mut [RenderPass],
        frame: &mut DrawingFrame,
    ) -> CompositorResult<bool> {
        let Some((root, children)) = passes.split_last_mut() else {
            return Err(CompositorError::validation("render pass list is empty"));
        };

        frame.advance(FramePhase::DrawPasses);
        for pass in children.iter_mut() {
            if self.cache.is_bypassed(pass.id) {
                continue;
            }
            self.draw_pass_and_copy(pass, frame)?;
        }

        frame.advance(FramePhase::OverlayNegotiate);
        if self.surface.is_displayed_as_overlay_plane() {
            frame.overlay_list.push(OverlayCandidate::output_surface_plane(
                root.output_rect,
                self.surface.overlay_buffer_format(),
            ));
        }
        // A promoted quad would be missing from the readback.
        if root.copy_requests.is_empty() {
            self.overlay.process_for_overlays(
                root,
                &frame.filters,
                &mut frame.overlay_list,
                &mut frame.root_damage_rect,
            );
        }
        frame.report.overlay_candidates = frame.overlay_list.len();

        frame.advance(FramePhase::RootDecide);
        let skip_root = is_empty_rect(frame.root_damage_rect) && self.allow_empty_swap;
        if !skip_root && !self.use_partial_swap {
            frame.root_damage_rect = root.output_rect;
        }

        if skip_root {
            frame.advance(FramePhase::SkipRoot);
            tracing::debug!("root pass skipped: no damage");
            // Binding allocates the backbuffer the overlay plane scans out.
            if frame
                .overlay_list
                .iter()
                .any(|c| c.use_output_surface_for_resource)
            {
                self.surface.bind_framebuffer()?;
            }
        } else {
            frame.advance(FramePhase::DrawRoot);
            self.draw_pass_and_copy(root, frame)?;
        }

        frame.advance(FramePhase::Finish);
        Ok(skip_root)
    }

    fn draw_pass_and_copy(
        &mut self,
        pass: &mut RenderPass,
        frame: &mut DrawingFrame,
    ) -> CompositorResult<()> {
        if !self.use_render_pass(pass, frame)? {
            return Ok(());
        }
        self.draw_render_pass(pass, frame);

        let requests = std::mem::take(&mut pass.copy_requests);
        for (i, request) in requests.into_iter().enumerate() {
            // A readback may disturb the bound target.
            if i > 0 && !self.use_render_pass(pass, frame)? {
                break;
            }
            self.copy_current_render_pass(request, pass.output_rect, frame);
        }
        Ok(())
    }

    /// Bind the destination of `pass`. `Ok(false)` means a non-root pass could not be bound and
    /// must not be drawn.
    fn use_render_pass(
        &mut self,
        pass: &RenderPass,
        frame: &mut DrawingFrame,
    ) -> CompositorResult<bool> {
        frame.current_pass = Some(pass.id);
        let device_viewport_rect = frame.device_viewport_size.to_rect();

        if frame.is_root(pass.id) {
            self.surface.bind_framebuffer()?;
            frame.viewport = ViewportState {
                draw_rect: pass.output_rect,
                viewport_rect: device_viewport_rect,
                surface_size: frame.device_viewport_size.to_size(),
                device_viewport_rect,
                flipped: self.surface.capabilities().flipped_output_surface,
                is_root: true,
            };
            return Ok(true);
        }

        let bound = self
            .cache
            .ensure_allocated(pass.id, &mut self.backend)
            .and_then(|texture| {
                self.backend.bind_framebuffer_to_texture(texture)?;
                Ok(texture)
            });
        let texture = match bound {
            Ok(texture) => texture,
            Err(err) => {
                tracing::warn!(pass = pass.id.0, error = %err, "render pass dropped");
                frame.report.passes_failed += 1;
                return Ok(false);
            }
        };

        let texture_size = self
            .cache
            .entry(pass.id)
            .and_then(|e| e.allocated_size())
            .unwrap_or_else(|| PixelSize::covering(pass.output_rect.size()));
        frame.viewport = ViewportState {
            draw_rect: pass.output_rect,
            viewport_rect: Rect::from_origin_size(Point::ORIGIN, pass.output_rect.size()),
            surface_size: texture_size.to_size(),
            device_viewport_rect,
            flipped: self.backend.flipped_texture_framebuffer(),
            is_root: false,
        };
        Ok(true)
    }

    fn pass_damage_rect(&self, pass: &RenderPass, frame: &DrawingFrame) -> Rect {
        if frame.is_root(pass.id) {
            return frame.root_damage_rect;
        }
        // Overlay damage outside the root's own damage invalidates child damage tracking.
        if !contains_rect(frame.root_pass_damage_rect, frame.root_damage_rect) {
            return pass.output_rect;
        }
        pass.damage_rect
    }

    fn draw_render_pass(&mut self, pass: &RenderPass, frame: &mut DrawingFrame) {
        let is_root = frame.is_root(pass.id);
        let surface_rect = frame.viewport.output_surface_rect_in_draw_space();
        let mut scissor = surface_rect;
        if is_root {
            scissor = intersect_rects(scissor, frame.viewport.device_viewport_rect_in_draw_space());
        }
        if self.use_partial_swap {
            scissor = intersect_rects(scissor, self.pass_damage_rect(pass, frame));
        }
        let is_clipped = !contains_rect(scissor, surface_rect);

        let external_stencil = is_root && self.surface.has_external_stencil_test();
        debug_assert!(
            !external_stencil || !pass.has_transparent_background,
            "external stencil test cannot be combined with a transparent root pass"
        );
        let should_clear = !external_stencil
            && if is_root {
                self.settings.should_clear_root_render_pass
            } else {
                self.settings.clear_offscreen_passes
            };
        let mode = match (should_clear, is_clipped) {
            (true, true) => SurfaceInitMode::ScissoredClear,
            (true, false) => SurfaceInitMode::FullClear,
            (false, _) => SurfaceInitMode::Preserve,
        };
        tracing::debug!(pass = pass.id.0, ?mode, ?scissor, "drawing render pass");
        self.backend.prepare_surface_for_pass(&SurfaceInit {
            mode,
            scissor_window_rect: frame.viewport.move_from_draw_to_window_space(scissor),
            transparent: pass.has_transparent_background,
        });

        let ctx = PassDrawContext {
            scissor,
            use_scissor: is_clipped,
            projection: frame.viewport.projection_matrix(),
            window: frame.viewport.window_matrix(),
        };
        let mut polygons = VecDeque::new();
        let mut last_sorting_context = 0;

        // Back-to-front: later list entries are underneath.
        for (index, quad) in pass.quads.iter().enumerate().rev() {
            if is_clipped && should_skip_quad(quad, scissor) {
                frame.report.quads_skipped += 1;
                continue;
            }
            let sorting_context = quad.sorting_context_id();
            if sorting_context != last_sorting_context {
                last_sorting_context = sorting_context;
                self.flush_polygons(&mut polygons, pass, &ctx, frame);
            }
            if sorting_context != 0 {
                match DrawPolygon::from_quad(quad, index) {
                    Some(polygon) => polygons.push_back(polygon),
                    None => frame.report.polygons_dropped += 1,
                }
                continue;
            }
            self.set_scissor_state_for_quad(quad, &ctx, frame);
            self.do_draw_quad(quad, None, &ctx, frame);
        }
        self.flush_polygons(&mut polygons, pass, &ctx, frame);

        self.backend.finish_drawing_quad_list();
        frame.report.passes_drawn += 1;
    }

    fn flush_polygons(
        &mut self,
        polygons: &mut VecDeque<DrawPolygon>,
        pass: &RenderPass,
        ctx: &PassDrawContext,
        frame: &mut DrawingFrame,
    ) {
        if polygons.is_empty() {
            return;
        }
        let tree = BspTree::new(polygons);
        debug_assert!(polygons.is_empty(), "bsp build left polygons behind");
        tracing::trace!(nodes = tree.node_count(), "flushing sorting context");

        for polygon in tree.into_draw_order() {
            let quad = &pass.quads[polygon.quad_index()];
            self.set_scissor_state_for_quad(quad, ctx, frame);
            frame.report.polygons_drawn += 1;
            if !polygon.is_split() {
                self.do_draw_quad(quad, None, ctx, frame);
                continue;
            }
            let outlines = quad
                .shared
                .quad_to_target_transform
                .inverse()
                .and_then(|inverse| polygon.to_quads_2d(&inverse));
            let Some(outlines) = outlines else {
                tracing::warn!(
                    quad = polygon.quad_index(),
                    "split polygon cannot be mapped back to quad space"
                );
                continue;
            };
            for outline in &outlines {
                self.do_draw_quad(quad, Some(outline), ctx, frame);
            }
        }
    }

    fn set_scissor_state_for_quad(
        &mut self,
        quad: &DrawQuad,
        ctx: &PassDrawContext,
        frame: &DrawingFrame,
    ) {
        let rect = if quad.shared.is_clipped {
            if ctx.use_scissor {
                intersect_rects(quad.shared.clip_rect, ctx.scissor)
            } else {
                quad.shared.clip_rect
            }
        } else if ctx.use_scissor {
            ctx.scissor
        } else {
            self.backend.ensure_scissor_test_disabled();
            return;
        };
        self.backend
            .set_scissor_test_rect(frame.viewport.move_from_draw_to_window_space(rect));
    }

    fn do_draw_quad(
        &mut self,
        quad: &DrawQuad,
        outline: Option<&QuadF>,
        ctx: &PassDrawContext,
        frame: &mut DrawingFrame,
    ) {
        let (pass_texture, bypass_quad, filters, background_filters) = match quad.render_pass_id()
        {
            Some(id) => (
                self.cache.get(id),
                self.cache.bypass_quad(id),
                frame.filters.filters(id),
                frame.filters.background_filters(id),
            ),
            None => (None, None, None, None),
        };
        if quad.render_pass_id().is_some() && pass_texture.is_none() && bypass_quad.is_none() {
            // The source pass was dropped earlier in the frame.
            frame.report.quads_skipped += 1;
            return;
        }
        self.backend.draw_quad(&QuadDraw {
            quad,
            outline,
            projection: &ctx.projection,
            window: &ctx.window,
            pass_texture,
            bypass_quad,
            filters,
            background_filters,
        });
        frame.report.quads_drawn += 1;
    }

    fn copy_current_render_pass(
        &mut self,
        request: CopyOutputRequest,
        output_rect: Rect,
        frame: &mut DrawingFrame,
    ) {
        let area = match request.area {
            Some(area) => intersect_rects(area, output_rect),
            None => output_rect,
        };
        let request_id = self.next_copy_request_id;
        self.next_copy_request_id += 1;
        self.backend.copy_current_render_pass(CopyDispatch {
            request_id,
            request,
            window_rect: frame.viewport.move_from_draw_to_window_space(area),
        });
        frame.report.copy_requests += 1;
    }
}

/// `true` when nothing of `quad` can land inside `scissor`.
fn should_skip_quad(quad: &DrawQuad, scissor: Rect) -> bool {
    if is_empty_rect(scissor) {
        return true;
    }
    let Some(mut target) = quad_target_bounds(quad) else {
        return true;
    };
    if quad.shared.is_clipped {
        target = intersect_rects(target, quad.shared.clip_rect);
    }
    is_empty_rect(intersect_rects(target, scissor))
}

/// Target-space bounds of the visible rect; perspective quads go through homogeneous clipping.
fn quad_target_bounds(quad: &DrawQuad) -> Option<Rect> {
    if let Some(rect) = quad.visible_rect_in_target() {
        return Some(rect);
    }
    let polygon = DrawPolygon::from_quad(quad, 0)?;
    let mut points = polygon.points().iter().map(|p| p.to_2d());
    let first = points.next()?;
    Some(points.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
