use crate::foundation::core::{ColorSpace, PixelSize, Rect, RenderPassId};
use crate::model::filters::FilterOperations;
use crate::model::pass::RenderPass;
use crate::render::overlay::OverlayCandidate;
use crate::transform::coords::ViewportState;

/// Non-empty filter lists of one frame, sorted by pass id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterLookup {
    filters: Vec<(RenderPassId, FilterOperations)>,
    background_filters: Vec<(RenderPassId, FilterOperations)>,
}

impl FilterLookup {
    /// Collect the filter lists of `passes`.
    pub fn collect(passes: &[RenderPass]) -> Self {
        let mut lookup = Self::default();
        for pass in passes {
            if !pass.filters.is_empty() {
                lookup.filters.push((pass.id, pass.filters.clone()));
            }
            if !pass.background_filters.is_empty() {
                lookup
                    .background_filters
                    .push((pass.id, pass.background_filters.clone()));
            }
        }
        lookup.filters.sort_by_key(|(id, _)| *id);
        lookup.background_filters.sort_by_key(|(id, _)| *id);
        lookup
    }

    /// Filters applied when pass `id` is drawn into its parent.
    pub fn filters(&self, id: RenderPassId) -> Option<&FilterOperations> {
        find(&self.filters, id)
    }

    /// Filters applied to the content behind pass `id`.
    pub fn background_filters(&self, id: RenderPassId) -> Option<&FilterOperations> {
        find(&self.background_filters, id)
    }

    /// `true` when no pass has filters of either kind.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.background_filters.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.filters.clear();
        self.background_filters.clear();
    }
}

fn find(list: &[(RenderPassId, FilterOperations)], id: RenderPassId) -> Option<&FilterOperations> {
    list.binary_search_by_key(&id, |(k, _)| *k)
        .ok()
        .map(|i| &list[i].1)
}

/// Stage of an in-flight frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FramePhase {
    /// Damage computed, surface reshaped, filters collected.
    Begin,
    /// Drawing non-root passes.
    DrawPasses,
    /// Overlay candidates being negotiated.
    OverlayNegotiate,
    /// Deciding whether the root pass is drawn.
    RootDecide,
    /// Drawing the root pass.
    DrawRoot,
    /// Root drawing skipped.
    SkipRoot,
    /// Frame complete.
    Finish,
}

/// What happened during one `draw_frame`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FrameReport {
    /// Final root damage rect.
    pub root_damage_rect: Rect,
    /// The root pass was not drawn.
    pub root_skipped: bool,
    /// Passes bound and drawn, root included.
    pub passes_drawn: usize,
    /// Non-root passes drawn through a bypass quad.
    pub passes_bypassed: usize,
    /// Non-root passes dropped because their texture could not be bound.
    pub passes_failed: usize,
    /// Draw calls issued, fragments included.
    pub quads_drawn: usize,
    /// Quads culled against the pass scissor.
    pub quads_skipped: usize,
    /// BSP fragments drawn.
    pub polygons_drawn: usize,
    /// Degenerate 3-D quads dropped before sorting.
    pub polygons_dropped: usize,
    /// Overlay candidates after negotiation.
    pub overlay_candidates: usize,
    /// Copy requests executed.
    pub copy_requests: usize,
}

/// Scratch state of one frame; created by `draw_frame` and dropped when it returns.
#[derive(Debug)]
pub struct DrawingFrame {
    /// Id of the root pass.
    pub root_pass_id: RenderPassId,
    /// The root pass's own damage rect, before overlay adjustments.
    pub root_pass_damage_rect: Rect,
    /// Damage of the root target, including overlay contributions.
    pub root_damage_rect: Rect,
    /// Device viewport size.
    pub device_viewport_size: PixelSize,
    /// Device color space.
    pub color_space: ColorSpace,
    /// Overlay candidates for display hardware.
    pub overlay_list: Vec<OverlayCandidate>,
    /// Filters of this frame's passes.
    pub filters: FilterLookup,
    /// Pass currently bound.
    pub current_pass: Option<RenderPassId>,
    /// Space mapping of the current pass.
    pub viewport: ViewportState,
    /// Current stage.
    pub phase: FramePhase,
    /// Counters reported when the frame ends.
    pub report: FrameReport,
}

impl DrawingFrame {
    /// Fresh frame for the given root pass.
    pub fn new(root: &RenderPass, device_viewport_size: PixelSize, color_space: ColorSpace) -> Self {
        let device_viewport_rect = device_viewport_size.to_rect();
        Self {
            root_pass_id: root.id,
            root_pass_damage_rect: root.damage_rect,
            root_damage_rect: root.damage_rect,
            device_viewport_size,
            color_space,
            overlay_list: Vec::new(),
            filters: FilterLookup::default(),
            current_pass: None,
            viewport: ViewportState {
                draw_rect: root.output_rect,
                viewport_rect: device_viewport_rect,
                surface_size: device_viewport_size.to_size(),
                device_viewport_rect,
                flipped: false,
                is_root: true,
            },
            phase: FramePhase::Begin,
            report: FrameReport::default(),
        }
    }

    /// Advance to `next`; phases only move forward.
    pub fn advance(&mut self, next: FramePhase) {
        debug_assert!(next >= self.phase, "{:?} after {:?}", next, self.phase);
        tracing::trace!(from = ?self.phase, to = ?next, "frame phase");
        self.phase = next;
    }

    /// `true` when `id` is the root pass of this frame.
    pub fn is_root(&self, id: RenderPassId) -> bool {
        id == self.root_pass_id
    }
}
