//! Collaborators that record every call instead of touching a GPU.
//!
//! Used by the replay tool and by tests; both support failure injection.

use std::collections::BTreeMap;

use crate::cache::texture::{TextureAllocator, TextureDesc, TextureId};
use crate::foundation::core::{PixelSize, Rect, TextureFormat};
use crate::foundation::error::{CompositorError, CompositorResult};
use crate::render::backend::{
    CopyDispatch, FrameCompletion, OutputSurface, QuadDraw, RenderBackend, ReshapeParams,
    SurfaceCapabilities, SurfaceInit, SurfaceInitMode,
};

/// One recorded [`RenderBackend`] call.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum BackendCall {
    /// `begin_drawing_frame`.
    BeginDrawingFrame,
    /// `allocate_texture` succeeded.
    AllocateTexture {
        /// New texture id.
        texture: u64,
        /// Allocated size.
        size: PixelSize,
    },
    /// `free_texture`.
    FreeTexture {
        /// Freed texture id.
        texture: u64,
    },
    /// `bind_framebuffer_to_texture` succeeded.
    BindTexture {
        /// Bound texture id.
        texture: u64,
    },
    /// `set_scissor_test_rect`.
    SetScissor {
        /// Window-space rect.
        rect: Rect,
    },
    /// `ensure_scissor_test_disabled`.
    DisableScissor,
    /// `prepare_surface_for_pass`.
    PrepareSurface {
        /// Initialization mode.
        mode: SurfaceInitMode,
        /// Window-space pass scissor.
        rect: Rect,
    },
    /// `draw_quad`.
    DrawQuad {
        /// Material name of the quad.
        material: &'static str,
        /// Drawn through a BSP fragment outline.
        split: bool,
        /// Source pass texture of a render-pass quad.
        pass_texture: Option<u64>,
        /// Drew a bypass quad instead of a pass texture.
        bypassed: bool,
    },
    /// `finish_drawing_quad_list`.
    FinishQuadList,
    /// `copy_current_render_pass`.
    CopyRequest {
        /// Compositor-assigned request id.
        request_id: u64,
        /// Window-space rect read back.
        rect: Rect,
    },
    /// `finish_drawing_frame`.
    FinishDrawingFrame,
}

impl BackendCall {
    /// Snake_case name of the call.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BeginDrawingFrame => "begin_drawing_frame",
            Self::AllocateTexture { .. } => "allocate_texture",
            Self::FreeTexture { .. } => "free_texture",
            Self::BindTexture { .. } => "bind_texture",
            Self::SetScissor { .. } => "set_scissor",
            Self::DisableScissor => "disable_scissor",
            Self::PrepareSurface { .. } => "prepare_surface",
            Self::DrawQuad { .. } => "draw_quad",
            Self::FinishQuadList => "finish_quad_list",
            Self::CopyRequest { .. } => "copy_request",
            Self::FinishDrawingFrame => "finish_drawing_frame",
        }
    }
}

/// [`RenderBackend`] that records calls and tracks live textures.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    live: BTreeMap<TextureId, TextureDesc>,
    next_texture: u64,
    /// Fail every texture allocation.
    pub fail_allocations: bool,
    /// Fail allocations larger than this in either dimension.
    pub max_texture_size: Option<PixelSize>,
    /// Report offscreen framebuffers as bottom-up.
    pub flipped: bool,
}

impl RecordingBackend {
    /// Backend with no failures configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Drain the call log.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Call names, in order.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls.iter().map(BackendCall::name).collect()
    }

    /// Number of `draw_quad` calls.
    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::DrawQuad { .. }))
            .count()
    }

    /// Textures allocated and not yet freed.
    pub fn live_textures(&self) -> usize {
        self.live.len()
    }
}

impl TextureAllocator for RecordingBackend {
    fn allocate_texture(&mut self, desc: &TextureDesc) -> CompositorResult<TextureId> {
        if self.fail_allocations {
            return Err(CompositorError::resource("texture allocation disabled"));
        }
        if let Some(max) = self.max_texture_size
            && !max.contains(desc.size)
        {
            return Err(CompositorError::resource(format!(
                "texture {}x{} exceeds {}x{}",
                desc.size.width, desc.size.height, max.width, max.height
            )));
        }
        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        self.live.insert(id, *desc);
        self.calls.push(BackendCall::AllocateTexture {
            texture: id.0,
            size: desc.size,
        });
        Ok(id)
    }

    fn free_texture(&mut self, id: TextureId) {
        self.live.remove(&id);
        self.calls.push(BackendCall::FreeTexture { texture: id.0 });
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_drawing_frame(&mut self) {
        self.calls.push(BackendCall::BeginDrawingFrame);
    }

    fn bind_framebuffer_to_texture(&mut self, texture: TextureId) -> CompositorResult<()> {
        if !self.live.contains_key(&texture) {
            return Err(CompositorError::resource(format!(
                "texture {} is not allocated",
                texture.0
            )));
        }
        self.calls.push(BackendCall::BindTexture { texture: texture.0 });
        Ok(())
    }

    fn flipped_texture_framebuffer(&self) -> bool {
        self.flipped
    }

    fn set_scissor_test_rect(&mut self, window_rect: Rect) {
        self.calls.push(BackendCall::SetScissor { rect: window_rect });
    }

    fn ensure_scissor_test_disabled(&mut self) {
        self.calls.push(BackendCall::DisableScissor);
    }

    fn prepare_surface_for_pass(&mut self, init: &SurfaceInit) {
        self.calls.push(BackendCall::PrepareSurface {
            mode: init.mode,
            rect: init.scissor_window_rect,
        });
    }

    fn draw_quad(&mut self, draw: &QuadDraw<'_>) {
        self.calls.push(BackendCall::DrawQuad {
            material: draw.quad.material.name(),
            split: draw.outline.is_some(),
            pass_texture: draw.pass_texture.map(|t| t.0),
            bypassed: draw.bypass_quad.is_some(),
        });
    }

    fn finish_drawing_quad_list(&mut self) {
        self.calls.push(BackendCall::FinishQuadList);
    }

    fn copy_current_render_pass(&mut self, copy: CopyDispatch) {
        self.calls.push(BackendCall::CopyRequest {
            request_id: copy.request_id,
            rect: copy.window_rect,
        });
    }

    fn finish_drawing_frame(&mut self) {
        self.calls.push(BackendCall::FinishDrawingFrame);
    }
}

/// Static description of a [`RecordingSurface`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Reported capabilities.
    pub capabilities: SurfaceCapabilities,
    /// The surface is scanned out as an overlay plane.
    pub displayed_as_overlay_plane: bool,
    /// An external stencil test is active.
    pub external_stencil_test: bool,
    /// Overlay buffer format.
    pub overlay_format: TextureFormat,
}

/// One recorded [`OutputSurface`] call.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SurfaceCall {
    /// `reshape`.
    Reshape {
        /// New size.
        size: PixelSize,
    },
    /// `bind_framebuffer`.
    Bind,
    /// `finish_frame`.
    FinishFrame {
        /// Presented damage.
        damage_rect: Rect,
        /// Root drawing was skipped.
        root_skipped: bool,
    },
}

/// [`OutputSurface`] that records calls.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    config: SurfaceConfig,
    calls: Vec<SurfaceCall>,
    last_reshape: Option<ReshapeParams>,
    /// Fail the next reshapes.
    pub fail_reshape: bool,
    /// Fail the next binds.
    pub fail_bind: bool,
}

impl RecordingSurface {
    /// Surface described by `config`.
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Surface with partial swap support and nothing else.
    pub fn with_partial_swap() -> Self {
        Self::new(SurfaceConfig {
            capabilities: SurfaceCapabilities {
                supports_partial_swap: true,
                ..SurfaceCapabilities::default()
            },
            ..SurfaceConfig::default()
        })
    }

    /// Every call so far.
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Drain the call log.
    pub fn take_calls(&mut self) -> Vec<SurfaceCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of binds recorded.
    pub fn bind_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::Bind))
            .count()
    }

    /// Parameters of the last successful reshape.
    pub fn last_reshape(&self) -> Option<&ReshapeParams> {
        self.last_reshape.as_ref()
    }
}

impl OutputSurface for RecordingSurface {
    fn capabilities(&self) -> SurfaceCapabilities {
        self.config.capabilities
    }

    fn reshape(&mut self, params: &ReshapeParams) -> CompositorResult<()> {
        if self.fail_reshape {
            return Err(CompositorError::surface("reshape failed"));
        }
        self.last_reshape = Some(*params);
        self.calls.push(SurfaceCall::Reshape { size: params.size });
        Ok(())
    }

    fn bind_framebuffer(&mut self) -> CompositorResult<()> {
        if self.fail_bind {
            return Err(CompositorError::surface("framebuffer bind failed"));
        }
        self.calls.push(SurfaceCall::Bind);
        Ok(())
    }

    fn is_displayed_as_overlay_plane(&self) -> bool {
        self.config.displayed_as_overlay_plane
    }

    fn overlay_buffer_format(&self) -> TextureFormat {
        self.config.overlay_format
    }

    fn has_external_stencil_test(&self) -> bool {
        self.config.external_stencil_test
    }

    fn finish_frame(&mut self, completion: &FrameCompletion) {
        self.calls.push(SurfaceCall::FinishFrame {
            damage_rect: completion.damage_rect,
            root_skipped: completion.root_skipped,
        });
    }
}
