//! JSON frame scripts replayed through the compositor with recording collaborators.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{ColorSpace, PixelSize};
use crate::foundation::error::{CompositorError, CompositorResult};
use crate::model::pass::RenderPass;
use crate::render::compositor::FrameCompositor;
use crate::render::frame::FrameReport;
use crate::render::overlay::{NullOverlayProcessor, OverlayProcessor, SingleOnTopOverlayProcessor};
use crate::render::recording::{
    BackendCall, RecordingBackend, RecordingSurface, SurfaceCall, SurfaceConfig,
};
use crate::render::settings::RendererSettings;

/// Overlay processor used during replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    /// [`NullOverlayProcessor`].
    #[default]
    None,
    /// [`SingleOnTopOverlayProcessor`].
    SingleOnTop,
}

impl OverlayMode {
    fn processor(self, surface: &SurfaceConfig) -> Box<dyn OverlayProcessor> {
        match self {
            Self::None => Box::new(NullOverlayProcessor),
            Self::SingleOnTop => Box::new(SingleOnTopOverlayProcessor::new(surface.overlay_format)),
        }
    }
}

/// One frame of a script.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptFrame {
    /// Device scale factor.
    #[serde(default = "unit_scale")]
    pub scale_factor: f64,
    /// Output color space.
    #[serde(default)]
    pub color_space: ColorSpace,
    /// Viewport for this frame; defaults to the script viewport.
    #[serde(default)]
    pub viewport: Option<PixelSize>,
    /// Passes in draw order, root last.
    pub passes: Vec<RenderPass>,
}

fn unit_scale() -> f64 {
    1.0
}

/// A surface description plus a sequence of frames.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameScript {
    /// Renderer settings.
    pub settings: RendererSettings,
    /// Recorded surface description.
    pub surface: SurfaceConfig,
    /// Overlay processor selection.
    pub overlay: OverlayMode,
    /// Default viewport.
    pub viewport: PixelSize,
    /// Frames, in order.
    pub frames: Vec<ScriptFrame>,
}

/// Outcome of replaying one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ReplayFrame {
    /// Frame index within the script.
    pub index: usize,
    /// Report of a successful frame.
    pub report: Option<FrameReport>,
    /// Error of a failed frame.
    pub error: Option<String>,
    /// Backend calls issued during the frame.
    pub backend_calls: Vec<BackendCall>,
    /// Surface calls issued during the frame.
    pub surface_calls: Vec<SurfaceCall>,
}

impl FrameScript {
    /// Parse a script from JSON.
    pub fn from_json_str(s: &str) -> CompositorResult<Self> {
        serde_json::from_str(s).map_err(|e| CompositorError::serde(e.to_string()))
    }

    /// Read and parse a script file.
    pub fn from_path(path: &Path) -> CompositorResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read frame script '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Replay every frame. A failing frame is reported and replay continues with the next one.
    pub fn run(&self) -> CompositorResult<Vec<ReplayFrame>> {
        let mut compositor = FrameCompositor::new(
            self.settings.clone(),
            RecordingSurface::new(self.surface.clone()),
            RecordingBackend::new(),
        )
        .with_overlay_processor(self.overlay.processor(&self.surface));
        compositor.initialize()?;

        let mut out = Vec::with_capacity(self.frames.len());
        for (index, frame) in self.frames.iter().enumerate() {
            let viewport = frame.viewport.unwrap_or(self.viewport);
            let result = compositor.draw_frame(
                frame.passes.clone(),
                frame.scale_factor,
                frame.color_space,
                viewport,
            );
            if let Err(err) = &result {
                tracing::warn!(frame = index, error = %err, "frame failed");
            }
            let backend_calls = compositor.backend_mut().take_calls();
            let surface_calls = compositor.surface_mut().take_calls();
            let (report, error) = match result {
                Ok(report) => (Some(report), None),
                Err(err) => (None, Some(err.to_string())),
            };
            out.push(ReplayFrame {
                index,
                report,
                error,
                backend_calls,
                surface_calls,
            });
        }
        Ok(out)
    }
}
