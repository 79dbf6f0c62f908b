use crate::cache::bypass::BypassMode;
use crate::foundation::core::{PixelSize, TextureFormat};
use crate::foundation::error::{CompositorError, CompositorResult};

/// Renderer policy knobs, fixed for the lifetime of a compositor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Redraw only damaged regions when the surface supports it.
    pub partial_swap_enabled: bool,
    /// Clear the root pass before drawing it.
    pub should_clear_root_render_pass: bool,
    /// Clear offscreen pass textures before drawing into them.
    pub clear_offscreen_passes: bool,
    /// Extra pixels allocated around each offscreen pass texture.
    pub enlarge_pass_texture_amount: PixelSize,
    /// Count overdraw with the stencil buffer; the root surface then needs stencil.
    pub show_overdraw_feedback: bool,
    /// Storage format for offscreen pass textures.
    pub pass_texture_format: TextureFormat,
    /// Built-in pass bypass strategy.
    pub bypass: BypassMode,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            partial_swap_enabled: true,
            should_clear_root_render_pass: true,
            clear_offscreen_passes: true,
            enlarge_pass_texture_amount: PixelSize::default(),
            show_overdraw_feedback: false,
            pass_texture_format: TextureFormat::Rgba8,
            bypass: BypassMode::Never,
        }
    }
}

impl RendererSettings {
    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> CompositorResult<Self> {
        serde_json::from_str(s).map_err(|e| CompositorError::serde(e.to_string()))
    }

    /// Apply `FRAMECOMP_*` environment overrides.
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Some(v) = env_flag("FRAMECOMP_PARTIAL_SWAP") {
            self.partial_swap_enabled = v;
        }
        if let Some(v) = env_flag("FRAMECOMP_CLEAR_ROOT") {
            self.should_clear_root_render_pass = v;
        }
        if let Some(v) = std::env::var("FRAMECOMP_ENLARGE_PASS_TEXTURE")
            .ok()
            .and_then(|v| parse_pixel_size(&v))
        {
            self.enlarge_pass_texture_amount = v;
        }
        self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| parse_flag(&v))
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Parse `WxH`, e.g. `8x4`.
pub(crate) fn parse_pixel_size(v: &str) -> Option<PixelSize> {
    let (w, h) = v.trim().split_once(['x', 'X'])?;
    Some(PixelSize::new(w.trim().parse().ok()?, h.trim().parse().ok()?))
}
