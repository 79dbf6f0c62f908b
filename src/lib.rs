//! framecomp executes a frame's render passes against an abstract draw backend and output surface.
//!
//! Each frame is an ordered list of [`RenderPass`]es whose last entry is the root. The
//! [`FrameCompositor`] walks that list once per frame:
//!
//! 1. **Reconcile** the per-pass texture cache ([`RenderPassTextureCache`]): allocate, reuse or
//!    evict offscreen textures, and record passes that can be bypassed entirely.
//! 2. **Draw** every non-root pass into its cached texture, then hand the root to the overlay
//!    processor before deciding whether the root needs drawing at all.
//! 3. **Clip** every draw to the damaged area when the surface supports partial swap.
//! 4. **Order** 3-D transformed quads that share a sorting context with a [`BspTree`], splitting
//!    intersecting quads so they composite back to front.
//!
//! The GPU side stays behind two traits, [`RenderBackend`] and [`OutputSurface`]; the crate ships
//! call-recording implementations of both ([`RecordingBackend`], [`RecordingSurface`]) that the
//! `framecomp` binary uses to replay JSON frame scripts ([`FrameScript`]).
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Plane-splitting polygons and the BSP tree that orders them.
pub mod bsp;
/// Offscreen pass textures, their allocator contract and bypass policies.
pub mod cache;
/// Render pass and quad data model.
pub mod model;
/// The compositor, its collaborator contracts and frame bookkeeping.
pub mod render;
/// JSON frame scripts replayed through the compositor.
pub mod replay;
/// Matrices, 3-D vectors and coordinate-space helpers.
pub mod transform;

pub use bsp::polygon::{DrawPolygon, PLANE_EPSILON};
pub use bsp::tree::BspTree;
pub use cache::bypass::{BypassMode, BypassPolicy, NeverBypass, SingleTileBypass};
pub use cache::pass_textures::{CachedPassTexture, ReconcileStats, RenderPassTextureCache};
pub use cache::texture::{TextureAllocator, TextureDesc, TextureHint, TextureId};
pub use foundation::core::{
    ColorSpace, PixelSize, Point, Rect, RenderPassId, ResourceId, Rgba8Premul, Size,
    TextureFormat, Vec2,
};
pub use foundation::error::{CompositorError, CompositorResult};
pub use foundation::geom::{
    contains_rect, enclosing_rect, intersect_rects, is_empty_rect, subtract_rect, union_non_empty,
};
pub use model::filters::{FilterOperation, FilterOperations};
pub use model::pass::{CopyOutputRequest, CopyResultFormat, RenderPass, RenderPassList};
pub use model::quad::{BlendMode, DrawQuad, Material, QuadF, SharedQuadState};
pub use render::backend::{
    CopyDispatch, FrameCompletion, OutputSurface, QuadDraw, RenderBackend, ReshapeParams,
    SurfaceCapabilities, SurfaceInit, SurfaceInitMode,
};
pub use render::compositor::FrameCompositor;
pub use render::frame::{DrawingFrame, FilterLookup, FramePhase, FrameReport};
pub use render::overlay::{
    NullOverlayProcessor, OverlayCandidate, OverlayProcessor, SingleOnTopOverlayProcessor,
};
pub use render::recording::{
    BackendCall, RecordingBackend, RecordingSurface, SurfaceCall, SurfaceConfig,
};
pub use render::settings::RendererSettings;
pub use replay::{FrameScript, OverlayMode, ReplayFrame, ScriptFrame};
pub use transform::coords::ViewportState;
pub use transform::matrix::Transform3d;
pub use transform::vec3::{Point3, Vec3};
