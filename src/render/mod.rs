/// Collaborator contracts: output surface and draw backend.
pub mod backend;
/// The per-frame orchestrator.
pub mod compositor;
/// Per-frame scratch state, filter lookup and frame reports.
pub mod frame;
/// Overlay candidates and processors.
pub mod overlay;
/// Call-recording collaborators.
pub mod recording;
/// Renderer settings.
pub mod settings;
