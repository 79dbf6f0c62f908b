//! Render pass and quad data model handed to the compositor once per frame.

/// Opaque filter descriptions.
pub mod filters;
/// Render passes and copy requests.
pub mod pass;
/// Draw quads, materials and shared quad state.
pub mod quad;

#[cfg(test)]
#[path = "../../tests/unit/model/serde.rs"]
mod tests;
