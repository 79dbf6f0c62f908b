//! Matrix, vector and coordinate-space utilities.
//!
//! Everything here is pure; [`coords::ViewportState`] snapshots the per-pass rects the
//! space conversions read.

/// Projection/window matrices and draw/window/device space conversion.
pub mod coords;
/// Column-major 4×4 transform.
pub mod matrix;
/// 3-D points and vectors.
pub mod vec3;
