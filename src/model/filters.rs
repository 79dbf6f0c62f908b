//! Opaque image-filter descriptions attached to render passes.
//!
//! The compositor never evaluates filters; it only routes them to the overlay processor and
//! to the backend that draws the pass.

use crate::foundation::core::{Rgba8Premul, Vec2};

/// A single image filter step.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterOperation {
    /// Gaussian blur.
    Blur {
        /// Standard deviation in pixels.
        sigma: f32,
    },
    /// Multiply alpha.
    Opacity {
        /// Factor in `[0, 1]`.
        amount: f32,
    },
    /// Desaturate.
    Grayscale {
        /// Factor in `[0, 1]`.
        amount: f32,
    },
    /// Scale color channels.
    Brightness {
        /// Channel multiplier.
        amount: f32,
    },
    /// Offset, blurred copy of the alpha channel drawn underneath.
    DropShadow {
        /// Shadow offset in pixels.
        offset: Vec2,
        /// Blur standard deviation.
        sigma: f32,
        /// Shadow color.
        color: Rgba8Premul,
    },
    /// Named filter implemented entirely by the backend.
    Reference {
        /// Backend-defined filter name.
        name: String,
    },
}

impl FilterOperation {
    /// `true` when the filter reads pixels outside the destination pixel.
    pub fn moves_pixels(&self) -> bool {
        matches!(self, Self::Blur { .. } | Self::DropShadow { .. })
    }
}

/// Ordered list of filter steps.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FilterOperations(pub Vec<FilterOperation>);

impl FilterOperations {
    /// `true` when no filter is applied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when any step samples neighbouring pixels.
    pub fn has_filter_that_moves_pixels(&self) -> bool {
        self.0.iter().any(FilterOperation::moves_pixels)
    }
}

impl From<Vec<FilterOperation>> for FilterOperations {
    fn from(ops: Vec<FilterOperation>) -> Self {
        Self(ops)
    }
}
