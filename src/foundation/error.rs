/// Convenience result type used across the compositor.
pub type CompositorResult<T> = Result<T, CompositorError>;

/// Top-level error taxonomy used by compositor APIs.
///
/// The compositor decides per variant whether a failure only drops one render pass
/// ([`CompositorError::Resource`]) or aborts the whole frame ([`CompositorError::Surface`]).
#[derive(thiserror::Error, Debug)]
pub enum CompositorError {
    /// Invalid caller-provided data or call order.
    #[error("validation error: {0}")]
    Validation(String),

    /// A texture could not be allocated or bound for an offscreen pass.
    #[error("resource error: {0}")]
    Resource(String),

    /// The presentation target could not be reshaped or bound.
    #[error("surface error: {0}")]
    Surface(String),

    /// Errors when serializing or deserializing settings and frame scripts.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CompositorError {
    /// Build a [`CompositorError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CompositorError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`CompositorError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`CompositorError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` when the failure only affects a single offscreen pass.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Resource(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
