/// Convenience result type used across the renderer.
pub type RenderResult<T> = Result<T, RenderError>;

/// Top-level error taxonomy used by renderer APIs.
///
/// Soft fallbacks during font resolution are not errors; they are reported through `tracing`
/// warnings and resolution continues.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// A dependency was used before it was ready (for example a font store that was never loaded).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed field values in a document, element, or font query.
    #[error("validation error: {0}")]
    Validation(String),

    /// A font store blob was missing, corrupt, or empty.
    #[error("load error: {0}")]
    Load(String),

    /// An operation was called in a state that does not allow it.
    #[error("state error: {0}")]
    State(String),

    /// The computed canvas size is not strictly positive or exceeds raster limits.
    #[error("sizing error: {0}")]
    Sizing(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RenderError {
    /// Build a [`RenderError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`RenderError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RenderError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`RenderError::State`] value.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Build a [`RenderError::Sizing`] value.
    pub fn sizing(msg: impl Into<String>) -> Self {
        Self::Sizing(msg.into())
    }

    /// Build a [`RenderError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
