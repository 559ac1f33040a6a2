/// Convenience result type used across tableau.
pub type TableauResult<T> = Result<T, TableauError>;

/// Top-level error taxonomy.
///
/// Only initialization-time failures are expected to reach the caller of the playback loop;
/// per-frame failures are absorbed where they are detected.
#[derive(thiserror::Error, Debug)]
pub enum TableauError {
    /// Invalid configuration or tunables.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required asset (overlay, font, playlist file) could not be loaded.
    #[error("asset error: {0}")]
    Asset(String),

    /// An image or video could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The rendering or display backend is unavailable or failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TableauError {
    /// Build a [`TableauError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TableauError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`TableauError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`TableauError::Backend`] value.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`TableauError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
