/// Convenience result type used across the loader.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Top-level error taxonomy used by the loader APIs.
#[derive(thiserror::Error, Debug)]
pub enum LoaderError {
    /// Invalid caller-provided data (buffer shapes, sizes, paths).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while synthesizing frames.
    #[error("render error: {0}")]
    Render(String),

    /// Errors raised by an encoding collaborator (`ffmpeg`, frame files).
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoaderError {
    /// Build a [`LoaderError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LoaderError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`LoaderError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`LoaderError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
