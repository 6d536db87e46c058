/// Convenience result type used across rasterline.
pub type RasterResult<T> = Result<T, RasterError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    /// Invalid caller-provided parameters or bitmap data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while drawing marks or rasterizing a vector document.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while probing or decoding video frames.
    #[error("media error: {0}")]
    Media(String),

    /// Errors when serializing or deserializing parameter records.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RasterError {
    /// Build a [`RasterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RasterError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RasterError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`RasterError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
