/// Convenience result type used across pixelspread.
pub type PixelspreadResult<T> = Result<T, PixelspreadError>;

/// Top-level error taxonomy for the fallible edges of the crate.
///
/// The canvas core itself never fails: coordinates are clamped and illegal playback
/// transitions are ignored. Errors only come from configuration, scripts, export and the
/// completion worker thread.
#[derive(thiserror::Error, Debug)]
pub enum PixelspreadError {
    /// Invalid user-provided configuration or script data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while producing or exporting pixels.
    #[error("render error: {0}")]
    Render(String),

    /// The completion worker thread could not be started or went away.
    #[error("worker error: {0}")]
    Worker(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixelspreadError {
    /// Build a [`PixelspreadError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PixelspreadError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PixelspreadError::Worker`] value.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }

    /// Build a [`PixelspreadError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
