/// Convenience result type used across snapforge.
pub type SnapResult<T> = Result<T, SnapError>;

/// Top-level error taxonomy used by capture and pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum SnapError {
    /// Invalid user-provided options or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The renderer could not be driven or its output could not be captured.
    #[error("capture error: {0}")]
    Capture(String),

    /// A frame could not be normalized.
    #[error("normalize error: {0}")]
    Normalize(#[from] crate::normalize::NormalizeError),

    /// A normalized artifact or failure marker could not be written.
    #[error("persist error: {0}")]
    Persist(String),

    /// A job configuration could not be loaded, modified or staged.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SnapError {
    /// Build a [`SnapError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SnapError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`SnapError::Persist`] value.
    pub fn persist(msg: impl Into<String>) -> Self {
        Self::Persist(msg.into())
    }

    /// Build a [`SnapError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<std::io::Error> for SnapError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(anyhow::Error::new(err))
    }
}

impl From<image::ImageError> for SnapError {
    fn from(err: image::ImageError) -> Self {
        Self::Other(anyhow::Error::new(err))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
