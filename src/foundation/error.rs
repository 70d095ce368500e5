/// Convenience result type used across led2bin.
pub type LedResult<T> = Result<T, LedError>;

/// Top-level error taxonomy used by conversion APIs.
#[derive(thiserror::Error, Debug)]
pub enum LedError {
    /// Invalid configuration, dimensions, or buffer shapes.
    #[error("validation error: {0}")]
    Validation(String),

    /// The rasterizer collaborator could not decode or resize an input.
    #[error("raster error: {0}")]
    Raster(String),

    /// Reading inputs or writing packed outputs failed.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedError {
    /// Build a [`LedError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LedError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }

    /// Build a [`LedError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
