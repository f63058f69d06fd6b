/// Convenience result type used across segcanvas.
pub type SegcanvasResult<T> = Result<T, SegcanvasError>;

/// Top-level error taxonomy used by the labelling core.
///
/// Stale asynchronous results are deliberately absent: they are dropped by the session,
/// never reported.
#[derive(thiserror::Error, Debug)]
pub enum SegcanvasError {
    /// Buffers that must share a shape do not (overlay vs labels, reference vs labels,
    /// flat responses vs image sizes).
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Input outside the supported raster modes (single, stack, large) or tensor shapes
    /// the renderer cannot address.
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),

    /// Intensity quantization found no usable step (no non-zero intensities).
    #[error("degenerate quantization: {0}")]
    DegenerateQuantization(String),

    /// A second oversized image was loaded while a tiled image is active.
    #[error("a tiled image is already loaded; only one tiled image is supported per session")]
    TiledImageActive,

    /// Invalid caller-provided arguments or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from codecs or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SegcanvasError {
    /// Build a [`SegcanvasError::DimensionMismatch`] value.
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Build a [`SegcanvasError::UnsupportedSource`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedSource(msg.into())
    }

    /// Build a [`SegcanvasError::DegenerateQuantization`] value.
    pub fn degenerate_quantization(msg: impl Into<String>) -> Self {
        Self::DegenerateQuantization(msg.into())
    }

    /// Build a [`SegcanvasError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
