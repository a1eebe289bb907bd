//! Error types for the watermarking pipeline.

/// Errors that can abort an embed or extract operation.
///
/// All variants are fatal for the current operation; no partial output is
/// ever produced. `PrecisionLoss` is deliberately *not* an error: writing the
/// embedded image through an 8-bit or lossy encoder degrades later extraction
/// but still succeeds, so the CLI reports it as a log warning instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required input image could not be resolved to pixel data.
    #[error("missing input: {path}: {source}")]
    MissingInput {
        /// The path that failed to resolve.
        path: String,
        /// The decode failure reported by the image reader.
        #[source]
        source: image::ImageError,
    },

    /// Two buffers that must agree in shape do not.
    #[error("dimension mismatch: {context}: {actual_height}x{actual_width}x{actual_channels} \
             does not fit {expected_height}x{expected_width}x{expected_channels}")]
    DimensionMismatch {
        /// Which check failed, e.g. "watermark exceeds canvas".
        context: &'static str,
        /// Height the operation required.
        expected_height: usize,
        /// Width the operation required.
        expected_width: usize,
        /// Channel count the operation required.
        expected_channels: usize,
        /// Height of the offending buffer.
        actual_height: usize,
        /// Width of the offending buffer.
        actual_width: usize,
        /// Channel count of the offending buffer.
        actual_channels: usize,
    },

    /// A parameter was rejected before any transform work started.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An I/O error from the file-facing helpers.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An encode/decode error from the image collaborator.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Specialized `Result` for this crate.
pub type Result<T> = std::result::Result<T, Error>;
