use thiserror::Error;

/// Result type alias for the extraction pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the extraction pipeline. The pipeline never recovers from these internally; they are returned to
/// the immediate caller.
#[derive(Error, Debug)]
pub enum Error {
    /// The input handed to an adapter is not a byte sequence at all. [`crate::load_image`] takes `&[u8]` and so never
    /// returns this; it is available to adapters that accept untyped input.
    #[error("input is not a byte sequence: {reason}")]
    InputType { reason: String },

    /// The bytes are empty, match no known image container, or hold pixel data that could not be decoded.
    #[error("failed to decode image")]
    Decode(#[source] image::ImageError),

    /// Fewer distinct colors remain after background suppression than clusters were requested.
    #[error("{available} distinct color(s) available, {requested} requested")]
    InsufficientColors { requested: usize, available: usize },

    #[error("cluster count must be at least 1, got {0}")]
    InvalidClusterCount(usize),

    #[error("tolerance must be a finite non-negative number, got {0}")]
    InvalidTolerance(f64),
}
