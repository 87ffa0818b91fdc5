//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Results database error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Settings file error.
    #[error("settings error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid file contents.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),
}
