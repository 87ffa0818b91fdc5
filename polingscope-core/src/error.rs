//! Error types for polingscope-core.

use thiserror::Error;

/// Result type alias for polingscope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for polingscope operations.
///
/// None of these are fatal to a session: the operator can retry with a
/// different region, prominence or nominal period.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Calibration region produced too few minima to span a period.
    #[error(
        "insufficient minima for calibration: found {found}, need at least 2 (prominence {prominence})"
    )]
    InsufficientMinimaForCalibration { found: usize, prominence: f64 },

    /// Analysis requested before any profile was captured.
    #[error("no line profile captured; select a line or region first")]
    NoProfileCaptured,

    /// Selected rows or columns do not describe a usable region.
    #[error("invalid region selection: {0}")]
    InvalidRegionSelection(#[from] RegionError),

    /// A numeric parameter is out of its valid domain.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Image has no pixels.
    #[error("image is empty ({rows}x{cols})")]
    EmptyImage { rows: usize, cols: usize },
}

/// Reasons a row/column selection is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    /// Edge exclusion leaves no columns.
    #[error("exclusion {start}+{end} leaves no columns of {width}")]
    ExclusionTooWide {
        start: usize,
        end: usize,
        width: usize,
    },

    /// Row band is empty or inverted.
    #[error("row range [{start}, {end}) is empty")]
    EmptyRowRange { start: usize, end: usize },

    /// Row lies outside the image.
    #[error("row {row} out of bounds for image height {height}")]
    RowOutOfBounds { row: usize, height: usize },

    /// Display geometry cannot be mapped to the image.
    #[error("display height {display_height} cannot be mapped to image height {image_height}")]
    DegenerateDisplay {
        display_height: u32,
        image_height: usize,
    },
}
