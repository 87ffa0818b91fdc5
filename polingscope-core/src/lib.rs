//! polingscope-core: Core types for poled-waveguide domain measurement.
//!
//! This crate provides intensity profile extraction from a rotated image,
//! the pixel-to-micron calibration factor, region width bookkeeping and the
//! results record produced by an analysis run.
//!

pub mod error;
pub mod profile;
pub mod record;
pub mod stats;
pub mod units;

pub use error::{Error, RegionError, Result};
pub use profile::{
    select_region, DisplayScale, EdgeExclusion, IntensityProfile, ProfileExtractor, RowRange,
    RowSelection,
};
pub use record::{
    default_annotations, RecordMetadata, RegionWidths, ResultsRecord, ANNOTATION_FIELDS,
};
pub use stats::SummaryStats;
pub use units::{unit_for, CalibrationFactor, LengthUnit};
