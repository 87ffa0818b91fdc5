//! polingscope-algorithms: Measurement algorithms for poled waveguides.
//!
//! This crate provides:
//! - **Minima detection** - prominence-filtered valleys, shared by both stages
//! - **Calibration** - microns-per-pixel from a region of known period
//! - **Poling analysis** - domain widths, duty cycle and their statistics
//! - **Session** - calibration/profile state for the image being worked on
//!
#![warn(missing_docs)]

mod analysis;
mod calibration;
pub mod peaks;
mod session;

pub use analysis::{PolingAnalyzer, DEFAULT_PROMINENCE};
pub use calibration::{calibrate, Calibration, CalibrationEngine, DEFAULT_NOMINAL_PERIOD};
pub use peaks::{find_minima, find_peaks, Extremum};
pub use session::{AnalysisSession, CalibrationState, ProfileState, SessionConfig};

// Re-export core types used at every call site
pub use polingscope_core::{
    CalibrationFactor, IntensityProfile, LengthUnit, ResultsRecord, RowRange, RowSelection,
};
