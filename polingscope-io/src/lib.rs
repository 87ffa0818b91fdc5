//! polingscope-io: File handling for polingscope.
//!
//! This crate loads microscope images as intensity arrays, rotates them,
//! keeps the CSV results database and settings file, and exports the plot
//! series of an analysis.
//!

pub mod database;
mod error;
mod intensity;
pub mod rotate;
pub mod series;
pub mod settings;

pub use database::{ResultsDatabase, ResultsRow, SaveOutcome};
pub use error::{Error, Result};
pub use intensity::{image_id, load_intensity, to_intensity};
pub use rotate::rotate;
pub use series::{export_series, SeriesFiles};
pub use settings::{Settings, DEFAULT_DATABASE_LOCATION, SETTINGS_FILE};
