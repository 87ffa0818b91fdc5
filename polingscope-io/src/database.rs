//! CSV results database keyed by image identifier.
//!
//! One row per image. Saving a record for an image that already has a row
//! replaces that row in place; otherwise the row is appended.

use crate::Result;
use polingscope_core::{ResultsRecord, SummaryStats, ANNOTATION_FIELDS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Separator for list-valued cells.
const LIST_SEPARATOR: char = ';';

/// Flat row as stored in the results file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsRow {
    pub image_id: String,
    pub rotation_angle: f64,
    #[serde(rename = "RUN#")]
    pub run: String,
    #[serde(rename = "Chip#")]
    pub chip: String,
    #[serde(rename = "Device")]
    pub device: String,
    #[serde(rename = "Electrode Separation (um)")]
    pub electrode_separation_um: String,
    #[serde(rename = "Electrode Period (um)")]
    pub electrode_period_um: String,
    #[serde(rename = "Electrode Width (um)")]
    pub electrode_width_um: String,
    #[serde(rename = "Applied Voltage (mV)")]
    pub applied_voltage_mv: String,
    /// Annotations outside the standard set, as `key=value` pairs.
    pub notes: String,
    pub unit: String,
    pub calibration_factor: Option<f64>,
    pub prominence: f64,
    pub rows_averaged: usize,
    pub minima_count: usize,
    pub odd_mean: Option<f64>,
    pub odd_std: Option<f64>,
    pub even_mean: Option<f64>,
    pub even_std: Option<f64>,
    pub duty_cycle_mean: Option<f64>,
    pub duty_cycle_std: Option<f64>,
    pub unpaired_width: Option<f64>,
    pub odd_widths: String,
    pub even_widths: String,
    pub duty_cycle: String,
}

impl ResultsRow {
    /// Flatten a record into a row.
    #[must_use]
    pub fn from_record(record: &ResultsRecord) -> Self {
        let meta = &record.metadata;
        let note = |field: &str| meta.annotation(field).unwrap_or_default().to_string();
        let notes = meta
            .annotations
            .iter()
            .filter(|(key, _)| !ANNOTATION_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(&LIST_SEPARATOR.to_string());

        Self {
            image_id: meta.image_id.clone(),
            rotation_angle: meta.rotation_angle,
            run: note("RUN#"),
            chip: note("Chip#"),
            device: note("Device"),
            electrode_separation_um: note("Electrode Separation (um)"),
            electrode_period_um: note("Electrode Period (um)"),
            electrode_width_um: note("Electrode Width (um)"),
            applied_voltage_mv: note("Applied Voltage (mV)"),
            notes,
            unit: record.unit().symbol().to_string(),
            calibration_factor: record.calibration_factor.map(f64::from),
            prominence: record.prominence,
            rows_averaged: record.rows_averaged,
            minima_count: record.minima.len(),
            odd_mean: mean(record.odd_stats),
            odd_std: std(record.odd_stats),
            even_mean: mean(record.even_stats),
            even_std: std(record.even_stats),
            duty_cycle_mean: mean(record.duty_cycle_stats),
            duty_cycle_std: std(record.duty_cycle_stats),
            unpaired_width: record.widths.unpaired,
            odd_widths: join(&record.widths.odd),
            even_widths: join(&record.widths.even),
            duty_cycle: join(&record.duty_cycle),
        }
    }

    /// Parse a list-valued cell back into numbers.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidFormat`] for a non-numeric entry.
    pub fn parse_list(cell: &str) -> Result<Vec<f64>> {
        cell.split(LIST_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.trim()
                    .parse::<f64>()
                    .map_err(|e| crate::Error::InvalidFormat(format!("'{s}': {e}")))
            })
            .collect()
    }
}

fn mean(stats: Option<SummaryStats>) -> Option<f64> {
    stats.map(|s| s.mean)
}

fn std(stats: Option<SummaryStats>) -> Option<f64> {
    stats.map(|s| s.std)
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

/// Whether a save added a row or replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Appended,
    Replaced,
}

/// Results file on disk.
#[derive(Debug, Clone)]
pub struct ResultsDatabase {
    path: PathBuf,
}

impl ResultsDatabase {
    /// Use `path` as the results file. It need not exist yet.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the results file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored rows, in file order. A missing file has no rows.
    ///
    /// Columns are matched by name, so files written by older versions with
    /// fewer columns still load.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed.
    pub fn rows(&self) -> Result<Vec<ResultsRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Row stored for `image_id`, if any.
    ///
    /// # Errors
    /// See [`ResultsDatabase::rows`].
    pub fn find(&self, image_id: &str) -> Result<Option<ResultsRow>> {
        Ok(self
            .rows()?
            .into_iter()
            .find(|row| row.image_id == image_id))
    }

    /// Insert or replace the row for the record's image.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or rewritten.
    pub fn save(&self, record: &ResultsRecord) -> Result<SaveOutcome> {
        let new_row = ResultsRow::from_record(record);
        let mut rows = self.rows()?;

        let outcome = match rows.iter_mut().find(|row| row.image_id == new_row.image_id) {
            Some(existing) => {
                *existing = new_row;
                SaveOutcome::Replaced
            }
            None => {
                rows.push(new_row);
                SaveOutcome::Appended
            }
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        log::info!(
            "{:?} results for {} in {}",
            outcome,
            record.metadata.image_id,
            self.path.display()
        );
        Ok(outcome)
    }
}
