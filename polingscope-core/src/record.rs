//! Region widths, duty cycle and the aggregated results record.

use crate::stats::SummaryStats;
use crate::units::{CalibrationFactor, LengthUnit};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Free-text fields recorded with every analysis, in display order.
pub const ANNOTATION_FIELDS: [&str; 7] = [
    "RUN#",
    "Chip#",
    "Device",
    "Electrode Separation (um)",
    "Electrode Period (um)",
    "Electrode Width (um)",
    "Applied Voltage (mV)",
];

/// Widths of alternating domains, paired by position.
///
/// `odd` holds gaps 0, 2, 4, ... of the minima sequence (actively poled),
/// `even` holds gaps 1, 3, 5, ... (passively poled). Both are truncated to
/// the same length; a trailing odd gap without a partner is kept in
/// `unpaired` rather than discarded.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionWidths {
    pub odd: Vec<f64>,
    pub even: Vec<f64>,
    pub unpaired: Option<f64>,
    pub unit: LengthUnit,
}

impl RegionWidths {
    /// Split consecutive gaps by parity and pair them up.
    #[must_use]
    pub fn from_gaps(gaps: &[f64], unit: LengthUnit) -> Self {
        let mut odd: Vec<f64> = gaps.iter().copied().step_by(2).collect();
        let even: Vec<f64> = gaps.iter().copied().skip(1).step_by(2).collect();

        let paired = odd.len().min(even.len());
        let unpaired = if odd.len() > paired { odd.pop() } else { None };
        debug_assert_eq!(odd.len(), even.len());

        Self {
            odd,
            even,
            unpaired,
            unit,
        }
    }

    /// Number of (odd, even) pairs.
    #[must_use]
    pub fn pairs(&self) -> usize {
        self.odd.len()
    }

    /// Per-pair duty cycle `odd / (odd + even)`.
    #[must_use]
    pub fn duty_cycle(&self) -> Vec<f64> {
        self.odd
            .iter()
            .zip(&self.even)
            .map(|(&odd, &even)| odd / (odd + even))
            .collect()
    }
}

/// Identifies the image and operator notes attached to a record.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordMetadata {
    pub image_id: String,
    pub rotation_angle: f64,
    pub annotations: Vec<(String, String)>,
}

impl RecordMetadata {
    /// Create metadata for `image_id` with the default annotations.
    #[must_use]
    pub fn new(image_id: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            rotation_angle: 0.0,
            annotations: default_annotations(),
        }
    }

    /// Set the rotation angle in degrees.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation_angle = degrees;
        self
    }

    /// Set or replace one annotation, keeping the existing order.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_annotation(key, value);
        self
    }

    /// Set or replace one annotation in place.
    pub fn set_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.annotations.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.annotations.push((key, value)),
        }
    }

    /// Look up an annotation value.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// All annotation fields, empty except the run prefix.
#[must_use]
pub fn default_annotations() -> Vec<(String, String)> {
    ANNOTATION_FIELDS
        .iter()
        .map(|&field| {
            let value = if field == "RUN#" { "LN3" } else { "" };
            (field.to_string(), value.to_string())
        })
        .collect()
}

/// Output of one analysis run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResultsRecord {
    pub metadata: RecordMetadata,
    pub calibration_factor: Option<CalibrationFactor>,
    pub prominence: f64,
    pub rows_averaged: usize,
    /// Pixel indices of the detected minima.
    pub minima: Vec<usize>,
    pub widths: RegionWidths,
    pub odd_stats: Option<SummaryStats>,
    pub even_stats: Option<SummaryStats>,
    pub duty_cycle: Vec<f64>,
    pub duty_cycle_stats: Option<SummaryStats>,
}

impl ResultsRecord {
    /// Unit of every width in this record.
    #[must_use]
    pub fn unit(&self) -> LengthUnit {
        self.widths.unit
    }

    /// False when fewer than three minima were found.
    #[must_use]
    pub fn has_duty_cycle(&self) -> bool {
        self.duty_cycle_stats.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_even_gap_count_pairs_everything() {
        let widths = RegionWidths::from_gaps(&[3.0, 1.0, 3.0, 1.0], LengthUnit::Pixels);
        assert_eq!(widths.odd, vec![3.0, 3.0]);
        assert_eq!(widths.even, vec![1.0, 1.0]);
        assert_eq!(widths.unpaired, None);
        assert_eq!(widths.duty_cycle(), vec![0.75, 0.75]);
    }

    #[test]
    fn test_trailing_odd_gap_is_unpaired() {
        let widths = RegionWidths::from_gaps(&[3.0, 1.0, 2.5], LengthUnit::Microns);
        assert_eq!(widths.pairs(), 1);
        assert_eq!(widths.unpaired, Some(2.5));
        assert_eq!(widths.unit, LengthUnit::Microns);
    }

    #[test]
    fn test_no_gaps() {
        let widths = RegionWidths::from_gaps(&[], LengthUnit::Pixels);
        assert_eq!(widths.pairs(), 0);
        assert_eq!(widths.unpaired, None);
        assert!(widths.duty_cycle().is_empty());
    }

    #[test]
    fn test_paired_length_matches_minima_count() {
        for minima_count in 1..12usize {
            let gaps = vec![1.0; minima_count - 1];
            let widths = RegionWidths::from_gaps(&gaps, LengthUnit::Pixels);
            assert_eq!(widths.odd.len(), widths.even.len());
            assert_eq!(widths.odd.len(), (minima_count - 1) / 2);
        }
    }

    #[test]
    fn test_duty_cycle_strictly_inside_unit_interval() {
        let widths = RegionWidths::from_gaps(&[0.2, 9.0, 5.0, 5.0, 8.0, 0.1], LengthUnit::Pixels);
        for duty in widths.duty_cycle() {
            assert!(duty > 0.0 && duty < 1.0);
        }
        assert_relative_eq!(widths.duty_cycle()[1], 0.5);
    }

    #[test]
    fn test_metadata_annotations() {
        let meta = RecordMetadata::new("chip7.tif")
            .with_rotation(1.5)
            .with_annotation("Device", "WG-3")
            .with_annotation("Operator", "am");

        assert_eq!(meta.annotation("RUN#"), Some("LN3"));
        assert_eq!(meta.annotation("Device"), Some("WG-3"));
        assert_eq!(meta.annotation("Operator"), Some("am"));
        // defaults first, new keys appended
        assert_eq!(meta.annotations.len(), ANNOTATION_FIELDS.len() + 1);
        assert_eq!(meta.annotations[2].0, "Device");
    }
}
