//! Domain width and duty cycle measurement.
#![allow(clippy::cast_precision_loss)]

use crate::peaks::{find_minima, indices};
use polingscope_core::{
    unit_for, CalibrationFactor, Error, IntensityProfile, RecordMetadata, RegionWidths,
    ResultsRecord, Result, SummaryStats,
};

/// Default minima prominence threshold, in raw intensity units.
pub const DEFAULT_PROMINENCE: f64 = 10.0;

/// Measures alternating poled domains along an intensity profile.
#[derive(Debug, Clone, Copy)]
pub struct PolingAnalyzer {
    prominence: f64,
}

impl Default for PolingAnalyzer {
    fn default() -> Self {
        Self {
            prominence: DEFAULT_PROMINENCE,
        }
    }
}

impl PolingAnalyzer {
    /// Create an analyzer with the given minima threshold.
    ///
    /// # Errors
    /// Fails unless `prominence` is positive and finite.
    pub fn new(prominence: f64) -> Result<Self> {
        if !(prominence.is_finite() && prominence > 0.0) {
            return Err(Error::InvalidParameter {
                name: "prominence",
                value: prominence,
            });
        }
        Ok(Self { prominence })
    }

    /// Minima threshold in use.
    #[must_use]
    pub fn prominence(&self) -> f64 {
        self.prominence
    }

    /// Analyze one profile.
    ///
    /// Widths are in microns when `calibration` is present, pixels otherwise.
    /// A record is always produced; statistics that cannot be formed from
    /// the detected minima are left as `None`.
    #[must_use]
    pub fn analyze(
        &self,
        profile: &IntensityProfile,
        calibration: Option<CalibrationFactor>,
        metadata: RecordMetadata,
    ) -> ResultsRecord {
        let minima = indices(&find_minima(profile.samples(), self.prominence));

        let gaps: Vec<f64> = minima
            .windows(2)
            .map(|pair| {
                let px = (pair[1] - pair[0]) as f64;
                calibration.map_or(px, |factor| factor.to_microns(px))
            })
            .collect();
        let widths = RegionWidths::from_gaps(&gaps, unit_for(calibration));

        // With a single gap there are no pairs; its width still gets stats.
        let odd_stats = if widths.odd.is_empty() {
            widths
                .unpaired
                .and_then(|w| SummaryStats::from_values(&[w]))
        } else {
            SummaryStats::from_values(&widths.odd)
        };
        let even_stats = SummaryStats::from_values(&widths.even);

        let duty_cycle = widths.duty_cycle();
        let duty_cycle_stats = SummaryStats::from_values(&duty_cycle);
        if duty_cycle_stats.is_none() {
            log::warn!(
                "insufficient minima for duty cycle: found {} (need 3) at prominence {}",
                minima.len(),
                self.prominence
            );
        }

        log::debug!(
            "analysis of {}: {} minima, {} pairs, unit {}",
            metadata.image_id,
            minima.len(),
            widths.pairs(),
            widths.unit
        );

        ResultsRecord {
            metadata,
            calibration_factor: calibration,
            prominence: self.prominence,
            rows_averaged: profile.rows_averaged(),
            minima,
            widths,
            odd_stats,
            even_stats,
            duty_cycle,
            duty_cycle_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use approx::assert_relative_eq;
    use polingscope_core::LengthUnit;

    fn profile(samples: &[f64]) -> IntensityProfile {
        IntensityProfile::new(samples.to_vec(), 1).unwrap()
    }

    fn meta() -> RecordMetadata {
        RecordMetadata::new("test.tif")
    }

    #[test]
    fn test_alternating_profile() {
        let p = profile(&[10.0, 2.0, 10.0, 2.0, 10.0, 2.0, 10.0, 2.0, 10.0]);
        let record = PolingAnalyzer::new(1.0).unwrap().analyze(&p, None, meta());

        assert_eq!(record.minima, vec![1, 3, 5, 7]);
        assert_eq!(record.widths.odd, vec![2.0]);
        assert_eq!(record.widths.even, vec![2.0]);
        assert_eq!(record.widths.unpaired, Some(2.0));
        assert_eq!(record.duty_cycle, vec![0.5]);
        assert_eq!(record.unit(), LengthUnit::Pixels);
    }

    #[test]
    fn test_calibrated_widths_in_microns() {
        // dips at 0+1, 4, 10, 13, 19 -> gaps 3, 6, 3, 6
        let mut samples = vec![50.0; 22];
        for i in [1, 4, 10, 13, 19] {
            samples[i] = 0.0;
        }
        let factor = CalibrationFactor::new(0.5).unwrap();
        let record = PolingAnalyzer::default().analyze(&profile(&samples), Some(factor), meta());

        assert_eq!(record.unit(), LengthUnit::Microns);
        assert_eq!(record.widths.odd, vec![1.5, 1.5]);
        assert_eq!(record.widths.even, vec![3.0, 3.0]);
        assert_eq!(record.widths.unpaired, None);

        let duty = record.duty_cycle_stats.unwrap();
        assert_relative_eq!(duty.mean, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(duty.std, 0.0);

        // dividing by the factor recovers the pixel widths
        let px: Vec<f64> = record.widths.even.iter().map(|&w| factor.to_pixels(w)).collect();
        assert_eq!(px, vec![6.0, 6.0]);
    }

    #[test]
    fn test_two_minima_gives_single_odd_width() {
        let p = profile(&[40.0, 5.0, 40.0, 40.0, 40.0, 5.0, 40.0]);
        let record = PolingAnalyzer::default().analyze(&p, None, meta());

        assert_eq!(record.minima, vec![1, 5]);
        assert!(record.widths.odd.is_empty());
        assert!(record.widths.even.is_empty());
        let odd = record.odd_stats.unwrap();
        assert_eq!(odd.mean, 4.0);
        assert_eq!(odd.std, 0.0);
        assert_eq!(odd.count, 1);
        assert!(record.even_stats.is_none());
        assert!(!record.has_duty_cycle());
        assert!(record.duty_cycle.is_empty());
    }

    #[test]
    fn test_no_minima_still_produces_record() {
        let p = profile(&[1.0, 2.0, 3.0, 4.0]);
        let record = PolingAnalyzer::default().analyze(&p, None, meta());
        assert!(record.minima.is_empty());
        assert!(record.odd_stats.is_none());
        assert!(record.even_stats.is_none());
        assert!(record.duty_cycle_stats.is_none());
    }

    #[test]
    fn test_record_carries_context() {
        let p = IntensityProfile::new(vec![10.0, 0.0, 10.0, 0.0, 10.0, 0.0, 10.0], 12).unwrap();
        let analyzer = PolingAnalyzer::new(3.0).unwrap();
        let record = analyzer.analyze(&p, None, meta().with_rotation(-0.7));
        assert_eq!(record.rows_averaged, 12);
        assert_eq!(record.prominence, 3.0);
        assert_eq!(record.metadata.rotation_angle, -0.7);
        assert_eq!(record.metadata.image_id, "test.tif");
        assert!(record.calibration_factor.is_none());
    }
}
