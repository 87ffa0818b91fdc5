//! Pixel-to-micron calibration from a region of known period.
#![allow(clippy::cast_precision_loss)]

use crate::peaks::{find_minima, Extremum};
use polingscope_core::{CalibrationFactor, Error, IntensityProfile, Result};

/// Default nominal electrode period in microns.
pub const DEFAULT_NOMINAL_PERIOD: f64 = 2.8;

/// Outcome of a successful calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    /// Derived microns per pixel.
    pub factor: CalibrationFactor,
    /// Minima detected in the calibration profile.
    pub minima: Vec<Extremum>,
    /// Number of gaps between the minima.
    pub num_periods: usize,
    /// Distance in pixels between the first and last minimum.
    pub pixel_span: usize,
    /// Period the factor was derived from, in microns.
    pub nominal_period: f64,
}

/// Derives a [`CalibrationFactor`] from a profile with known period.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationEngine {
    prominence: f64,
}

impl CalibrationEngine {
    /// Create an engine using `prominence` as the minima threshold.
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

    /// Calibrate against `nominal_period` microns per modulation period.
    ///
    /// Every gap between consecutive minima counts as one period, so the
    /// factor is `nominal_period * (n - 1) / (last - first)`.
    ///
    /// # Errors
    /// Returns [`Error::InsufficientMinimaForCalibration`] when fewer than two
    /// minima are found and [`Error::InvalidParameter`] for a non-positive
    /// period.
    pub fn calibrate(
        &self,
        profile: &IntensityProfile,
        nominal_period: f64,
    ) -> Result<Calibration> {
        if !(nominal_period.is_finite() && nominal_period > 0.0) {
            return Err(Error::InvalidParameter {
                name: "nominal_period",
                value: nominal_period,
            });
        }

        let minima = find_minima(profile.samples(), self.prominence);
        let (first, last) = match (minima.first(), minima.last()) {
            (Some(first), Some(last)) if minima.len() >= 2 => (first.index, last.index),
            _ => {
                log::warn!(
                    "insufficient periods for calibration: {} minima at prominence {}",
                    minima.len(),
                    self.prominence
                );
                return Err(Error::InsufficientMinimaForCalibration {
                    found: minima.len(),
                    prominence: self.prominence,
                });
            }
        };

        let num_periods = minima.len() - 1;
        let pixel_span = last - first;
        let factor =
            CalibrationFactor::new(nominal_period * num_periods as f64 / pixel_span as f64)?;
        log::info!("calibration: {num_periods} periods over {pixel_span} px -> {factor}");

        Ok(Calibration {
            factor,
            minima,
            num_periods,
            pixel_span,
            nominal_period,
        })
    }
}

/// One-shot calibration with an ad-hoc engine.
///
/// # Errors
/// See [`CalibrationEngine::new`] and [`CalibrationEngine::calibrate`].
pub fn calibrate(
    profile: &IntensityProfile,
    nominal_period: f64,
    prominence: f64,
) -> Result<Calibration> {
    CalibrationEngine::new(prominence)?.calibrate(profile, nominal_period)
}
