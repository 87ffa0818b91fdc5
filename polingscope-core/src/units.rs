//! Length units and the pixel-to-micron calibration factor.

use crate::error::{Error, Result};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unit in which region widths are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LengthUnit {
    /// Raw pixel distances (uncalibrated).
    #[default]
    Pixels,
    /// Physical distances after calibration.
    Microns,
}

impl LengthUnit {
    /// Short label used in tables and axis titles.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Pixels => "px",
            Self::Microns => "um",
        }
    }

    /// Parse the label written by [`LengthUnit::symbol`].
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "px" => Some(Self::Pixels),
            "um" => Some(Self::Microns),
            _ => None,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels => write!(f, "pixels"),
            Self::Microns => write!(f, "microns"),
        }
    }
}

/// Conversion ratio from pixel distance to microns.
///
/// Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
pub struct CalibrationFactor(f64);

impl CalibrationFactor {
    /// Create a factor in microns per pixel.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] unless `microns_per_pixel` is
    /// positive and finite.
    pub fn new(microns_per_pixel: f64) -> Result<Self> {
        if microns_per_pixel.is_finite() && microns_per_pixel > 0.0 {
            Ok(Self(microns_per_pixel))
        } else {
            Err(Error::InvalidParameter {
                name: "calibration_factor",
                value: microns_per_pixel,
            })
        }
    }

    /// Microns per pixel.
    #[must_use]
    pub fn microns_per_pixel(self) -> f64 {
        self.0
    }

    /// Convert a pixel distance into microns.
    #[inline]
    #[must_use]
    pub fn to_microns(self, pixels: f64) -> f64 {
        pixels * self.0
    }

    /// Convert a micron distance back into pixels.
    #[inline]
    #[must_use]
    pub fn to_pixels(self, microns: f64) -> f64 {
        microns / self.0
    }
}

impl TryFrom<f64> for CalibrationFactor {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CalibrationFactor> for f64 {
    fn from(factor: CalibrationFactor) -> Self {
        factor.0
    }
}

impl fmt::Display for CalibrationFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} microns/pixel", self.0)
    }
}

/// Unit implied by an optional calibration.
#[must_use]
pub fn unit_for(calibration: Option<CalibrationFactor>) -> LengthUnit {
    if calibration.is_some() {
        LengthUnit::Microns
    } else {
        LengthUnit::Pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_non_positive_factor() {
        assert!(CalibrationFactor::new(0.0).is_err());
        assert!(CalibrationFactor::new(-0.14).is_err());
        assert!(CalibrationFactor::new(f64::NAN).is_err());
        assert!(CalibrationFactor::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_unit_round_trip() {
        let factor = CalibrationFactor::new(0.14).unwrap();
        for px in [1.0, 7.0, 19.5, 300.0] {
            assert_relative_eq!(factor.to_pixels(factor.to_microns(px)), px, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_unit_symbols() {
        assert_eq!(unit_for(None), LengthUnit::Pixels);
        assert_eq!(
            unit_for(Some(CalibrationFactor::new(1.0).unwrap())),
            LengthUnit::Microns
        );
        assert_eq!(LengthUnit::from_symbol("um"), Some(LengthUnit::Microns));
        assert_eq!(LengthUnit::from_symbol(LengthUnit::Pixels.symbol()), Some(LengthUnit::Pixels));
        assert_eq!(LengthUnit::from_symbol("mm"), None);
    }
}
