//! Intensity profiles and their extraction from a rotated image.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use crate::error::{Error, RegionError, Result};
use crate::units::CalibrationFactor;
use ndarray::{s, ArrayView2, Axis};

/// Half-open band of image rows `[start, end)` in true pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    /// Create a range without reordering. Use [`select_region`] for clicks.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of rows in the band.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the band holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build a row band from two picks made in either order.
#[must_use]
pub fn select_region(y1: usize, y2: usize) -> RowRange {
    RowRange::new(y1.min(y2), y1.max(y2))
}

/// Which rows feed a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelection {
    /// One image row.
    Single(usize),
    /// Column-wise mean over a band of rows.
    Range(RowRange),
}

impl RowSelection {
    /// Number of rows that will be averaged.
    #[must_use]
    pub fn rows_averaged(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Range(range) => range.len(),
        }
    }
}

/// Maps row coordinates picked on a scaled display back to image rows.
///
/// The display and source image generally differ in resolution, so every
/// display-space pick must pass through here before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayScale {
    display_height: u32,
    image_height: usize,
}

impl DisplayScale {
    /// Create a mapping for a display of `display_height` rows showing an
    /// image of `image_height` rows.
    ///
    /// # Errors
    /// Fails if either height is zero.
    pub fn new(display_height: u32, image_height: usize) -> Result<Self> {
        if display_height == 0 || image_height == 0 {
            return Err(RegionError::DegenerateDisplay {
                display_height,
                image_height,
            }
            .into());
        }
        Ok(Self {
            display_height,
            image_height,
        })
    }

    /// Truncating rescale of one display row.
    #[must_use]
    pub fn to_image_row(&self, y_display: u32) -> usize {
        let scaled =
            f64::from(y_display) / f64::from(self.display_height) * self.image_height as f64;
        scaled.floor() as usize
    }

    /// Rescale two display picks into a sorted image row band.
    #[must_use]
    pub fn to_image_range(&self, y1: u32, y2: u32) -> RowRange {
        select_region(self.to_image_row(y1), self.to_image_row(y2))
    }
}

/// Pixels dropped from each horizontal end of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeExclusion {
    pub start: usize,
    pub end: usize,
}

impl Default for EdgeExclusion {
    fn default() -> Self {
        Self { start: 20, end: 20 }
    }
}

impl EdgeExclusion {
    /// Create with explicit start/end counts.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Same count on both ends.
    #[must_use]
    pub fn symmetric(pixels: usize) -> Self {
        Self::new(pixels, pixels)
    }

    /// Column span `[start, width - end)` kept for an image `width` wide.
    ///
    /// # Errors
    /// Fails if the exclusion consumes the whole width.
    pub fn columns(&self, width: usize) -> Result<std::ops::Range<usize>> {
        if self.start.saturating_add(self.end) >= width {
            return Err(RegionError::ExclusionTooWide {
                start: self.start,
                end: self.end,
                width,
            }
            .into());
        }
        Ok(self.start..width - self.end)
    }
}

/// One-dimensional intensity samples indexed by pixel position.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityProfile {
    samples: Vec<f64>,
    rows_averaged: usize,
}

impl IntensityProfile {
    /// Wrap raw samples.
    ///
    /// # Errors
    /// Fails if `samples` is empty or `rows_averaged` is zero.
    pub fn new(samples: Vec<f64>, rows_averaged: usize) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::InvalidParameter {
                name: "profile_length",
                value: 0.0,
            });
        }
        if rows_averaged == 0 {
            return Err(Error::InvalidParameter {
                name: "rows_averaged",
                value: 0.0,
            });
        }
        Ok(Self {
            samples,
            rows_averaged,
        })
    }

    /// Intensity samples.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Number of samples (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of image rows averaged into each sample.
    #[must_use]
    pub fn rows_averaged(&self) -> usize {
        self.rows_averaged
    }

    /// Horizontal axis for plotting: pixel index, or microns when calibrated.
    #[must_use]
    pub fn positions(&self, calibration: Option<CalibrationFactor>) -> Vec<f64> {
        (0..self.samples.len())
            .map(|i| {
                let px = i as f64;
                calibration.map_or(px, |factor| factor.to_microns(px))
            })
            .collect()
    }
}

/// Turns a rotated image into an [`IntensityProfile`].
///
/// Works in true image pixel coordinates only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileExtractor {
    exclusion: EdgeExclusion,
}

impl ProfileExtractor {
    /// Create an extractor dropping `exclusion` pixels at each end.
    #[must_use]
    pub fn new(exclusion: EdgeExclusion) -> Self {
        Self { exclusion }
    }

    /// Current edge exclusion.
    #[must_use]
    pub fn exclusion(&self) -> EdgeExclusion {
        self.exclusion
    }

    /// Extract a single row or the column-wise mean of a row band.
    ///
    /// # Errors
    /// Returns [`Error::EmptyImage`] for an image without pixels and
    /// [`Error::InvalidRegionSelection`] when the rows are out of bounds, the
    /// band is empty, or the exclusion leaves no columns.
    pub fn extract(
        &self,
        image: ArrayView2<'_, f64>,
        selection: RowSelection,
    ) -> Result<IntensityProfile> {
        let (height, width) = image.dim();
        if height == 0 || width == 0 {
            return Err(Error::EmptyImage {
                rows: height,
                cols: width,
            });
        }
        let cols = self.exclusion.columns(width)?;

        let samples = match selection {
            RowSelection::Single(row) => {
                if row >= height {
                    return Err(RegionError::RowOutOfBounds { row, height }.into());
                }
                image.slice(s![row, cols]).to_vec()
            }
            RowSelection::Range(range) => {
                if range.is_empty() {
                    return Err(RegionError::EmptyRowRange {
                        start: range.start,
                        end: range.end,
                    }
                    .into());
                }
                if range.end > height {
                    return Err(RegionError::RowOutOfBounds {
                        row: range.end - 1,
                        height,
                    }
                    .into());
                }
                image
                    .slice(s![range.start..range.end, cols])
                    .mean_axis(Axis(0))
                    .map(|mean| mean.to_vec())
                    .ok_or(RegionError::EmptyRowRange {
                        start: range.start,
                        end: range.end,
                    })?
            }
        };

        log::debug!(
            "extracted profile: {} samples from {:?} (exclusion {}+{})",
            samples.len(),
            selection,
            self.exclusion.start,
            self.exclusion.end
        );
        IntensityProfile::new(samples, selection.rows_averaged())
    }
}
