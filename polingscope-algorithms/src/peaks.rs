//! Prominence-filtered peak and valley detection.
//!
//! Peaks are strict local maxima; a flat top counts once, at the middle of
//! the plateau (rounded down). The first and last samples are never peaks.
//! A peak's prominence is its height above the higher of the two lowest
//! points reached when walking outward until a strictly higher sample (or
//! the end of the data) is met.
#![allow(clippy::float_cmp)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A detected peak (or valley, for [`find_minima`]).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extremum {
    /// Sample index.
    pub index: usize,
    /// Vertical drop to the higher of the two bases.
    pub prominence: f64,
    /// Index of the lowest point on the left walk.
    pub left_base: usize,
    /// Index of the lowest point on the right walk.
    pub right_base: usize,
}

/// Indices of local maxima, with plateaus reduced to their midpoint.
#[must_use]
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if values.len() < 3 {
        return maxima;
    }
    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Prominence and bases of the peak at `peak`, or `None` if `peak` is not
/// an index of `values`.
#[must_use]
pub fn prominence(values: &[f64], peak: usize) -> Option<(f64, usize, usize)> {
    let height = *values.get(peak)?;

    let mut left_min = height;
    let mut left_base = peak;
    let mut i = peak;
    loop {
        if values[i] > height {
            break;
        }
        if values[i] < left_min {
            left_min = values[i];
            left_base = i;
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_min = height;
    let mut right_base = peak;
    for (j, &v) in values.iter().enumerate().skip(peak) {
        if v > height {
            break;
        }
        if v < right_min {
            right_min = v;
            right_base = j;
        }
    }

    Some((height - left_min.max(right_min), left_base, right_base))
}

/// Peaks whose prominence is at least `min_prominence`, in index order.
#[must_use]
pub fn find_peaks(values: &[f64], min_prominence: f64) -> Vec<Extremum> {
    local_maxima(values)
        .into_iter()
        .filter_map(|index| {
            let (prom, left_base, right_base) = prominence(values, index)?;
            (prom >= min_prominence).then_some(Extremum {
                index,
                prominence: prom,
                left_base,
                right_base,
            })
        })
        .collect()
}

/// Valleys whose depth is at least `min_prominence`, in index order.
///
/// Runs [`find_peaks`] on the negated sequence, so the reported prominence
/// is the valley depth below its lower flanking high point.
#[must_use]
pub fn find_minima(values: &[f64], min_prominence: f64) -> Vec<Extremum> {
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();
    let minima = find_peaks(&negated, min_prominence);
    log::debug!(
        "found {} minima (prominence >= {}) in {} samples",
        minima.len(),
        min_prominence,
        values.len()
    );
    minima
}

/// Index-only view of a detection result.
#[must_use]
pub fn indices(extrema: &[Extremum]) -> Vec<usize> {
    extrema.iter().map(|e| e.index).collect()
}
