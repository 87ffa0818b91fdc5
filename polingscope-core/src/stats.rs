//! Summary statistics over width and duty-cycle series.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mean and population standard deviation of a non-empty series.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SummaryStats {
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

impl SummaryStats {
    /// Compute statistics, or `None` for an empty series.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std: variance.sqrt(),
            count: values.len(),
        })
    }
}
