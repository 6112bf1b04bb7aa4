//! Scoring policy turning a hit deviation into points.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One step of the scoring curve: any deviation up to `below` earns `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Threshold {
    /// Inclusive upper bound of the deviation, in milliseconds.
    pub below: f64,
    /// Points awarded when the deviation falls under this bound.
    pub points: u32,
}

/// Scoring curve, always kept sorted ascending by [`Threshold::below`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    thresholds: Vec<Threshold>,
}

impl ThresholdTable {
    /// Build a table from arbitrary entries, sorting them by their upper bound.
    pub fn new(mut thresholds: Vec<Threshold>) -> Self {
        thresholds.sort_by(|a, b| a.below.total_cmp(&b.below));
        Self { thresholds }
    }

    /// Points for a deviation of `ms_off` milliseconds.
    ///
    /// The first threshold whose bound is at least `ms_off` wins; a deviation past the
    /// last bound (including infinity and NaN) scores nothing.
    pub fn score_for(&self, ms_off: f64) -> u32 {
        self.thresholds
            .iter()
            .find(|threshold| threshold.below >= ms_off)
            .map(|threshold| threshold.points)
            .unwrap_or(0)
    }

    /// Entries of the table in ascending order.
    pub fn thresholds(&self) -> &[Threshold] {
        &self.thresholds
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::new(
            [
                (300.0, 10),
                (600.0, 7),
                (1000.0, 5),
                (1500.0, 3),
                (2000.0, 2),
                (3000.0, 1),
            ]
            .into_iter()
            .map(|(below, points)| Threshold { below, points })
            .collect(),
        )
    }
}
