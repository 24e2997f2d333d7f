//! Income decile assignment.
//!
//! Units are ranked by a baseline value and split into ten buckets of equal
//! weight mass. Zero-weight units carry no population and get no decile.

use crate::math::series::{WeightedSeries, sorted_order};

pub const N_DECILES: u8 = 10;

/// Per-unit decile in `1..=10`, or `None` for units outside every bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecileAssignment {
    deciles: Vec<Option<u8>>,
}

impl DecileAssignment {
    /// Rank by the series values and bucket by cumulative weight.
    ///
    /// A unit falls in decile `floor(10 * W_before / W_total) + 1`, where
    /// `W_before` is the weight of all units ranked below it.
    pub fn from_ranking(series: &WeightedSeries) -> Self {
        let weights = series.weights();
        let total = series.count();
        let mut deciles = vec![None; series.len()];
        if total <= 0.0 {
            return Self { deciles };
        }

        let mut cum = 0.0;
        for idx in sorted_order(series.values()) {
            let w = weights[idx];
            if w <= 0.0 {
                continue;
            }
            let bucket = (f64::from(N_DECILES) * cum / total).floor() as i64 + 1;
            deciles[idx] = Some(bucket.clamp(1, i64::from(N_DECILES)) as u8);
            cum += w;
        }
        Self { deciles }
    }

    /// Use decile numbers already computed by the engine.
    ///
    /// Values outside `1..=10` (engines commonly emit 0 or -1 for excluded
    /// units) map to `None`.
    pub fn from_engine(values: &[f64]) -> Self {
        let deciles = values
            .iter()
            .map(|v| {
                let d = v.round();
                if (1.0..=f64::from(N_DECILES)).contains(&d) {
                    Some(d as u8)
                } else {
                    None
                }
            })
            .collect();
        Self { deciles }
    }

    pub fn len(&self) -> usize {
        self.deciles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deciles.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<u8> {
        self.deciles.get(idx).copied().flatten()
    }

    /// Mask selecting the units in `decile`.
    pub fn mask(&self, decile: u8) -> Vec<bool> {
        self.deciles.iter().map(|d| *d == Some(decile)).collect()
    }
}
