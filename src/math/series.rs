//! Weighted value vectors.
//!
//! A `WeightedSeries` pairs each unit's value with its survey weight. Two
//! series can only be combined elementwise when they carry the exact same
//! weights, i.e. they describe the same units observed under two scenarios.

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSeries {
    values: Vec<f64>,
    weights: Vec<f64>,
}

impl WeightedSeries {
    /// Build a series, validating lengths and weights.
    ///
    /// Values and weights must be finite and weights must be non-negative.
    pub fn new(values: Vec<f64>, weights: Vec<f64>) -> Result<Self, AppError> {
        if values.len() != weights.len() {
            return Err(AppError::data(format!(
                "Series length mismatch: {} values vs {} weights.",
                values.len(),
                weights.len()
            )));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(AppError::data(format!("Non-finite value at index {i}.")));
        }
        if let Some(i) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(AppError::data(format!(
                "Invalid weight at index {i} (must be finite and >= 0)."
            )));
        }
        Ok(Self { values, weights })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Weighted total `Σ v_i w_i`.
    pub fn sum(&self) -> f64 {
        self.values.iter().zip(&self.weights).map(|(v, w)| v * w).sum()
    }

    /// Weighted count `Σ w_i`.
    pub fn count(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Weighted mean, or `None` when the total weight is zero.
    pub fn mean(&self) -> Option<f64> {
        let count = self.count();
        if count == 0.0 {
            return None;
        }
        Some(self.sum() / count)
    }

    /// Keep only the units where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Result<Self, AppError> {
        if mask.len() != self.len() {
            return Err(AppError::data(format!(
                "Mask length {} does not match series length {}.",
                mask.len(),
                self.len()
            )));
        }
        let (values, weights) = self
            .values
            .iter()
            .zip(&self.weights)
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|((v, w), _)| (*v, *w))
            .unzip();
        Ok(Self { values, weights })
    }

    /// Elementwise `self - other` over the same units.
    pub fn subtract(&self, other: &WeightedSeries) -> Result<Self, AppError> {
        if self.weights != other.weights {
            return Err(AppError::data(
                "Cannot subtract series with different weights (not the same units).",
            ));
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a - b)
            .collect();
        Ok(Self {
            values,
            weights: self.weights.clone(),
        })
    }

    /// Apply `f` to every value, keeping the weights.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Result<Self, AppError> {
        Self::new(self.values.iter().map(|v| f(*v)).collect(), self.weights.clone())
    }

    /// Multiply each weight by the matching factor (e.g. household size).
    pub fn scale_weights(&self, factors: &[f64]) -> Result<Self, AppError> {
        if factors.len() != self.len() {
            return Err(AppError::data(format!(
                "Weight factor length {} does not match series length {}.",
                factors.len(),
                self.len()
            )));
        }
        let weights = self.weights.iter().zip(factors).map(|(w, f)| w * f).collect();
        Self::new(self.values.clone(), weights)
    }

    /// Boolean mask from a predicate on values.
    pub fn mask(&self, predicate: impl Fn(f64) -> bool) -> Vec<bool> {
        self.values.iter().map(|v| predicate(*v)).collect()
    }

    /// Weighted Gini coefficient of the values floored at zero.
    pub fn gini(&self) -> f64 {
        crate::math::gini::weighted_gini(&self.values, &self.weights)
    }

    /// Smallest value whose cumulative weight reaches `q` of the total.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        let total = self.count();
        if total <= 0.0 || !(0.0..=1.0).contains(&q) {
            return None;
        }
        let order = sorted_order(&self.values);
        let target = q * total;
        let mut cum = 0.0;
        for idx in &order {
            cum += self.weights[*idx];
            if cum >= target && self.weights[*idx] > 0.0 {
                return Some(self.values[*idx]);
            }
        }
        order.last().map(|idx| self.values[*idx])
    }
}

/// Indices sorted by ascending value; ties keep their original order.
pub fn sorted_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));
    order
}
