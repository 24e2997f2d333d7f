//! Weighted Gini coefficient.
//!
//! Values are floored at zero, sorted ascending (ties keep input order), and
//! the coefficient is read off the weighted cumulative distribution:
//!
//! ```text
//! G = Σ_{i>0} (X_i W_{i-1} - X_{i-1} W_i) / (X_n W_n)
//! ```
//!
//! where `W_i` is the cumulative weight and `X_i` the cumulative weighted value
//! up to and including the i-th sorted unit.

use crate::math::series::sorted_order;

/// Weighted Gini of `values` (negative values count as zero).
///
/// Returns 0 for empty input or when total weighted income is zero.
pub fn weighted_gini(values: &[f64], weights: &[f64]) -> f64 {
    let floored: Vec<f64> = values.iter().map(|v| v.max(0.0)).collect();
    let order = sorted_order(&floored);

    let mut cum_w = 0.0;
    let mut cum_xw = 0.0;
    let mut numerator = 0.0;

    for (rank, idx) in order.iter().enumerate() {
        let w = weights.get(*idx).copied().unwrap_or(0.0);
        let x = floored[*idx];
        let prev_w = cum_w;
        let prev_xw = cum_xw;
        cum_w += w;
        cum_xw += x * w;
        if rank > 0 {
            numerator += cum_xw * prev_w - prev_xw * cum_w;
        }
    }

    let denominator = cum_xw * cum_w;
    if denominator <= 0.0 {
        return 0.0;
    }
    numerator / denominator
}
