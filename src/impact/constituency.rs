//! Constituency impact by reweighting national household results.
//!
//! Each constituency has its own weight for every household in the national
//! sample. The same baseline and reform income vectors are re-aggregated
//! under those weights to get per-constituency averages.

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::info;

use crate::domain::{AnalysisConfig, ConstituencyRow, FiscalYear, Variable};
use crate::engine::{ScenarioPair, Simulations};
use crate::error::AppError;
use crate::impact::relative_pct;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constituency {
    pub code: String,
    pub name: String,
}

/// Constituencies plus a `constituencies x households` weight matrix.
///
/// Loaded once per run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RegionWeights {
    regions: Vec<Constituency>,
    matrix: DMatrix<f64>,
}

impl RegionWeights {
    pub fn new(regions: Vec<Constituency>, matrix: DMatrix<f64>) -> Result<Self, AppError> {
        if regions.len() != matrix.nrows() {
            return Err(AppError::data(format!(
                "{} constituencies listed but the weight matrix has {} rows.",
                regions.len(),
                matrix.nrows()
            )));
        }
        if matrix.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AppError::data(
                "Constituency weights must be finite and non-negative.",
            ));
        }
        Ok(Self { regions, matrix })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[Constituency] {
        &self.regions
    }

    /// Number of households each weight row covers.
    pub fn n_households(&self) -> usize {
        self.matrix.ncols()
    }

    /// Household weights for the region at `idx`, read in place.
    pub fn region_weights(&self, idx: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.matrix.ncols()).map(move |j| self.matrix[(idx, j)])
    }
}

/// Per-household averages within one region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionImpact {
    pub avg_change: f64,
    pub avg_baseline: f64,
    pub relative_change_pct: f64,
}

/// Re-aggregate national baseline/reform values under one region's weights.
///
/// `weights` must yield one weight per household in `income`.
pub fn region_impact(income: &ScenarioPair, weights: impl IntoIterator<Item = f64>) -> RegionImpact {
    let mut count = 0.0;
    let mut baseline_total = 0.0;
    let mut reform_total = 0.0;
    for ((w, b), r) in weights
        .into_iter()
        .zip(income.baseline.values())
        .zip(income.reform.values())
    {
        count += w;
        baseline_total += w * b;
        reform_total += w * r;
    }

    if count == 0.0 {
        return RegionImpact {
            avg_change: 0.0,
            avg_baseline: 0.0,
            relative_change_pct: 0.0,
        };
    }
    let avg_change = (reform_total - baseline_total) / count;
    let avg_baseline = baseline_total / count;
    RegionImpact {
        avg_change,
        avg_baseline,
        relative_change_pct: relative_pct(avg_change, avg_baseline),
    }
}

/// One row per constituency, in reference-file order.
pub fn constituency_rows(
    year: FiscalYear,
    income: &ScenarioPair,
    regions: &RegionWeights,
) -> Result<Vec<ConstituencyRow>, AppError> {
    if regions.n_households() != income.baseline.len() {
        return Err(AppError::data(format!(
            "Constituency weights cover {} households but the engine returned {}.",
            regions.n_households(),
            income.baseline.len()
        )));
    }

    let rows = (0..regions.len())
        .into_par_iter()
        .map(|idx| {
            let impact = region_impact(income, regions.region_weights(idx));
            let region = &regions.regions[idx];
            ConstituencyRow {
                year,
                code: region.code.clone(),
                name: region.name.clone(),
                avg_change: impact.avg_change,
                relative_change_pct: impact.relative_change_pct,
            }
        })
        .collect::<Vec<_>>();

    Ok(rows)
}

pub fn calculate_constituency_impact(
    sims: &Simulations,
    config: &AnalysisConfig,
    regions: &RegionWeights,
) -> Result<Vec<ConstituencyRow>, AppError> {
    info!("Calculating constituency impacts ({} constituencies)...", regions.len());
    let mut rows = Vec::with_capacity(regions.len() * config.years.len());
    for &year in &config.years {
        let income = sims.pair(Variable::HouseholdNetIncome, year)?;
        rows.extend(constituency_rows(year, &income, regions)?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::WeightedSeries;

    fn income() -> ScenarioPair {
        let w = vec![1.0, 1.0, 1.0, 1.0];
        ScenarioPair::new(
            WeightedSeries::new(vec![10.0, 20.0, 30.0, 40.0], w.clone()).unwrap(),
            WeightedSeries::new(vec![10.0, 15.0, 30.0, 40.0], w).unwrap(),
        )
        .unwrap()
    }

    fn regions(rows: &[[f64; 4]]) -> RegionWeights {
        let data: Vec<f64> = rows.iter().flatten().copied().collect();
        let regions = (0..rows.len())
            .map(|i| Constituency {
                code: format!("E{i:08}"),
                name: format!("Seat {i}"),
            })
            .collect();
        RegionWeights::new(regions, DMatrix::from_row_slice(rows.len(), 4, &data)).unwrap()
    }

    #[test]
    fn uniform_rescale_of_national_weights_changes_nothing() {
        let income = income();
        let national = region_impact(&income, vec![1.0; 4]);
        for k in [0.5, 3.0, 250.0] {
            let scaled = region_impact(&income, vec![k; 4]);
            assert!((scaled.avg_change - national.avg_change).abs() < 1e-12);
            assert!((scaled.avg_baseline - national.avg_baseline).abs() < 1e-12);
        }
        assert!((national.avg_change + 1.25).abs() < 1e-12);
    }

    #[test]
    fn regions_only_see_their_households() {
        let r = regions(&[[0.0, 2.0, 0.0, 0.0], [1.0, 0.0, 1.0, 1.0], [0.0, 0.0, 0.0, 0.0]]);
        let rows = constituency_rows(FiscalYear(2029), &income(), &r).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].code, "E00000000");
        assert!((rows[0].avg_change + 5.0).abs() < 1e-12);
        assert!((rows[0].relative_change_pct + 25.0).abs() < 1e-12);
        assert_eq!(rows[1].avg_change, 0.0);
        // empty region reports zeros rather than dividing by zero
        assert_eq!(rows[2].avg_change, 0.0);
        assert_eq!(rows[2].relative_change_pct, 0.0);
    }

    #[test]
    fn region_rows_are_read_without_copying_the_matrix() {
        let r = regions(&[[1.0, 2.0, 3.0, 4.0], [0.5, 0.0, 0.0, 0.5]]);
        assert_eq!(r.region_weights(0).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(r.region_weights(1).collect::<Vec<_>>(), vec![0.5, 0.0, 0.0, 0.5]);

        // household 2 (weight 2) loses 5 over a total weight of 10
        let impact = region_impact(&income(), r.region_weights(0));
        assert!((impact.avg_change + 1.0).abs() < 1e-12);
        assert!((impact.avg_baseline - 30.0).abs() < 1e-12);
    }

    #[test]
    fn household_count_mismatch_is_a_data_error() {
        let regions = RegionWeights::new(
            vec![Constituency {
                code: "S1".into(),
                name: "Only".into(),
            }],
            DMatrix::from_row_slice(1, 2, &[1.0, 1.0]),
        )
        .unwrap();
        let err = constituency_rows(FiscalYear(2029), &income(), &regions).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn matrix_shape_must_match_region_list() {
        let err = RegionWeights::new(Vec::new(), DMatrix::from_row_slice(1, 1, &[1.0])).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
