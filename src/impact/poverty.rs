//! Poverty rates under both scenarios, for children and for everyone.
//!
//! The measures come from the configured catalog, so adding or dropping a
//! poverty definition never touches this code.

use tracing::info;

use crate::domain::{AnalysisConfig, FiscalYear, PovertyGroup, PovertyMeasure, PovertyRow, Variable};
use crate::engine::{ScenarioPair, Simulations};
use crate::error::AppError;
use crate::impact::relative_pct;
use crate::math::WeightedSeries;

fn rate_pct(indicator: &WeightedSeries) -> f64 {
    indicator.mean().unwrap_or(0.0) * 100.0
}

/// Children and All rows for one measure.
pub fn poverty_rows(
    year: FiscalYear,
    measure: PovertyMeasure,
    indicator: &ScenarioPair,
    is_child: &[bool],
) -> Result<Vec<PovertyRow>, AppError> {
    let mut rows = Vec::with_capacity(2);
    for group in [PovertyGroup::Children, PovertyGroup::All] {
        let (baseline_rate_pct, reform_rate_pct) = match group {
            PovertyGroup::Children => (
                rate_pct(&indicator.baseline.filter(is_child)?),
                rate_pct(&indicator.reform.filter(is_child)?),
            ),
            PovertyGroup::All => (rate_pct(&indicator.baseline), rate_pct(&indicator.reform)),
        };
        let change_pp = reform_rate_pct - baseline_rate_pct;
        rows.push(PovertyRow {
            year,
            measure,
            group,
            baseline_rate_pct,
            reform_rate_pct,
            change_pp,
            change_pct: relative_pct(change_pp, baseline_rate_pct),
        });
    }
    Ok(rows)
}

pub fn calculate_poverty_impact(
    sims: &Simulations,
    config: &AnalysisConfig,
) -> Result<Vec<PovertyRow>, AppError> {
    info!("Calculating poverty impact...");
    let mut rows = Vec::new();
    for &year in &config.years {
        let age = sims.baseline().calculate(Variable::Age, year)?;
        let is_child = age.mask(|a| a < config.child_age);

        for &measure in &config.poverty_measures {
            let indicator = sims.pair(measure.variable(), year)?;
            let measure_rows = poverty_rows(year, measure, &indicator, &is_child)?;
            if let Some(children) = measure_rows.first() {
                info!(
                    "  {year} {}: child rate {:.2}% -> {:.2}% ({:+.2}pp)",
                    measure.label(),
                    children.baseline_rate_pct,
                    children.reform_rate_pct,
                    children.change_pp
                );
            }
            rows.extend(measure_rows);
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(baseline: &[f64], reform: &[f64], weights: &[f64]) -> ScenarioPair {
        ScenarioPair::new(
            WeightedSeries::new(baseline.to_vec(), weights.to_vec()).unwrap(),
            WeightedSeries::new(reform.to_vec(), weights.to_vec()).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn child_and_overall_rates() {
        // four people: two children (first two), one child tips into poverty
        let pair = indicator(&[1.0, 0.0, 0.0, 1.0], &[1.0, 1.0, 0.0, 1.0], &[1.0; 4]);
        let is_child = [true, true, false, false];
        let rows = poverty_rows(FiscalYear(2029), PovertyMeasure::AbsoluteBhc, &pair, &is_child).unwrap();

        assert_eq!(rows.len(), 2);
        let children = &rows[0];
        assert_eq!(children.group, PovertyGroup::Children);
        assert!((children.baseline_rate_pct - 50.0).abs() < 1e-12);
        assert!((children.reform_rate_pct - 100.0).abs() < 1e-12);
        assert!((children.change_pp - 50.0).abs() < 1e-12);
        assert!((children.change_pct - 100.0).abs() < 1e-12);

        let all = &rows[1];
        assert_eq!(all.group, PovertyGroup::All);
        assert!((all.baseline_rate_pct - 50.0).abs() < 1e-12);
        assert!((all.reform_rate_pct - 75.0).abs() < 1e-12);
        assert!((all.change_pct - 50.0).abs() < 1e-12);
    }

    #[test]
    fn zero_baseline_rate_reports_zero_relative_change() {
        let pair = indicator(&[0.0, 0.0], &[1.0, 0.0], &[1.0, 1.0]);
        let rows = poverty_rows(FiscalYear(2029), PovertyMeasure::RelativeAhc, &pair, &[true, false]).unwrap();
        assert_eq!(rows[0].baseline_rate_pct, 0.0);
        assert!((rows[0].change_pp - 100.0).abs() < 1e-12);
        assert_eq!(rows[0].change_pct, 0.0);
    }

    #[test]
    fn no_children_gives_zero_rates_not_an_error() {
        let pair = indicator(&[1.0, 0.0], &[1.0, 0.0], &[1.0, 1.0]);
        let rows = poverty_rows(FiscalYear(2029), PovertyMeasure::DeepBhc, &pair, &[false, false]).unwrap();
        assert_eq!(rows[0].baseline_rate_pct, 0.0);
        assert_eq!(rows[0].reform_rate_pct, 0.0);
        assert_eq!(rows[1].change_pp, 0.0);
    }

    #[test]
    fn identical_scenarios_report_no_change_in_either_group() {
        let flags = [1.0, 0.0, 1.0, 0.0, 1.0];
        let pair = indicator(&flags, &flags, &[2.0, 1.0, 1.0, 3.0, 1.5]);
        let is_child = [true, true, false, false, true];
        let rows = poverty_rows(FiscalYear(2030), PovertyMeasure::RelativeBhc, &pair, &is_child).unwrap();

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert!(row.baseline_rate_pct > 0.0);
            assert_eq!(row.baseline_rate_pct, row.reform_rate_pct);
            assert_eq!(row.change_pp, 0.0);
            assert_eq!(row.change_pct, 0.0);
        }
    }

    #[test]
    fn child_mask_must_cover_every_person() {
        let pair = indicator(&[1.0, 0.0], &[1.0, 0.0], &[1.0, 1.0]);
        assert!(poverty_rows(FiscalYear(2029), PovertyMeasure::AbsoluteAhc, &pair, &[true]).is_err());
    }
}
