//! Budgetary impact: change in the government balance.

use tracing::info;

use crate::domain::{AnalysisConfig, BudgetaryRow, FiscalYear, Variable};
use crate::engine::{ScenarioPair, Simulations};
use crate::error::AppError;

const BILLION: f64 = 1e9;

/// Reform minus baseline weighted total, in billions.
pub fn budgetary_row(year: FiscalYear, gov_balance: &ScenarioPair) -> BudgetaryRow {
    BudgetaryRow {
        year,
        impact_bn: (gov_balance.reform.sum() - gov_balance.baseline.sum()) / BILLION,
    }
}

pub fn calculate_budgetary_impact(
    sims: &Simulations,
    config: &AnalysisConfig,
) -> Result<Vec<BudgetaryRow>, AppError> {
    info!("Calculating budgetary impact...");
    let mut rows = Vec::with_capacity(config.years.len());
    for &year in &config.years {
        let pair = sims.pair(Variable::GovBalance, year)?;
        let row = budgetary_row(year, &pair);
        info!("  {year}: {:+.2}bn", row.impact_bn);
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::WeightedSeries;

    #[test]
    fn impact_is_weighted_difference_in_billions() {
        let weights = vec![1_000.0, 2_000.0];
        let pair = ScenarioPair::new(
            WeightedSeries::new(vec![-1_000_000.0, 500_000.0], weights.clone()).unwrap(),
            WeightedSeries::new(vec![-999_000.0, 501_500.0], weights).unwrap(),
        )
        .unwrap();
        // 1_000 * 1_000 + 2_000 * 1_500 = 4_000_000
        let row = budgetary_row(FiscalYear(2029), &pair);
        assert!((row.impact_bn - 0.004).abs() < 1e-12);
    }

    #[test]
    fn identical_scenarios_cost_nothing() {
        let s = WeightedSeries::new(vec![3.0e6, -2.0e6], vec![10.0, 20.0]).unwrap();
        let pair = ScenarioPair::new(s.clone(), s).unwrap();
        assert_eq!(budgetary_row(FiscalYear(2030), &pair).impact_bn, 0.0);
    }
}
