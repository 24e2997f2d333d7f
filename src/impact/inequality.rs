//! Inequality impact: Gini of equivalised household income, person-weighted.

use tracing::info;

use crate::domain::{AnalysisConfig, FiscalYear, InequalityRow, Variable};
use crate::engine::{ScenarioPair, Simulations};
use crate::error::AppError;
use crate::math::WeightedSeries;

/// Gini under both scenarios with household weights scaled by household size.
pub fn inequality_row(
    year: FiscalYear,
    equiv_income: &ScenarioPair,
    household_size: &WeightedSeries,
) -> Result<InequalityRow, AppError> {
    let sizes = household_size.values();
    let baseline_gini = equiv_income.baseline.scale_weights(sizes)?.gini();
    let reform_gini = equiv_income.reform.scale_weights(sizes)?.gini();

    let gini_change_pct = if baseline_gini > 0.0 {
        (reform_gini - baseline_gini) / baseline_gini * 100.0
    } else {
        0.0
    };

    Ok(InequalityRow {
        year,
        baseline_gini,
        reform_gini,
        gini_change_pct,
    })
}

pub fn calculate_inequality_impact(
    sims: &Simulations,
    config: &AnalysisConfig,
) -> Result<Vec<InequalityRow>, AppError> {
    info!("Calculating inequality impact...");
    let mut rows = Vec::with_capacity(config.years.len());
    for &year in &config.years {
        let equiv = sims.pair(Variable::EquivHouseholdNetIncome, year)?;
        let size = sims.baseline().calculate(Variable::HouseholdCountPeople, year)?;
        let row = inequality_row(year, &equiv, &size)?;
        info!("  {year}: Gini change {:+.2}%", row.gini_change_pct);
        rows.push(row);
    }
    Ok(rows)
}
