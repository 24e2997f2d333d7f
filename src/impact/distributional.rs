//! Distributional impact by baseline income decile.

use tracing::info;

use crate::domain::{AnalysisConfig, DecileRow, DecileSource, FiscalYear, Variable};
use crate::engine::{ScenarioPair, Simulations};
use crate::error::AppError;
use crate::impact::relative_pct;
use crate::math::{DecileAssignment, N_DECILES};

/// Mean change and relative change for each populated decile.
///
/// Both scenarios are bucketed with the same baseline-derived assignment.
/// Deciles with no units or zero total weight are left out.
pub fn decile_rows(
    year: FiscalYear,
    income: &ScenarioPair,
    deciles: &DecileAssignment,
) -> Result<Vec<DecileRow>, AppError> {
    if deciles.len() != income.baseline.len() {
        return Err(AppError::data(format!(
            "Decile assignment covers {} units but income has {}.",
            deciles.len(),
            income.baseline.len()
        )));
    }

    let change = income.change()?;
    let mut rows = Vec::with_capacity(usize::from(N_DECILES));
    for decile in 1..=N_DECILES {
        let mask = deciles.mask(decile);
        let (Some(avg_change), Some(avg_baseline)) = (
            change.filter(&mask)?.mean(),
            income.baseline.filter(&mask)?.mean(),
        ) else {
            continue;
        };
        rows.push(DecileRow {
            year,
            decile,
            avg_change,
            relative_change_pct: relative_pct(avg_change, avg_baseline),
        });
    }
    Ok(rows)
}

fn resolve_deciles(
    sims: &Simulations,
    year: FiscalYear,
    income: &ScenarioPair,
    source: DecileSource,
) -> Result<DecileAssignment, AppError> {
    match source {
        DecileSource::Engine => {
            let engine_deciles = sims.baseline().calculate(Variable::HouseholdIncomeDecile, year)?;
            Ok(DecileAssignment::from_engine(engine_deciles.values()))
        }
        DecileSource::Baseline => Ok(DecileAssignment::from_ranking(&income.baseline)),
    }
}

pub fn calculate_distributional_impact(
    sims: &Simulations,
    config: &AnalysisConfig,
) -> Result<Vec<DecileRow>, AppError> {
    info!("Calculating distributional impact...");
    let mut rows = Vec::new();
    for &year in &config.years {
        let income = sims.pair(Variable::HouseholdNetIncome, year)?;
        let deciles = resolve_deciles(sims, year, &income, config.decile_source)?;
        rows.extend(decile_rows(year, &income, &deciles)?);
    }
    Ok(rows)
}
