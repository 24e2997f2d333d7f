//! Who is affected: households, people and children.
//!
//! A household is affected when its net income moves by more than the
//! configured threshold. Only children beyond the limit count as affected
//! children, since they are the ones losing entitlement.

use tracing::info;

use crate::domain::{AnalysisConfig, FiscalYear, HeadcountRow, Variable};
use crate::engine::{ScenarioPair, Simulations};
use crate::error::AppError;
use crate::impact::relative_pct;
use crate::math::WeightedSeries;

/// Household-level inputs for one year.
#[derive(Debug, Clone)]
pub struct HeadcountInputs {
    pub income: ScenarioPair,
    pub people: WeightedSeries,
    pub children: WeightedSeries,
}

pub fn headcount_row(
    year: FiscalYear,
    inputs: &HeadcountInputs,
    affected_threshold: f64,
    child_limit: u32,
) -> Result<HeadcountRow, AppError> {
    let change = inputs.income.change()?;
    let affected = change.mask(|c| c.abs() > affected_threshold);

    let total_households = change.count();
    let affected_households = change.filter(&affected)?.count();

    let total_people = inputs.people.sum();
    let affected_people = inputs.people.filter(&affected)?.sum();

    let total_children = inputs.children.sum();
    let limit = f64::from(child_limit);
    let extra_children = inputs.children.map(|n| (n - limit).max(0.0))?;
    let affected_children = extra_children.filter(&affected)?.sum();

    let avg_loss_per_affected_hh = change.filter(&affected)?.mean().unwrap_or(0.0);

    Ok(HeadcountRow {
        year,
        total_households,
        affected_households,
        total_people,
        affected_people,
        total_children,
        affected_children,
        pct_households_affected: relative_pct(affected_households, total_households),
        pct_people_affected: relative_pct(affected_people, total_people),
        pct_children_affected: relative_pct(affected_children, total_children),
        avg_loss_per_affected_hh,
    })
}

pub fn calculate_headcounts(
    sims: &Simulations,
    config: &AnalysisConfig,
) -> Result<Vec<HeadcountRow>, AppError> {
    info!("Calculating headcounts...");
    let mut rows = Vec::with_capacity(config.years.len());
    for &year in &config.years {
        let inputs = HeadcountInputs {
            income: sims.pair(Variable::HouseholdNetIncome, year)?,
            people: sims.baseline().calculate(Variable::HouseholdCountPeople, year)?,
            children: sims.baseline().calculate(Variable::NumChildren, year)?,
        };
        let row = headcount_row(year, &inputs, config.affected_threshold, config.child_limit)?;
        info!(
            "  {year}: {:.0} of {:.0} households affected ({:.1}%), {:.0} children beyond the limit, avg change {:.0}/yr",
            row.affected_households,
            row.total_households,
            row.pct_households_affected,
            row.affected_children,
            row.avg_loss_per_affected_hh,
        );
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(baseline: &[f64], reform: &[f64], people: &[f64], children: &[f64]) -> HeadcountInputs {
        let w = vec![1.0; baseline.len()];
        HeadcountInputs {
            income: ScenarioPair::new(
                WeightedSeries::new(baseline.to_vec(), w.clone()).unwrap(),
                WeightedSeries::new(reform.to_vec(), w.clone()).unwrap(),
            )
            .unwrap(),
            people: WeightedSeries::new(people.to_vec(), w.clone()).unwrap(),
            children: WeightedSeries::new(children.to_vec(), w).unwrap(),
        }
    }

    #[test]
    fn four_household_example() {
        let inputs = inputs(
            &[10.0, 20.0, 30.0, 40.0],
            &[10.0, 15.0, 30.0, 40.0],
            &[2.0, 5.0, 3.0, 1.0],
            &[0.0, 3.0, 1.0, 0.0],
        );
        let row = headcount_row(FiscalYear(2029), &inputs, 1.0, 2).unwrap();
        assert_eq!(row.affected_households, 1.0);
        assert_eq!(row.avg_loss_per_affected_hh, -5.0);
        assert_eq!(row.total_households, 4.0);
        assert_eq!(row.total_people, 11.0);
        assert_eq!(row.affected_people, 5.0);
        assert_eq!(row.total_children, 4.0);
        assert_eq!(row.affected_children, 1.0);
        assert!((row.pct_households_affected - 25.0).abs() < 1e-12);
        assert!((row.pct_children_affected - 25.0).abs() < 1e-12);
    }

    #[test]
    fn changes_within_threshold_are_not_affected() {
        let inputs = inputs(&[100.0, 100.0], &[99.5, 101.0], &[1.0, 1.0], &[0.0, 0.0]);
        let row = headcount_row(FiscalYear(2029), &inputs, 1.0, 2).unwrap();
        assert_eq!(row.affected_households, 0.0);
        assert_eq!(row.avg_loss_per_affected_hh, 0.0);
        assert_eq!(row.pct_children_affected, 0.0);
    }

    #[test]
    fn identical_scenarios_affect_nobody() {
        let inputs = inputs(&[5.0, 6.0, 7.0], &[5.0, 6.0, 7.0], &[1.0, 4.0, 2.0], &[0.0, 3.0, 1.0]);
        let row = headcount_row(FiscalYear(2030), &inputs, 1.0, 2).unwrap();
        assert_eq!(row.affected_households, 0.0);
        assert_eq!(row.affected_people, 0.0);
        assert_eq!(row.affected_children, 0.0);
        assert_eq!(row.pct_people_affected, 0.0);
    }
}
