//! In-memory engine backed by per-year, per-level variable tables.

use std::collections::HashMap;

use crate::domain::{EntityLevel, FiscalYear, Variable};
use crate::engine::Microsimulation;
use crate::error::AppError;
use crate::math::WeightedSeries;

/// Columns of engine output sharing one weight vector.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    weights: Vec<f64>,
    columns: HashMap<String, Vec<f64>>,
}

impl VariableTable {
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            weights,
            columns: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), AppError> {
        let name = name.into();
        if values.len() != self.weights.len() {
            return Err(AppError::data(format!(
                "Column `{name}` has {} rows but the table has {} weights.",
                values.len(),
                self.weights.len()
            )));
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}

/// A `Microsimulation` whose outputs are already materialized.
#[derive(Debug, Clone)]
pub struct TableEngine {
    label: String,
    tables: HashMap<(FiscalYear, EntityLevel), VariableTable>,
}

impl TableEngine {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tables: HashMap::new(),
        }
    }

    pub fn insert_table(&mut self, year: FiscalYear, level: EntityLevel, table: VariableTable) {
        self.tables.insert((year, level), table);
    }

    pub fn table(&self, year: FiscalYear, level: EntityLevel) -> Option<&VariableTable> {
        self.tables.get(&(year, level))
    }
}

impl Microsimulation for TableEngine {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn compute(
        &self,
        variable: Variable,
        year: FiscalYear,
        level: EntityLevel,
    ) -> Result<WeightedSeries, AppError> {
        let table = self.table(year, level).ok_or_else(|| {
            AppError::config(format!(
                "{}: no {}-level output for {year}.",
                self.label,
                level.as_str()
            ))
        })?;
        let values = table.column(variable.name()).ok_or_else(|| {
            AppError::config(format!(
                "{}: unknown variable `{}` at {} level for {year}.",
                self.label,
                variable.name(),
                level.as_str()
            ))
        })?;
        WeightedSeries::new(values.to_vec(), table.weights().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> TableEngine {
        let mut table = VariableTable::new(vec![1.0, 2.0]);
        table.insert("household_net_income", vec![100.0, 200.0]).unwrap();
        let mut engine = TableEngine::new("test");
        engine.insert_table(FiscalYear(2029), EntityLevel::Household, table);
        engine
    }

    #[test]
    fn computes_known_variable() {
        let s = engine()
            .calculate(Variable::HouseholdNetIncome, FiscalYear(2029))
            .unwrap();
        assert_eq!(s.values(), &[100.0, 200.0]);
        assert_eq!(s.weights(), &[1.0, 2.0]);
    }

    #[test]
    fn unknown_variable_is_a_configuration_error() {
        let err = engine()
            .calculate(Variable::GovBalance, FiscalYear(2029))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("gov_balance"));
    }

    #[test]
    fn missing_year_is_a_configuration_error() {
        let err = engine()
            .calculate(Variable::HouseholdNetIncome, FiscalYear(2031))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn insert_rejects_length_mismatch() {
        let mut table = VariableTable::new(vec![1.0, 1.0]);
        assert!(table.insert("age", vec![30.0]).is_err());
    }
}
