//! The microsimulation engine seam.
//!
//! The tax-benefit engine itself is external. Everything in this crate talks
//! to it through `Microsimulation`, which hands back a weighted vector for a
//! typed `Variable` in a given year at a given aggregation level.
//!
//! Two concrete sources feed a `TableEngine`:
//! - precomputed CSV dumps (`io::dump`)
//! - a seeded synthetic population (`engine::synthetic`)

use crate::domain::{EntityLevel, FiscalYear, Variable};
use crate::error::AppError;
use crate::math::WeightedSeries;

pub mod synthetic;
pub mod table;

pub use table::{TableEngine, VariableTable};

pub trait Microsimulation {
    /// Short human-readable description (for logs and the run manifest).
    fn describe(&self) -> String;

    /// Values and weights of `variable` for `year`, aggregated to `level`.
    fn compute(
        &self,
        variable: Variable,
        year: FiscalYear,
        level: EntityLevel,
    ) -> Result<WeightedSeries, AppError>;

    /// `compute` at the level the analyses use for this variable.
    fn calculate(&self, variable: Variable, year: FiscalYear) -> Result<WeightedSeries, AppError> {
        self.compute(variable, year, variable.entity())
    }
}

/// One output variable observed under both scenarios for the same units.
#[derive(Debug, Clone)]
pub struct ScenarioPair {
    pub baseline: WeightedSeries,
    pub reform: WeightedSeries,
}

impl ScenarioPair {
    pub fn new(baseline: WeightedSeries, reform: WeightedSeries) -> Result<Self, AppError> {
        if baseline.weights() != reform.weights() {
            return Err(AppError::data(
                "Baseline and reform outputs do not share the same units/weights.",
            ));
        }
        Ok(Self { baseline, reform })
    }

    /// Reform minus baseline, per unit.
    pub fn change(&self) -> Result<WeightedSeries, AppError> {
        self.reform.subtract(&self.baseline)
    }
}

/// The two engine runs every analysis compares.
pub struct Simulations {
    baseline: Box<dyn Microsimulation>,
    reform: Box<dyn Microsimulation>,
}

impl Simulations {
    pub fn new(baseline: impl Microsimulation + 'static, reform: impl Microsimulation + 'static) -> Self {
        Self {
            baseline: Box::new(baseline),
            reform: Box::new(reform),
        }
    }

    pub fn baseline(&self) -> &dyn Microsimulation {
        self.baseline.as_ref()
    }

    /// Fetch `variable` from both runs.
    pub fn pair(&self, variable: Variable, year: FiscalYear) -> Result<ScenarioPair, AppError> {
        ScenarioPair::new(
            self.baseline.calculate(variable, year)?,
            self.reform.calculate(variable, year)?,
        )
    }

    pub fn describe(&self) -> String {
        format!(
            "baseline: {} | reform: {}",
            self.baseline.describe(),
            self.reform.describe()
        )
    }
}
