//! Shared domain types.
//!
//! The aggregation code never touches raw engine variable names; it asks for a
//! `Variable` and the engine adapter maps that to whatever string key the
//! underlying catalog uses.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A fiscal year identified by its starting calendar year.
///
/// `FiscalYear(2029)` is the 2029-30 fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    pub fn start(self) -> i32 {
        self.0
    }

    /// Label used in every output table, e.g. `2029-30`.
    pub fn label(self) -> String {
        format!("{}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Aggregation level at which the engine reports a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityLevel {
    Household,
    Person,
}

impl EntityLevel {
    pub const ALL: [EntityLevel; 2] = [EntityLevel::Household, EntityLevel::Person];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityLevel::Household => "household",
            EntityLevel::Person => "person",
        }
    }
}

/// Which policy parameterization a set of engine outputs belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Current law (no two-child limit).
    Baseline,
    /// Two-child limit reintroduced.
    Reform,
}

impl Scenario {
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::Reform => "reform",
        }
    }
}

/// Engine output variables consumed by the impact analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    GovBalance,
    HouseholdNetIncome,
    EquivHouseholdNetIncome,
    HouseholdCountPeople,
    NumChildren,
    HouseholdIncomeDecile,
    Age,
    InPovertyBhc,
    InPovertyAhc,
    InRelativePovertyBhc,
    InRelativePovertyAhc,
    InDeepPovertyBhc,
    InDeepPovertyAhc,
}

impl Variable {
    pub const ALL: [Variable; 13] = [
        Variable::GovBalance,
        Variable::HouseholdNetIncome,
        Variable::EquivHouseholdNetIncome,
        Variable::HouseholdCountPeople,
        Variable::NumChildren,
        Variable::HouseholdIncomeDecile,
        Variable::Age,
        Variable::InPovertyBhc,
        Variable::InPovertyAhc,
        Variable::InRelativePovertyBhc,
        Variable::InRelativePovertyAhc,
        Variable::InDeepPovertyBhc,
        Variable::InDeepPovertyAhc,
    ];

    /// Name of the variable in the engine's catalog.
    pub fn name(self) -> &'static str {
        match self {
            Variable::GovBalance => "gov_balance",
            Variable::HouseholdNetIncome => "household_net_income",
            Variable::EquivHouseholdNetIncome => "equiv_household_net_income",
            Variable::HouseholdCountPeople => "household_count_people",
            Variable::NumChildren => "num_children",
            Variable::HouseholdIncomeDecile => "household_income_decile",
            Variable::Age => "age",
            Variable::InPovertyBhc => "in_poverty_bhc",
            Variable::InPovertyAhc => "in_poverty_ahc",
            Variable::InRelativePovertyBhc => "in_relative_poverty_bhc",
            Variable::InRelativePovertyAhc => "in_relative_poverty_ahc",
            Variable::InDeepPovertyBhc => "in_deep_poverty_bhc",
            Variable::InDeepPovertyAhc => "in_deep_poverty_ahc",
        }
    }

    /// Level at which the analyses request this variable.
    pub fn entity(self) -> EntityLevel {
        match self {
            Variable::Age
            | Variable::InPovertyBhc
            | Variable::InPovertyAhc
            | Variable::InRelativePovertyBhc
            | Variable::InRelativePovertyAhc
            | Variable::InDeepPovertyBhc
            | Variable::InDeepPovertyAhc => EntityLevel::Person,
            _ => EntityLevel::Household,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Poverty line definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PovertyKind {
    Absolute,
    Relative,
    Deep,
}

/// Income basis for poverty measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HousingCost {
    /// Before housing costs.
    Bhc,
    /// After housing costs.
    Ahc,
}

/// One entry in the poverty measure catalog (kind x housing-cost basis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PovertyMeasure {
    AbsoluteBhc,
    RelativeBhc,
    DeepBhc,
    AbsoluteAhc,
    RelativeAhc,
    DeepAhc,
}

impl PovertyMeasure {
    /// Catalog used when none is configured: absolute and relative, BHC then AHC.
    pub const DEFAULT_CATALOG: [PovertyMeasure; 4] = [
        PovertyMeasure::AbsoluteBhc,
        PovertyMeasure::RelativeBhc,
        PovertyMeasure::AbsoluteAhc,
        PovertyMeasure::RelativeAhc,
    ];

    pub const ALL: [PovertyMeasure; 6] = [
        PovertyMeasure::AbsoluteBhc,
        PovertyMeasure::RelativeBhc,
        PovertyMeasure::DeepBhc,
        PovertyMeasure::AbsoluteAhc,
        PovertyMeasure::RelativeAhc,
        PovertyMeasure::DeepAhc,
    ];

    pub fn kind(self) -> PovertyKind {
        match self {
            PovertyMeasure::AbsoluteBhc | PovertyMeasure::AbsoluteAhc => PovertyKind::Absolute,
            PovertyMeasure::RelativeBhc | PovertyMeasure::RelativeAhc => PovertyKind::Relative,
            PovertyMeasure::DeepBhc | PovertyMeasure::DeepAhc => PovertyKind::Deep,
        }
    }

    pub fn housing(self) -> HousingCost {
        match self {
            PovertyMeasure::AbsoluteBhc | PovertyMeasure::RelativeBhc | PovertyMeasure::DeepBhc => {
                HousingCost::Bhc
            }
            PovertyMeasure::AbsoluteAhc | PovertyMeasure::RelativeAhc | PovertyMeasure::DeepAhc => {
                HousingCost::Ahc
            }
        }
    }

    /// Person-level indicator variable backing this measure.
    pub fn variable(self) -> Variable {
        match self {
            PovertyMeasure::AbsoluteBhc => Variable::InPovertyBhc,
            PovertyMeasure::AbsoluteAhc => Variable::InPovertyAhc,
            PovertyMeasure::RelativeBhc => Variable::InRelativePovertyBhc,
            PovertyMeasure::RelativeAhc => Variable::InRelativePovertyAhc,
            PovertyMeasure::DeepBhc => Variable::InDeepPovertyBhc,
            PovertyMeasure::DeepAhc => Variable::InDeepPovertyAhc,
        }
    }

    /// Table label, e.g. `Absolute BHC`.
    pub fn label(self) -> String {
        let kind = match self.kind() {
            PovertyKind::Absolute => "Absolute",
            PovertyKind::Relative => "Relative",
            PovertyKind::Deep => "Deep",
        };
        let housing = match self.housing() {
            HousingCost::Bhc => "BHC",
            HousingCost::Ahc => "AHC",
        };
        format!("{kind} {housing}")
    }
}

/// Where income deciles come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DecileSource {
    /// Use the engine's `household_income_decile` variable from the baseline run.
    Engine,
    /// Rank households by baseline net income ourselves.
    Baseline,
}

/// Policy overrides that define the reform scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReformSpec {
    /// Maximum number of children attracting the UC child element / CTC.
    pub child_count: u32,
    /// First fiscal year in which the limit applies.
    pub from_year: FiscalYear,
    /// Whether the Scottish Two Child Limit Payment stays in effect.
    pub scottish_payment: bool,
}

impl Default for ReformSpec {
    fn default() -> Self {
        Self {
            child_count: 2,
            from_year: FiscalYear(2029),
            scottish_payment: false,
        }
    }
}

impl ReformSpec {
    pub fn applies_in(&self, year: FiscalYear) -> bool {
        year >= self.from_year
    }
}

/// Static reference data used by the constituency reweighting.
#[derive(Debug, Clone)]
pub struct ReferencePaths {
    /// `code,name` per constituency, in weight-matrix row order.
    pub constituencies: PathBuf,
    /// One row of household weights per constituency: an HDF5 file
    /// (`.h5`/`.hdf5`) or a header-less CSV matrix.
    pub weights: PathBuf,
    /// Dataset holding the matrix inside an HDF5 weights file.
    pub weights_dataset: String,
}

/// A full run's configuration as understood by the aggregators.
///
/// This is derived from CLI flags (plus environment and defaults) and passed
/// explicitly into every analysis.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub years: Vec<FiscalYear>,
    pub output_dir: PathBuf,
    pub reference: ReferencePaths,

    /// Absolute income change (currency units per year) above which a household is affected.
    pub affected_threshold: f64,
    /// Children beyond this count are the ones who lose entitlement.
    pub child_limit: u32,
    /// People younger than this are counted as children in poverty tables.
    pub child_age: f64,

    pub poverty_measures: Vec<PovertyMeasure>,
    pub decile_source: DecileSource,

    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            years: vec![FiscalYear(2029), FiscalYear(2030)],
            output_dir: PathBuf::from("public/data"),
            reference: ReferencePaths {
                constituencies: PathBuf::from("data_inputs/constituencies_2024.csv"),
                weights: PathBuf::from("data/parliamentary_constituency_weights.h5"),
                weights_dataset: "2025".to_string(),
            },
            affected_threshold: 1.0,
            child_limit: 2,
            child_age: 18.0,
            poverty_measures: PovertyMeasure::DEFAULT_CATALOG.to_vec(),
            decile_source: DecileSource::Engine,
            top_n: 20,
            plot: false,
            plot_width: 60,
        }
    }
}

/// Change in government balance for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetaryRow {
    pub year: FiscalYear,
    /// Reform minus baseline, in billions.
    pub impact_bn: f64,
}

/// Who is affected by the reform in one year.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadcountRow {
    pub year: FiscalYear,
    pub total_households: f64,
    pub affected_households: f64,
    pub total_people: f64,
    pub affected_people: f64,
    pub total_children: f64,
    /// Children beyond the limit living in affected households.
    pub affected_children: f64,
    pub pct_households_affected: f64,
    pub pct_people_affected: f64,
    pub pct_children_affected: f64,
    /// Weighted mean income change among affected households (negative = loss).
    pub avg_loss_per_affected_hh: f64,
}

/// Impact on one baseline income decile.
#[derive(Debug, Clone, PartialEq)]
pub struct DecileRow {
    pub year: FiscalYear,
    pub decile: u8,
    pub avg_change: f64,
    pub relative_change_pct: f64,
}

/// Subgroup used in the poverty table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PovertyGroup {
    Children,
    All,
}

impl PovertyGroup {
    pub fn label(self) -> &'static str {
        match self {
            PovertyGroup::Children => "Children",
            PovertyGroup::All => "All",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PovertyRow {
    pub year: FiscalYear,
    pub measure: PovertyMeasure,
    pub group: PovertyGroup,
    pub baseline_rate_pct: f64,
    pub reform_rate_pct: f64,
    pub change_pp: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InequalityRow {
    pub year: FiscalYear,
    pub baseline_gini: f64,
    pub reform_gini: f64,
    pub gini_change_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstituencyRow {
    pub year: FiscalYear,
    pub code: String,
    pub name: String,
    pub avg_change: f64,
    pub relative_change_pct: f64,
}

/// Every table produced by one run.
#[derive(Debug, Clone, Default)]
pub struct ImpactTables {
    pub budgetary: Vec<BudgetaryRow>,
    pub headcounts: Vec<HeadcountRow>,
    pub distributional: Vec<DecileRow>,
    pub poverty: Vec<PovertyRow>,
    pub inequality: Vec<InequalityRow>,
    /// `None` when the constituency reference data is unavailable.
    pub constituency: Option<Vec<ConstituencyRow>>,
}
