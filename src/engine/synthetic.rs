//! Synthetic household population with simplified tax-benefit rules.
//!
//! This is a stand-in for the real engine, good enough to exercise every
//! analysis end to end: households have earnings, children and housing
//! costs; some claim Universal Credit, whose child element is capped by the
//! two-child limit when the reform applies. It is not a model of the UK
//! tax-benefit system.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::LogNormal;
use tracing::debug;

use crate::domain::{EntityLevel, FiscalYear, HousingCost, PovertyKind, PovertyMeasure, ReformSpec, Scenario, Variable};
use crate::engine::{TableEngine, VariableTable};
use crate::error::AppError;
use crate::math::{DecileAssignment, WeightedSeries};

/// Price base of the rule constants below.
const PRICE_BASE_YEAR: i32 = 2025;
/// Nominal uprating per year applied to earnings, housing costs and thresholds.
const UPRATING: f64 = 0.03;

const PERSONAL_ALLOWANCE: f64 = 12_570.0;
const BASIC_RATE: f64 = 0.20;

const UC_STANDARD_SINGLE: f64 = 4_800.0;
const UC_STANDARD_COUPLE: f64 = 7_500.0;
const UC_CHILD_ELEMENT: f64 = 3_500.0;
const UC_WORK_ALLOWANCE: f64 = 8_000.0;
const UC_TAPER: f64 = 0.55;
const UC_TAKE_UP: f64 = 0.85;

/// Equivalised absolute poverty lines (BHC, AHC).
const ABSOLUTE_LINE_BHC: f64 = 17_000.0;
const ABSOLUTE_LINE_AHC: f64 = 14_000.0;
const RELATIVE_LINE_SHARE: f64 = 0.6;
const DEEP_LINE_SHARE: f64 = 0.5;

/// Number of children per household: 0..=5.
const CHILD_COUNT_WEIGHTS: [u32; 6] = [55, 18, 16, 7, 3, 1];

#[derive(Debug, Clone, Copy)]
pub struct SyntheticConfig {
    pub households: usize,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct Household {
    pub weight: f64,
    pub adult_ages: Vec<f64>,
    pub child_ages: Vec<f64>,
    /// Annual gross earnings in base-year prices.
    pub earnings: f64,
    /// Annual housing costs in base-year prices.
    pub housing_cost: f64,
    pub claims_uc: bool,
    pub in_scotland: bool,
}

impl Household {
    pub fn size(&self) -> usize {
        self.adult_ages.len() + self.child_ages.len()
    }

    /// Modified OECD scale normalised to a childless couple.
    fn equivalence_scale(&self) -> f64 {
        let older_children = self.child_ages.iter().filter(|a| **a >= 14.0).count();
        let young_children = self.child_ages.len() - older_children;
        let extra_adults = self.adult_ages.len().saturating_sub(1) + older_children;
        0.67 + 0.33 * extra_adults as f64 + 0.2 * young_children as f64
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    pub households: Vec<Household>,
}

/// Draw a reproducible population.
pub fn generate_population(config: SyntheticConfig) -> Result<Population, AppError> {
    if config.households == 0 {
        return Err(AppError::config("Synthetic household count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let earnings_dist = LogNormal::new(28_000f64.ln(), 0.7)
        .map_err(|e| AppError::data(format!("Earnings distribution error: {e}")))?;
    let children_dist = WeightedIndex::new(CHILD_COUNT_WEIGHTS)
        .map_err(|e| AppError::data(format!("Child count distribution error: {e}")))?;

    let mut households = Vec::with_capacity(config.households);
    for _ in 0..config.households {
        let n_adults: u32 = if rng.gen_bool(0.55) { 2 } else { 1 };
        let adult_ages = (0..n_adults).map(|_| f64::from(rng.gen_range(20u32..75))).collect();

        let n_children = children_dist.sample(&mut rng);
        let child_ages = (0..n_children).map(|_| f64::from(rng.gen_range(0u32..18))).collect();

        let mut earnings = 0.0;
        for _ in 0..n_adults {
            if rng.gen_bool(0.8) {
                earnings += earnings_dist.sample(&mut rng);
            }
        }

        let housing_cost = rng.gen_range(4_000.0..14_000.0) * (0.7 + 0.3 * f64::from(n_adults));

        households.push(Household {
            weight: rng.gen_range(800.0..1_600.0),
            adult_ages,
            child_ages,
            earnings,
            housing_cost,
            claims_uc: rng.gen_bool(UC_TAKE_UP),
            in_scotland: rng.gen_bool(0.085),
        });
    }

    debug!(households = households.len(), seed = config.seed, "generated synthetic population");
    Ok(Population { households })
}

/// Benefit rules in force for one scenario and year.
#[derive(Debug, Clone, Copy)]
struct Policy {
    child_limit: Option<u32>,
    scottish_payment: bool,
}

impl Policy {
    fn for_scenario(scenario: Scenario, reform: &ReformSpec, year: FiscalYear) -> Self {
        match scenario {
            Scenario::Baseline => Policy {
                child_limit: None,
                scottish_payment: false,
            },
            Scenario::Reform if reform.applies_in(year) => Policy {
                child_limit: Some(reform.child_count),
                scottish_payment: reform.scottish_payment,
            },
            Scenario::Reform => Policy {
                child_limit: None,
                scottish_payment: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct HouseholdOutcome {
    net_income: f64,
    gov_balance: f64,
    equiv_bhc: f64,
    equiv_ahc: f64,
}

fn evaluate(hh: &Household, policy: Policy, uprate: f64) -> HouseholdOutcome {
    let earnings = hh.earnings * uprate;
    let tax = BASIC_RATE * (earnings - PERSONAL_ALLOWANCE * uprate).max(0.0);

    let n_children = hh.child_ages.len() as u32;
    let eligible = policy.child_limit.map_or(n_children, |limit| n_children.min(limit));
    let excluded = n_children - eligible;

    let mut uc = 0.0;
    let mut scottish_payment = 0.0;
    if hh.claims_uc {
        let standard = if hh.adult_ages.len() > 1 {
            UC_STANDARD_COUPLE
        } else {
            UC_STANDARD_SINGLE
        };
        let work_allowance = if n_children > 0 { UC_WORK_ALLOWANCE } else { 0.0 };
        let maximum = (standard + f64::from(eligible) * UC_CHILD_ELEMENT) * uprate;
        let reduction = UC_TAPER * (earnings - work_allowance * uprate).max(0.0);
        uc = (maximum - reduction).max(0.0);

        if uc > 0.0 && policy.scottish_payment && hh.in_scotland {
            scottish_payment = f64::from(excluded) * UC_CHILD_ELEMENT * uprate;
        }
    }

    let net_income = earnings - tax + uc + scottish_payment;
    let scale = hh.equivalence_scale();
    HouseholdOutcome {
        net_income,
        gov_balance: tax - uc - scottish_payment,
        equiv_bhc: net_income / scale,
        equiv_ahc: (net_income - hh.housing_cost * uprate) / scale,
    }
}

/// Run the rules for `scenario` over `years` and materialize the outputs.
pub fn simulate(
    population: &Population,
    scenario: Scenario,
    reform: &ReformSpec,
    years: &[FiscalYear],
) -> Result<TableEngine, AppError> {
    let mut engine = TableEngine::new(format!(
        "synthetic {} ({} households)",
        scenario.as_str(),
        population.households.len()
    ));

    for &year in years {
        let uprate = (1.0 + UPRATING).powi(year.start() - PRICE_BASE_YEAR);
        let policy = Policy::for_scenario(scenario, reform, year);
        let outcomes: Vec<HouseholdOutcome> = population
            .households
            .iter()
            .map(|hh| evaluate(hh, policy, uprate))
            .collect();

        let (household, person) = build_tables(population, &outcomes, uprate)?;
        engine.insert_table(year, EntityLevel::Household, household);
        engine.insert_table(year, EntityLevel::Person, person);
    }

    Ok(engine)
}

fn build_tables(
    population: &Population,
    outcomes: &[HouseholdOutcome],
    uprate: f64,
) -> Result<(VariableTable, VariableTable), AppError> {
    let hh = &population.households;
    let weights: Vec<f64> = hh.iter().map(|h| h.weight).collect();
    let sizes: Vec<f64> = hh.iter().map(|h| h.size() as f64).collect();

    // Person-weighted distributions of equivalised income drive deciles and relative lines.
    let bhc = WeightedSeries::new(outcomes.iter().map(|o| o.equiv_bhc).collect(), weights.clone())?
        .scale_weights(&sizes)?;
    let ahc = WeightedSeries::new(outcomes.iter().map(|o| o.equiv_ahc).collect(), weights.clone())?
        .scale_weights(&sizes)?;
    let median_bhc = bhc.quantile(0.5).unwrap_or(0.0);
    let median_ahc = ahc.quantile(0.5).unwrap_or(0.0);
    let deciles = DecileAssignment::from_ranking(&bhc);

    let mut household = VariableTable::new(weights);
    household.insert(
        Variable::HouseholdNetIncome.name(),
        outcomes.iter().map(|o| o.net_income).collect(),
    )?;
    household.insert(
        Variable::GovBalance.name(),
        outcomes.iter().map(|o| o.gov_balance).collect(),
    )?;
    household.insert(
        Variable::EquivHouseholdNetIncome.name(),
        outcomes.iter().map(|o| o.equiv_bhc).collect(),
    )?;
    household.insert(Variable::HouseholdCountPeople.name(), sizes)?;
    household.insert(
        Variable::NumChildren.name(),
        hh.iter().map(|h| h.child_ages.len() as f64).collect(),
    )?;
    household.insert(
        Variable::HouseholdIncomeDecile.name(),
        (0..hh.len())
            .map(|i| deciles.get(i).map_or(0.0, f64::from))
            .collect(),
    )?;

    let line = |measure: PovertyMeasure| -> f64 {
        let (absolute, median) = match measure.housing() {
            HousingCost::Bhc => (ABSOLUTE_LINE_BHC * uprate, median_bhc),
            HousingCost::Ahc => (ABSOLUTE_LINE_AHC * uprate, median_ahc),
        };
        match measure.kind() {
            PovertyKind::Absolute => absolute,
            PovertyKind::Relative => RELATIVE_LINE_SHARE * median,
            PovertyKind::Deep => DEEP_LINE_SHARE * absolute,
        }
    };
    let lines: Vec<(PovertyMeasure, f64)> = PovertyMeasure::ALL.iter().map(|m| (*m, line(*m))).collect();

    let mut person_weights = Vec::new();
    let mut ages = Vec::new();
    let mut flags: Vec<Vec<f64>> = vec![Vec::new(); lines.len()];
    for (h, o) in hh.iter().zip(outcomes) {
        for age in h.adult_ages.iter().chain(&h.child_ages) {
            person_weights.push(h.weight);
            ages.push(*age);
            for (k, (measure, threshold)) in lines.iter().enumerate() {
                let income = match measure.housing() {
                    HousingCost::Bhc => o.equiv_bhc,
                    HousingCost::Ahc => o.equiv_ahc,
                };
                flags[k].push(if income < *threshold { 1.0 } else { 0.0 });
            }
        }
    }

    let mut person = VariableTable::new(person_weights);
    person.insert(Variable::Age.name(), ages)?;
    for ((measure, _), column) in lines.iter().zip(flags) {
        person.insert(measure.variable().name(), column)?;
    }

    Ok((household, person))
}
