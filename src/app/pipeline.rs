//! Shared analysis pipeline used by both the `run` and `synth` commands.
//!
//! Engine choice is the only difference between the two; everything from the
//! paired engine outputs to the written tables goes through here.

use std::path::PathBuf;

use tracing::info;

use crate::domain::{AnalysisConfig, ImpactTables, ReformSpec};
use crate::engine::Simulations;
use crate::error::AppError;
use crate::impact::{
    calculate_budgetary_impact, calculate_constituency_impact, calculate_distributional_impact,
    calculate_headcounts, calculate_inequality_impact, calculate_poverty_impact,
};
use crate::io::{MANIFEST_FILE, RunManifest, load_region_weights, write_manifest, write_tables};

/// Run every analysis for every configured year.
///
/// The constituency table is `None` when reference data is not available.
pub fn run_analysis(sims: &Simulations, config: &AnalysisConfig) -> Result<ImpactTables, AppError> {
    info!("Running analyses for {} year(s)", config.years.len());

    let budgetary = calculate_budgetary_impact(sims, config)?;
    let headcounts = calculate_headcounts(sims, config)?;
    let distributional = calculate_distributional_impact(sims, config)?;
    let poverty = calculate_poverty_impact(sims, config)?;
    let inequality = calculate_inequality_impact(sims, config)?;

    let constituency = match load_region_weights(&config.reference)? {
        Some(regions) => Some(calculate_constituency_impact(sims, config, &regions)?),
        None => None,
    };

    Ok(ImpactTables {
        budgetary,
        headcounts,
        distributional,
        poverty,
        inequality,
        constituency,
    })
}

/// Write every table plus the run manifest; returns the written paths.
pub fn write_outputs(
    tables: &ImpactTables,
    config: &AnalysisConfig,
    engine: String,
    reform: Option<ReformSpec>,
) -> Result<Vec<PathBuf>, AppError> {
    let mut written = write_tables(&config.output_dir, tables)?;

    let manifest = RunManifest::new(config, engine, reform, &written);
    let manifest_path = config.output_dir.join(MANIFEST_FILE);
    write_manifest(&manifest_path, &manifest)?;
    written.push(manifest_path);

    info!("Results saved to {}/", config.output_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityLevel, FiscalYear, PovertyGroup, PovertyMeasure, ReferencePaths, Scenario};
    use crate::engine::synthetic::{SyntheticConfig, generate_population, simulate};
    use crate::engine::{TableEngine, VariableTable};
    use crate::io::read_manifest;

    const YEAR: FiscalYear = FiscalYear(2029);

    /// Four households; only the second (three children on UC) loses 2,000.
    fn engine(scenario: Scenario) -> TableEngine {
        let reform = scenario == Scenario::Reform;

        let mut hh = VariableTable::new(vec![1.0; 4]);
        let income = if reform {
            vec![10_000.0, 18_000.0, 30_000.0, 40_000.0]
        } else {
            vec![10_000.0, 20_000.0, 30_000.0, 40_000.0]
        };
        let equiv: Vec<f64> = income.iter().zip([1.0, 2.0, 1.0, 1.5]).map(|(y, s)| y / s).collect();
        let gov = if reform {
            vec![0.0, 2_000.0, 0.0, 0.0]
        } else {
            vec![0.0; 4]
        };
        hh.insert("household_net_income", income).unwrap();
        hh.insert("equiv_household_net_income", equiv).unwrap();
        hh.insert("gov_balance", gov).unwrap();
        hh.insert("household_count_people", vec![2.0, 5.0, 1.0, 2.0]).unwrap();
        hh.insert("num_children", vec![0.0, 3.0, 0.0, 0.0]).unwrap();
        hh.insert("household_income_decile", vec![1.0, 4.0, 7.0, 10.0]).unwrap();

        // Persons grouped by household: 2, 5, 1, 2.
        let mut person = VariableTable::new(vec![1.0; 10]);
        let ages = vec![40.0, 38.0, 35.0, 33.0, 10.0, 7.0, 3.0, 70.0, 50.0, 48.0];
        let in_poverty: Vec<f64> = (0..10)
            .map(|i| if reform && (2..7).contains(&i) { 1.0 } else { 0.0 })
            .collect();
        person.insert("age", ages).unwrap();
        for measure in PovertyMeasure::DEFAULT_CATALOG {
            person.insert(measure.variable().name(), in_poverty.clone()).unwrap();
        }

        let mut engine = TableEngine::new(format!("fixture {}", scenario.as_str()));
        engine.insert_table(YEAR, EntityLevel::Household, hh);
        engine.insert_table(YEAR, EntityLevel::Person, person);
        engine
    }

    fn config(dir: &std::path::Path) -> AnalysisConfig {
        AnalysisConfig {
            years: vec![YEAR],
            output_dir: dir.join("out"),
            reference: ReferencePaths {
                constituencies: dir.join("missing_constituencies.csv"),
                weights: dir.join("missing_weights.csv"),
                weights_dataset: "2025".to_string(),
            },
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn fixture_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let sims = Simulations::new(engine(Scenario::Baseline), engine(Scenario::Reform));

        let tables = run_analysis(&sims, &config).unwrap();

        assert_eq!(tables.budgetary.len(), 1);
        assert!((tables.budgetary[0].impact_bn - 2e-6).abs() < 1e-12);

        let hc = &tables.headcounts[0];
        assert_eq!(hc.affected_households, 1.0);
        assert_eq!(hc.affected_people, 5.0);
        assert_eq!(hc.affected_children, 1.0);
        assert!((hc.avg_loss_per_affected_hh + 2_000.0).abs() < 1e-9);

        let d4 = tables.distributional.iter().find(|r| r.decile == 4).unwrap();
        assert!((d4.avg_change + 2_000.0).abs() < 1e-9);
        assert!((d4.relative_change_pct + 10.0).abs() < 1e-9);
        assert!(tables.distributional.iter().filter(|r| r.decile != 4).all(|r| r.avg_change == 0.0));

        // Four measures, two groups each.
        assert_eq!(tables.poverty.len(), 8);
        let child = tables
            .poverty
            .iter()
            .find(|r| r.measure == PovertyMeasure::AbsoluteBhc && r.group == PovertyGroup::Children)
            .unwrap();
        assert_eq!(child.baseline_rate_pct, 0.0);
        assert!((child.reform_rate_pct - 100.0).abs() < 1e-9);

        assert!(tables.inequality[0].gini_change_pct > 0.0);
        assert!(tables.constituency.is_none());

        let written = write_outputs(&tables, &config, sims.describe(), None).unwrap();
        assert_eq!(written.len(), 6);
        assert!(written.iter().all(|p| p.exists()));

        let manifest = read_manifest(&config.output_dir.join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.years, vec!["2029-30".to_string()]);
        assert_eq!(manifest.files.len(), 5);
    }

    #[test]
    fn identical_scenarios_report_zero_change_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let sims = Simulations::new(engine(Scenario::Baseline), engine(Scenario::Baseline));

        let tables = run_analysis(&sims, &config).unwrap();

        assert!(tables.budgetary.iter().all(|r| r.impact_bn == 0.0));
        let hc = &tables.headcounts[0];
        assert_eq!(hc.affected_households, 0.0);
        assert_eq!(hc.affected_people, 0.0);
        assert_eq!(hc.affected_children, 0.0);
        assert_eq!(hc.avg_loss_per_affected_hh, 0.0);
        assert!(!tables.distributional.is_empty());
        assert!(
            tables
                .distributional
                .iter()
                .all(|r| r.avg_change == 0.0 && r.relative_change_pct == 0.0)
        );
        assert!(tables.poverty.iter().all(|r| r.change_pp == 0.0 && r.change_pct == 0.0));
        assert!(tables.inequality.iter().all(|r| r.gini_change_pct == 0.0));
    }

    #[test]
    fn synthetic_end_to_end_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let reform = ReformSpec::default();

        let run = || {
            let population = generate_population(SyntheticConfig {
                households: 300,
                seed: 7,
            })
            .unwrap();
            let baseline = simulate(&population, Scenario::Baseline, &reform, &config.years).unwrap();
            let reformed = simulate(&population, Scenario::Reform, &reform, &config.years).unwrap();
            run_analysis(&Simulations::new(baseline, reformed), &config).unwrap()
        };

        let a = run();
        let b = run();
        assert_eq!(a.budgetary, b.budgetary);
        assert_eq!(a.distributional, b.distributional);

        // The limit saves money and never raises anyone's income.
        assert!(a.budgetary[0].impact_bn >= 0.0);
        assert!(a.distributional.iter().all(|r| r.avg_change <= 1e-9));
    }
}
