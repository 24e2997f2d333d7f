//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that
//! loads `.env`, sets up logging, parses the CLI and dispatches to the
//! analysis pipeline.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{AnalysisArgs, Command, RunArgs, SynthArgs};
use crate::domain::{AnalysisConfig, FiscalYear, ReferencePaths, ReformSpec, Scenario};
use crate::engine::synthetic::{self, SyntheticConfig};
use crate::engine::Simulations;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `tcl` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    // `tcl` and `tcl --years 2029` behave like `tcl synth ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Synth(args) => handle_synth(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.analysis)?;
    info!("Loading engine dumps from {}", args.data.display());
    let baseline = crate::io::load_scenario(&args.data, Scenario::Baseline, &config.years)?;
    let reform = crate::io::load_scenario(&args.data, Scenario::Reform, &config.years)?;
    let sims = Simulations::new(baseline, reform);

    execute(&sims, &config, None)
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.analysis)?;
    let reform = reform_from_args(&args)?;

    info!(
        "Generating synthetic population ({} households, seed {})",
        args.households, args.seed
    );
    let population = synthetic::generate_population(SyntheticConfig {
        households: args.households,
        seed: args.seed,
    })?;
    let baseline = synthetic::simulate(&population, Scenario::Baseline, &reform, &config.years)?;
    let reformed = synthetic::simulate(&population, Scenario::Reform, &reform, &config.years)?;
    let sims = Simulations::new(baseline, reformed);

    execute(&sims, &config, Some(reform))
}

fn execute(sims: &Simulations, config: &AnalysisConfig, reform: Option<ReformSpec>) -> Result<(), AppError> {
    let engine = sims.describe();
    println!(
        "{}",
        crate::report::format_run_header(config, &engine, reform.as_ref())
    );

    let tables = pipeline::run_analysis(sims, config)?;

    println!(
        "{}",
        crate::report::format_summary(&tables, config, reform.is_some())
    );
    if config.plot {
        if let Some(&year) = config.years.last() {
            println!(
                "{}",
                crate::plot::render_decile_bars(&tables.distributional, year, config.plot_width)
            );
        }
    }

    pipeline::write_outputs(&tables, config, engine, reform)?;
    Ok(())
}

pub fn config_from_args(args: &AnalysisArgs) -> Result<AnalysisConfig, AppError> {
    if args.years.is_empty() {
        return Err(AppError::config("At least one year is required."));
    }
    if args.poverty.is_empty() {
        return Err(AppError::config("At least one poverty measure is required."));
    }
    if !args.affected_threshold.is_finite() || args.affected_threshold < 0.0 {
        return Err(AppError::config(format!(
            "Invalid affected threshold: {}",
            args.affected_threshold
        )));
    }

    let mut years: Vec<FiscalYear> = args.years.iter().copied().map(FiscalYear).collect();
    years.sort();
    years.dedup();

    Ok(AnalysisConfig {
        years,
        output_dir: args.output.clone(),
        reference: ReferencePaths {
            constituencies: args.constituencies.clone(),
            weights: args.constituency_weights.clone(),
            weights_dataset: args.constituency_weights_dataset.clone(),
        },
        affected_threshold: args.affected_threshold,
        child_limit: args.child_limit,
        child_age: args.child_age,
        poverty_measures: args.poverty.clone(),
        decile_source: args.decile_source,
        top_n: args.top,
        plot: args.plot,
        plot_width: args.width,
    })
}

fn reform_from_args(args: &SynthArgs) -> Result<ReformSpec, AppError> {
    if args.reform_child_count == 0 {
        return Err(AppError::config("Reform child count must be >= 1."));
    }
    Ok(ReformSpec {
        child_count: args.reform_child_count,
        from_year: FiscalYear(args.reform_year),
        scottish_payment: args.scottish_payment,
    })
}

/// Rewrite argv so `tcl` defaults to `tcl synth`.
///
/// Rules:
/// - `tcl`                      -> `tcl synth`
/// - `tcl --years 2029 ...`     -> `tcl synth --years 2029 ...`
/// - `tcl --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("synth".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "synth");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "synth".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_synth() {
        assert_eq!(rewrite_args(argv(&["tcl"])), argv(&["tcl", "synth"]));
        assert_eq!(
            rewrite_args(argv(&["tcl", "--years", "2029"])),
            argv(&["tcl", "synth", "--years", "2029"])
        );
        assert_eq!(rewrite_args(argv(&["tcl", "--help"])), argv(&["tcl", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["tcl", "run", "--data", "d"])),
            argv(&["tcl", "run", "--data", "d"])
        );
    }

    #[test]
    fn config_sorts_and_dedups_years() {
        let cli = crate::cli::Cli::try_parse_from(["tcl", "synth", "--years", "2030,2029,2030"]).unwrap();
        let Command::Synth(args) = cli.command else {
            panic!("expected synth");
        };
        let config = config_from_args(&args.analysis).unwrap();
        assert_eq!(config.years, vec![FiscalYear(2029), FiscalYear(2030)]);
        assert_eq!(config.top_n, 20);
    }

    #[test]
    fn rejects_zero_child_count() {
        let cli = crate::cli::Cli::try_parse_from(["tcl", "synth", "--reform-child-count", "0"]).unwrap();
        let Command::Synth(args) = cli.command else {
            panic!("expected synth");
        };
        let err = reform_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
