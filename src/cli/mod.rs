//! Command-line parsing for the two-child limit impact analysis.
//!
//! Every analysis flag can also come from a `TCL_*` environment variable (a
//! `.env` file in the working directory is loaded first).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DecileSource, PovertyMeasure};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "tcl",
    version,
    about = "Distributional impact of reintroducing the two-child benefit limit"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyse precomputed baseline/reform engine dumps.
    Run(RunArgs),
    /// Simulate a synthetic population under both scenarios and analyse it.
    Synth(SynthArgs),
}

/// Options shared by every analysis run.
#[derive(Debug, Args, Clone)]
pub struct AnalysisArgs {
    /// Fiscal years to analyse, by starting calendar year (e.g. 2029,2030).
    #[arg(long, env = "TCL_YEARS", value_delimiter = ',', default_values_t = [2029, 2030])]
    pub years: Vec<i32>,

    /// Directory that receives the output CSV tables.
    #[arg(short = 'o', long, env = "TCL_OUTPUT", default_value = "public/data")]
    pub output: PathBuf,

    /// Constituency list (`code,name`), in weight-matrix row order.
    #[arg(long, env = "TCL_CONSTITUENCIES", default_value = "data_inputs/constituencies_2024.csv")]
    pub constituencies: PathBuf,

    /// Constituency household weight matrix (`.h5`, or header-less CSV).
    #[arg(
        long,
        env = "TCL_CONSTITUENCY_WEIGHTS",
        default_value = "data/parliamentary_constituency_weights.h5"
    )]
    pub constituency_weights: PathBuf,

    /// Dataset name inside an HDF5 weights file.
    #[arg(long, env = "TCL_CONSTITUENCY_WEIGHTS_DATASET", default_value = "2025")]
    pub constituency_weights_dataset: String,

    /// Minimum absolute income change for a household to count as affected.
    #[arg(long, env = "TCL_AFFECTED_THRESHOLD", default_value_t = 1.0)]
    pub affected_threshold: f64,

    /// Number of children still covered under the limit.
    #[arg(long, env = "TCL_CHILD_LIMIT", default_value_t = 2)]
    pub child_limit: u32,

    /// People younger than this count as children in poverty tables.
    #[arg(long, env = "TCL_CHILD_AGE", default_value_t = 18.0)]
    pub child_age: f64,

    /// Poverty measures to report (repeat or comma-separate).
    #[arg(
        long = "poverty",
        env = "TCL_POVERTY",
        value_enum,
        value_delimiter = ',',
        default_values_t = PovertyMeasure::DEFAULT_CATALOG.to_vec()
    )]
    pub poverty: Vec<PovertyMeasure>,

    /// Where income deciles come from.
    #[arg(long, env = "TCL_DECILE_SOURCE", value_enum, default_value_t = DecileSource::Engine)]
    pub decile_source: DecileSource,

    /// Show top-N hardest-hit and least-affected constituencies.
    #[arg(long, env = "TCL_TOP", default_value_t = 20)]
    pub top: usize,

    /// Render an ASCII decile chart in the terminal.
    #[arg(long, env = "TCL_PLOT")]
    pub plot: bool,

    /// Chart width (columns).
    #[arg(long, env = "TCL_WIDTH", default_value_t = 60)]
    pub width: usize,
}

/// Options for analysing engine dumps.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Dump root holding `<baseline|reform>/<year>/<household|person>.csv`.
    #[arg(long, env = "TCL_DATA", value_name = "DIR")]
    pub data: PathBuf,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Options for the synthetic engine.
#[derive(Debug, Parser, Clone)]
pub struct SynthArgs {
    /// Number of synthetic households.
    #[arg(short = 'n', long, env = "TCL_HOUSEHOLDS", default_value_t = 20_000)]
    pub households: usize,

    /// Random seed for population generation.
    #[arg(long, env = "TCL_SEED", default_value_t = 42)]
    pub seed: u64,

    /// First fiscal year in which the limit applies.
    #[arg(long, env = "TCL_REFORM_YEAR", default_value_t = 2029)]
    pub reform_year: i32,

    /// Children attracting support under the reform.
    #[arg(long, env = "TCL_REFORM_CHILD_COUNT", default_value_t = 2)]
    pub reform_child_count: u32,

    /// Keep the Scottish Two Child Limit Payment in the reform.
    #[arg(long, env = "TCL_SCOTTISH_PAYMENT")]
    pub scottish_payment: bool,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_defaults() {
        let cli = Cli::try_parse_from(["tcl", "run", "--data", "dumps"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.data, PathBuf::from("dumps"));
        assert_eq!(args.analysis.years, vec![2029, 2030]);
        assert_eq!(args.analysis.poverty, PovertyMeasure::DEFAULT_CATALOG.to_vec());
        assert_eq!(args.analysis.decile_source, DecileSource::Engine);
    }

    #[test]
    fn parses_synth_lists() {
        let cli = Cli::try_parse_from([
            "tcl",
            "synth",
            "--households",
            "500",
            "--years",
            "2028,2029",
            "--poverty",
            "deep-bhc,absolute-ahc",
            "--decile-source",
            "baseline",
            "--scottish-payment",
        ])
        .unwrap();
        let Command::Synth(args) = cli.command else {
            panic!("expected synth");
        };
        assert_eq!(args.households, 500);
        assert!(args.scottish_payment);
        assert_eq!(args.analysis.years, vec![2028, 2029]);
        assert_eq!(
            args.analysis.poverty,
            vec![PovertyMeasure::DeepBhc, PovertyMeasure::AbsoluteAhc]
        );
        assert_eq!(args.analysis.decile_source, DecileSource::Baseline);
    }

    #[test]
    fn run_requires_data_dir() {
        assert!(Cli::try_parse_from(["tcl", "run"]).is_err());
    }
}
