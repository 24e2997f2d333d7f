//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - engine-facing identifiers (`FiscalYear`, `EntityLevel`, `Scenario`, `Variable`)
//! - the poverty measure catalog (`PovertyMeasure`)
//! - the analysis parameter object (`AnalysisConfig`)
//! - one row type per output table

pub mod types;

pub use types::*;
