//! `tcl-impact` library crate.
//!
//! The binary (`tcl`) is a thin wrapper around this library so that:
//!
//! - every analysis is testable without spawning processes
//! - the aggregation code works against any `Microsimulation` engine
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod impact;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
