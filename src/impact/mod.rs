//! Baseline-vs-reform impact analyses.
//!
//! Each analysis has a pure core that works on already-fetched
//! `ScenarioPair`s (easy to test with hand-built vectors) and a
//! `calculate_*` driver that pulls the inputs from the engines for every
//! configured year.

pub mod budgetary;
pub mod constituency;
pub mod distributional;
pub mod headcount;
pub mod inequality;
pub mod poverty;

pub use budgetary::*;
pub use constituency::*;
pub use distributional::*;
pub use headcount::*;
pub use inequality::*;
pub use poverty::*;

/// `numerator / denominator * 100`, or 0 when the denominator is not positive.
pub fn relative_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}
