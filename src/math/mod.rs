//! Weighted statistics: series arithmetic, Gini coefficient, decile bucketing.

pub mod decile;
pub mod gini;
pub mod series;

pub use decile::*;
pub use gini::*;
pub use series::*;
