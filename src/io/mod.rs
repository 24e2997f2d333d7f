//! Input/output helpers.
//!
//! - engine output dumps -> `TableEngine` (`dump`)
//! - constituency reference data (`reference`)
//! - CSV report tables (`export`)
//! - run manifest JSON (`manifest`)

pub mod dump;
pub mod export;
pub mod manifest;
pub mod reference;

pub use dump::*;
pub use export::*;
pub use manifest::*;
pub use reference::*;
