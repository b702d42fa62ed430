//! Analysis modules.
//!
//! Statistics derived from result logs and comparison runs.

pub mod aggregator;

pub use aggregator::*;
