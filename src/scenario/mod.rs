//! Scenario fixtures and the comparator that scores agents against them.

pub mod comparator;
pub mod loader;

pub use comparator::{compare_directory, run_batch, save_report, BatchEvent, BatchOptions};
pub use loader::discover_scenarios;
