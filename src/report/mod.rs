//! Report writers.

pub mod generator;

pub use generator::{generate_markdown_report, write_json_atomic, write_text_atomic};
