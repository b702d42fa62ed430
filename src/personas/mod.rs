//! Built-in personas.
//!
//! Each persona simulates one assistive technology against the input
//! markup and applies a handful of WCAG heuristics to what it observed.
//! They are reference implementations of the [`Persona`] contract and are
//! selected by name when the agent is constructed.

pub mod magnifier;
pub mod screen_reader;
pub mod switch_access;

pub use magnifier::MagnifierPersona;
pub use screen_reader::ScreenReaderPersona;
pub use switch_access::SwitchAccessPersona;

use crate::agent::{Persona, ToolConfig};
use crate::models::{IssueRecord, Severity};

/// Registered persona keys, as used on the command line and in scenarios.
pub const PERSONA_KEYS: &[&str] = &["lakshmi", "marcus", "aiyana"];

/// Construct a persona by key (case-insensitive).
pub fn build(name: &str, config: &ToolConfig) -> Option<Box<dyn Persona>> {
    match name.to_lowercase().as_str() {
        "lakshmi" => Some(Box::new(ScreenReaderPersona::new(config.clone()))),
        "marcus" => Some(Box::new(MagnifierPersona::new(config.clone()))),
        "aiyana" => Some(Box::new(SwitchAccessPersona::new(config.clone()))),
        _ => None,
    }
}

pub fn is_known(name: &str) -> bool {
    PERSONA_KEYS.contains(&name.to_lowercase().as_str())
}

/// Shorthand for building an issue record.
pub(crate) fn finding(
    wcag_criterion: &str,
    issue_type: &str,
    severity: Severity,
    evidence: String,
    element: String,
    recommendation: &str,
) -> IssueRecord {
    IssueRecord {
        wcag_criterion: wcag_criterion.to_string(),
        issue_type: issue_type.to_string(),
        severity,
        evidence,
        element,
        recommendation: recommendation.to_string(),
    }
}
