//! Data models for the evaluation harness.
//!
//! This module contains the core data structures shared by the agent
//! lifecycle, the scenario comparator, and the report writers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Severity of an accessibility issue.
///
/// The four known levels are closed; anything else a heuristic emits is kept
/// verbatim in `Other` and is never treated as critical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    /// Blocks the persona from completing the task.
    Critical,
    /// Major barrier with a painful workaround.
    Serious,
    /// Noticeable friction.
    Moderate,
    /// Cosmetic or best-practice deviation.
    Minor,
    /// Unrecognized severity label.
    Other(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Critical => "critical",
            Severity::Serious => "serious",
            Severity::Moderate => "moderate",
            Severity::Minor => "minor",
            Severity::Other(s) => s,
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Critical)
    }

    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Critical => "🔴",
            Severity::Serious => "🟠",
            Severity::Moderate => "🟡",
            Severity::Minor => "🟢",
            Severity::Other(_) => "⚪",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Exact, case-sensitive match: "Critical" is not a known severity.
impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s {
            "critical" => Severity::Critical,
            "serious" => Severity::Serious,
            "moderate" => Severity::Moderate,
            "minor" => Severity::Minor,
            other => Severity::Other(other.to_string()),
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Severity::from(s.as_str())
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// A single accessibility finding produced by a persona's analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// WCAG success criterion, e.g. "1.1.1".
    pub wcag_criterion: String,
    /// Short symbolic name of the defect class.
    pub issue_type: String,
    pub severity: Severity,
    /// Tool output supporting the finding.
    pub evidence: String,
    /// Markup snippet implicated.
    pub element: String,
    /// Remediation guidance.
    pub recommendation: String,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Pass,
    Fail,
    Partial,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Pass => "PASS",
            Label::Fail => "FAIL",
            Label::Partial => "PARTIAL",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(Label::Pass),
            "FAIL" => Ok(Label::Fail),
            "PARTIAL" => Ok(Label::Partial),
            other => Err(format!("unknown label: {}", other)),
        }
    }
}

/// Result of one `Agent::evaluate` call. Immutable once appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub persona: String,
    pub persona_description: String,
    pub timestamp: DateTime<Utc>,
    /// Evaluated URL or HTML, shortened for display.
    pub input: String,
    pub tool_used: String,
    pub issues_found_count: usize,
    pub issues: Vec<IssueRecord>,
    pub label: Label,
}

/// Counts over the four known severities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub critical: usize,
    pub serious: usize,
    pub moderate: usize,
    pub minor: usize,
}

/// Aggregate over an agent's result log.
///
/// The empty shape carries no breakdown or pass rate; callers must branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Summary {
    Populated {
        persona: String,
        evaluations_performed: usize,
        total_issues: usize,
        severity_breakdown: SeverityBreakdown,
        pass_rate: f64,
    },
    Empty {
        evaluations_performed: usize,
        total_issues: usize,
    },
}

impl Summary {
    pub fn empty() -> Self {
        Summary::Empty {
            evaluations_performed: 0,
            total_issues: 0,
        }
    }

    pub fn evaluations_performed(&self) -> usize {
        match self {
            Summary::Populated {
                evaluations_performed,
                ..
            }
            | Summary::Empty {
                evaluations_performed,
                ..
            } => *evaluations_performed,
        }
    }

    pub fn total_issues(&self) -> usize {
        match self {
            Summary::Populated { total_issues, .. } | Summary::Empty { total_issues, .. } => {
                *total_issues
            }
        }
    }

    /// `None` for the empty shape.
    pub fn pass_rate(&self) -> Option<f64> {
        match self {
            Summary::Populated { pass_rate, .. } => Some(*pass_rate),
            Summary::Empty { .. } => None,
        }
    }
}

/// What a scenario expects from a persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Expectation {
    /// The scenario names a known label.
    Labeled(Label),
    /// The scenario names a string that is not a known label; never matches.
    Unrecognized(String),
    /// The scenario has no entry for the persona; never matches.
    NoExpectation,
}

impl Expectation {
    /// Sentinel written for a missing expectation.
    pub const UNKNOWN: &'static str = "UNKNOWN";

    /// Interpret the `result` string of a scenario entry.
    ///
    /// A literal "UNKNOWN" reads as [`Expectation::NoExpectation`], so every
    /// expectation survives a write and reload of the report.
    pub fn from_result(result: &str) -> Self {
        if result == Self::UNKNOWN {
            return Expectation::NoExpectation;
        }
        match result.parse::<Label>() {
            Ok(label) => Expectation::Labeled(label),
            Err(_) => Expectation::Unrecognized(result.to_string()),
        }
    }

    /// Exact equality against an agent label.
    pub fn matches(&self, label: Label) -> bool {
        matches!(self, Expectation::Labeled(expected) if *expected == label)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Expectation::Labeled(label) => label.as_str(),
            Expectation::Unrecognized(s) => s,
            Expectation::NoExpectation => Self::UNKNOWN,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Expectation {
    fn from(s: String) -> Self {
        Expectation::from_result(&s)
    }
}

impl From<Expectation> for String {
    fn from(expectation: Expectation) -> Self {
        expectation.as_str().to_string()
    }
}

/// One agent's label checked against one scenario's expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub scenario_id: String,
    pub expected_label: Expectation,
    pub agent_label: Label,
    #[serde(rename = "match")]
    pub is_match: bool,
    /// The scenario's reasoning for its expectation.
    pub expected_issues: String,
    pub agent_found: usize,
    pub agent_issues: Vec<IssueRecord>,
}

/// Accuracy over a batch of comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_scenarios: usize,
    pub matches: usize,
    pub accuracy: f64,
}

/// A scenario file that could not be compared when isolation is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedScenario {
    pub file: PathBuf,
    pub error: String,
}

/// The comparator's output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub comparisons: Vec<ComparisonRecord>,
    pub summary: BatchSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedScenario>,
}
