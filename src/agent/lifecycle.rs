//! Evaluation lifecycle shared by every persona.
//!
//! An [`Agent`] wraps one persona, runs its tool and analysis on each
//! input, labels the outcome, and keeps an ordered log of results that can
//! be summarized or written to disk.

use crate::agent::contract::Persona;
use crate::analysis::summarize;
use crate::errors::{AgentError, AgentResult};
use crate::models::{EvaluationResult, IssueRecord, Label, Summary};
use crate::report::write_json_atomic;
use chrono::Utc;
use std::path::Path;
use tracing::{debug, info};

/// Inputs longer than this many characters are shortened in results.
pub const INPUT_DISPLAY_CHARS: usize = 100;

/// Label a list of issues.
///
/// Empty is PASS. Any critical issue is FAIL regardless of count. Anything
/// else is PARTIAL.
pub fn determine_label(issues: &[IssueRecord]) -> Label {
    if issues.is_empty() {
        Label::Pass
    } else if issues.iter().any(|i| i.severity.is_critical()) {
        Label::Fail
    } else {
        Label::Partial
    }
}

/// Shorten an input for display: the first 100 characters followed by
/// "..." when longer, unchanged otherwise. Counts characters, not bytes.
pub fn truncate_input(input: &str) -> String {
    match input.char_indices().nth(INPUT_DISPLAY_CHARS) {
        Some((cut, _)) => format!("{}...", &input[..cut]),
        None => input.to_string(),
    }
}

/// A persona together with its result log.
pub struct Agent<P = Box<dyn Persona>> {
    persona_name: String,
    persona_description: String,
    persona: P,
    results: Vec<EvaluationResult>,
}

impl<P: Persona> Agent<P> {
    /// Wrap a persona. Its identity is captured once and never changes.
    pub fn new(persona: P) -> Self {
        Self {
            persona_name: persona.name().to_string(),
            persona_description: persona.description().to_string(),
            persona,
            results: Vec::new(),
        }
    }

    pub fn persona_name(&self) -> &str {
        &self.persona_name
    }

    pub fn persona_description(&self) -> &str {
        &self.persona_description
    }

    /// Every result produced so far, oldest first.
    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    /// Run the tool, analyze its output, label it, and log the result.
    ///
    /// A tool failure is returned as-is and nothing is appended to the log.
    pub fn evaluate(&mut self, input: &str) -> AgentResult<EvaluationResult> {
        info!("[{}] Starting evaluation...", self.persona_name);

        let tool_output = self.persona.run_tool(input)?;
        debug!(
            "[{}] {} produced {} lines of output",
            self.persona_name,
            tool_output.tool_name(),
            tool_output.output.len()
        );

        let issues = self.persona.analyze_output(&tool_output);
        let label = determine_label(&issues);

        let result = EvaluationResult {
            persona: self.persona_name.clone(),
            persona_description: self.persona_description.clone(),
            timestamp: Utc::now(),
            input: truncate_input(input),
            tool_used: tool_output.tool_name().to_string(),
            issues_found_count: issues.len(),
            issues,
            label,
        };

        self.results.push(result.clone());

        info!(
            "[{}] Evaluation complete. Found {} issues.",
            self.persona_name, result.issues_found_count
        );

        Ok(result)
    }

    /// Write the whole result log as a JSON array.
    ///
    /// On failure the destination is left untouched and the log is kept, so
    /// the save can be retried.
    pub fn save_results(&self, path: &Path) -> AgentResult<()> {
        write_json_atomic(&self.results, path).map_err(|source| AgentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("[{}] Results saved to {}", self.persona_name, path.display());
        Ok(())
    }

    /// Statistics over the result log, recomputed on every call.
    pub fn summary(&self) -> Summary {
        summarize(&self.persona_name, &self.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_support::{issue, StubPersona};
    use crate::models::{Severity, SeverityBreakdown};
    use proptest::prelude::*;

    #[test]
    fn test_label_empty_is_pass() {
        let mut agent = Agent::new(StubPersona::with_issues(vec![]));
        let result = agent.evaluate("<p>ok</p>").unwrap();

        assert_eq!(result.label, Label::Pass);
        assert_eq!(result.issues_found_count, 0);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_label_without_critical_is_partial() {
        let mut agent = Agent::new(StubPersona::with_issues(vec![
            issue(Severity::Serious),
            issue(Severity::Minor),
        ]));
        let result = agent.evaluate("<p>x</p>").unwrap();

        assert_eq!(result.label, Label::Partial);
        assert_eq!(result.issues_found_count, 2);
    }

    #[test]
    fn test_label_with_critical_is_fail() {
        let mut agent = Agent::new(StubPersona::with_issues(vec![
            issue(Severity::Critical),
            issue(Severity::Minor),
        ]));
        let result = agent.evaluate("<p>x</p>").unwrap();

        assert_eq!(result.label, Label::Fail);
        assert_eq!(result.issues_found_count, 2);
    }

    #[test]
    fn test_unknown_severity_is_not_critical() {
        let issues = vec![issue(Severity::Other("Critical".to_string()))];
        assert_eq!(determine_label(&issues), Label::Partial);
    }

    #[test]
    fn test_truncate_input() {
        let exact = "a".repeat(100);
        assert_eq!(truncate_input(&exact), exact);

        let long = format!("{}{}", "b".repeat(100), "tail");
        let truncated = truncate_input(&long);
        assert_eq!(truncated, format!("{}...", "b".repeat(100)));
    }

    #[test]
    fn test_truncate_input_respects_char_boundaries() {
        let long = "é".repeat(120);
        let truncated = truncate_input(&long);
        assert_eq!(truncated.chars().count(), 103);
        assert!(truncated.starts_with(&"é".repeat(100)));
        assert!(truncated.ends_with("..."));

        let short = "ü".repeat(100);
        assert_eq!(truncate_input(&short), short);
    }

    #[test]
    fn test_evaluate_records_identity_and_tool() {
        let mut agent = Agent::new(StubPersona::with_issues(vec![]));
        let long_input = "x".repeat(150);
        let result = agent.evaluate(&long_input).unwrap();

        assert_eq!(result.persona, "Stub");
        assert_eq!(result.persona_description, "Deterministic test persona");
        assert_eq!(result.tool_used, "stub-tool");
        assert_eq!(result.input.len(), 103);
        assert_eq!(agent.results(), &[result]);
    }

    #[test]
    fn test_missing_tool_name_is_unknown() {
        let mut agent = Agent::new(StubPersona::with_issues(vec![]).without_tool_name());
        let result = agent.evaluate("<p></p>").unwrap();
        assert_eq!(result.tool_used, "unknown");
    }

    #[test]
    fn test_tool_failure_propagates_and_logs_nothing() {
        let mut agent = Agent::new(StubPersona::failing());
        let err = agent.evaluate("<p></p>").unwrap_err();

        assert!(matches!(err, AgentError::Tool { .. }));
        assert!(agent.results().is_empty());
    }

    #[test]
    fn test_results_accumulate_in_order() {
        let mut agent = Agent::new(StubPersona::with_issues(vec![]));
        agent.evaluate("first").unwrap();
        agent.evaluate("second").unwrap();

        let inputs: Vec<&str> = agent.results().iter().map(|r| r.input.as_str()).collect();
        assert_eq!(inputs, vec!["first", "second"]);
    }

    #[test]
    fn test_summary_empty_log() {
        let agent = Agent::new(StubPersona::with_issues(vec![]));
        let summary = agent.summary();

        assert_eq!(summary, Summary::empty());
        assert_eq!(summary.evaluations_performed(), 0);
        assert_eq!(summary.total_issues(), 0);
        assert_eq!(summary.pass_rate(), None);
    }

    #[test]
    fn test_summary_is_idempotent() {
        let mut agent = Agent::new(StubPersona::with_issues(vec![
            issue(Severity::Critical),
            issue(Severity::Other("blocker".to_string())),
        ]));
        agent.evaluate("<p>one</p>").unwrap();

        let first = agent.summary();
        let second = agent.summary();
        assert_eq!(first, second);

        match first {
            Summary::Populated {
                total_issues,
                severity_breakdown,
                pass_rate,
                ..
            } => {
                assert_eq!(total_issues, 2);
                assert_eq!(
                    severity_breakdown,
                    SeverityBreakdown {
                        critical: 1,
                        ..SeverityBreakdown::default()
                    }
                );
                assert_eq!(pass_rate, 0.0);
            }
            other => panic!("expected populated summary, got {:?}", other),
        }
    }

    #[test]
    fn test_save_results_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results/stub.json");

        let mut agent = Agent::new(StubPersona::with_issues(vec![issue(Severity::Moderate)]));
        agent.evaluate("<p>one</p>").unwrap();
        agent.evaluate("<p>two</p>").unwrap();
        agent.save_results(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let reloaded: Vec<EvaluationResult> = serde_json::from_str(&content).unwrap();
        assert_eq!(reloaded, agent.results());
    }

    #[test]
    fn test_save_results_failure_keeps_log() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let mut agent = Agent::new(StubPersona::with_issues(vec![]));
        agent.evaluate("<p></p>").unwrap();

        let err = agent.save_results(&blocker.join("results.json")).unwrap_err();
        assert!(matches!(err, AgentError::Io { .. }));
        assert_eq!(agent.results().len(), 1);
    }

    fn severity_strategy() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Critical),
            Just(Severity::Serious),
            Just(Severity::Moderate),
            Just(Severity::Minor),
            "[a-zA-Z]{1,10}".prop_map(Severity::from),
        ]
    }

    proptest! {
        #[test]
        fn prop_label_follows_severity_policy(
            severities in prop::collection::vec(severity_strategy(), 0..8)
        ) {
            let issues: Vec<IssueRecord> = severities.into_iter().map(issue).collect();
            let label = determine_label(&issues);
            let has_critical = issues.iter().any(|i| i.severity == Severity::Critical);

            prop_assert_eq!(label == Label::Pass, issues.is_empty());
            prop_assert_eq!(label == Label::Fail, !issues.is_empty() && has_critical);
            prop_assert_eq!(label == Label::Partial, !issues.is_empty() && !has_critical);
        }

        #[test]
        fn prop_truncate_input_keeps_prefix(input in "\\PC{0,160}") {
            let truncated = truncate_input(&input);
            if input.chars().count() > INPUT_DISPLAY_CHARS {
                prop_assert!(truncated.ends_with("..."));
                prop_assert_eq!(truncated.chars().count(), INPUT_DISPLAY_CHARS + 3);
                prop_assert!(input.starts_with(&truncated[..truncated.len() - 3]));
            } else {
                prop_assert_eq!(truncated, input);
            }
        }
    }
}
