//! Issue aggregation and statistics.
//!
//! Summary statistics over an agent's result log and accuracy over a
//! batch of scenario comparisons.

use crate::models::{
    BatchSummary, ComparisonRecord, EvaluationResult, IssueRecord, Label, Severity,
    SeverityBreakdown, Summary,
};
use std::collections::BTreeMap;

/// Count issues by the four known severities.
///
/// Unrecognized severities are left out of the breakdown; they still count
/// toward any total computed from the issue list itself.
pub fn severity_breakdown<'a, I>(issues: I) -> SeverityBreakdown
where
    I: IntoIterator<Item = &'a IssueRecord>,
{
    let mut breakdown = SeverityBreakdown::default();

    for issue in issues {
        match issue.severity {
            Severity::Critical => breakdown.critical += 1,
            Severity::Serious => breakdown.serious += 1,
            Severity::Moderate => breakdown.moderate += 1,
            Severity::Minor => breakdown.minor += 1,
            Severity::Other(_) => {}
        }
    }

    breakdown
}

/// Fraction of results labeled PASS. Zero for an empty log.
pub fn pass_rate(results: &[EvaluationResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.label == Label::Pass).count();
    passed as f64 / results.len() as f64
}

/// Build the summary for a persona's result log.
pub fn summarize(persona: &str, results: &[EvaluationResult]) -> Summary {
    if results.is_empty() {
        return Summary::empty();
    }

    let total_issues = results.iter().map(|r| r.issues_found_count).sum();
    let severity_breakdown = severity_breakdown(results.iter().flat_map(|r| &r.issues));

    Summary::Populated {
        persona: persona.to_string(),
        evaluations_performed: results.len(),
        total_issues,
        severity_breakdown,
        pass_rate: pass_rate(results),
    }
}

/// Accuracy over a batch of comparisons; zero when the batch is empty.
pub fn batch_summary(comparisons: &[ComparisonRecord]) -> BatchSummary {
    let total_scenarios = comparisons.len();
    let matches = comparisons.iter().filter(|c| c.is_match).count();
    let accuracy = if total_scenarios > 0 {
        matches as f64 / total_scenarios as f64
    } else {
        0.0
    };

    BatchSummary {
        total_scenarios,
        matches,
        accuracy,
    }
}

/// Comparisons whose agent label disagreed with the expectation.
pub fn mismatches(comparisons: &[ComparisonRecord]) -> Vec<&ComparisonRecord> {
    comparisons.iter().filter(|c| !c.is_match).collect()
}

/// Issue counts per WCAG criterion, ordered by criterion.
pub fn issues_by_criterion(issues: &[IssueRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for issue in issues {
        *counts.entry(issue.wcag_criterion.clone()).or_default() += 1;
    }

    counts.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Expectation;
    use chrono::Utc;

    fn create_test_issue(criterion: &str, severity: Severity) -> IssueRecord {
        IssueRecord {
            wcag_criterion: criterion.to_string(),
            issue_type: "test_issue".to_string(),
            severity,
            evidence: "evidence".to_string(),
            element: "<div>".to_string(),
            recommendation: "fix it".to_string(),
        }
    }

    fn create_test_result(label: Label, issues: Vec<IssueRecord>) -> EvaluationResult {
        EvaluationResult {
            persona: "Tester".to_string(),
            persona_description: "Test persona".to_string(),
            timestamp: Utc::now(),
            input: "<p>hi</p>".to_string(),
            tool_used: "stub".to_string(),
            issues_found_count: issues.len(),
            issues,
            label,
        }
    }

    fn create_comparison(is_match: bool) -> ComparisonRecord {
        ComparisonRecord {
            scenario_id: "s".to_string(),
            expected_label: Expectation::Labeled(Label::Pass),
            agent_label: if is_match { Label::Pass } else { Label::Fail },
            is_match,
            expected_issues: String::new(),
            agent_found: 0,
            agent_issues: vec![],
        }
    }

    #[test]
    fn test_severity_breakdown_drops_unknown() {
        let issues = vec![
            create_test_issue("1.1.1", Severity::Critical),
            create_test_issue("1.1.1", Severity::Minor),
            create_test_issue("2.4.4", Severity::Other("blocker".to_string())),
        ];

        let breakdown = severity_breakdown(&issues);
        assert_eq!(breakdown.critical, 1);
        assert_eq!(breakdown.minor, 1);
        assert_eq!(
            breakdown.critical + breakdown.serious + breakdown.moderate + breakdown.minor,
            2
        );
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize("Tester", &[]);
        assert_eq!(summary, Summary::empty());
    }

    #[test]
    fn test_summarize_counts_unknown_in_total() {
        let results = vec![
            create_test_result(Label::Pass, vec![]),
            create_test_result(
                Label::Partial,
                vec![
                    create_test_issue("1.4.4", Severity::Serious),
                    create_test_issue("1.4.4", Severity::Other("cosmetic".to_string())),
                ],
            ),
            create_test_result(
                Label::Fail,
                vec![create_test_issue("2.1.1", Severity::Critical)],
            ),
            create_test_result(Label::Pass, vec![]),
        ];

        match summarize("Tester", &results) {
            Summary::Populated {
                persona,
                evaluations_performed,
                total_issues,
                severity_breakdown,
                pass_rate,
            } => {
                assert_eq!(persona, "Tester");
                assert_eq!(evaluations_performed, 4);
                assert_eq!(total_issues, 3);
                assert_eq!(severity_breakdown.serious, 1);
                assert_eq!(severity_breakdown.critical, 1);
                assert_eq!(pass_rate, 0.5);
            }
            other => panic!("expected populated summary, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_summary_empty_is_zero() {
        let summary = batch_summary(&[]);
        assert_eq!(summary.total_scenarios, 0);
        assert_eq!(summary.matches, 0);
        assert_eq!(summary.accuracy, 0.0);
    }

    #[test]
    fn test_batch_summary_accuracy() {
        let comparisons = vec![
            create_comparison(true),
            create_comparison(false),
            create_comparison(true),
            create_comparison(true),
        ];

        let summary = batch_summary(&comparisons);
        assert_eq!(summary.total_scenarios, 4);
        assert_eq!(summary.matches, 3);
        assert_eq!(summary.accuracy, 0.75);
        assert_eq!(mismatches(&comparisons).len(), 1);
    }

    #[test]
    fn test_issues_by_criterion_sorted() {
        let issues = vec![
            create_test_issue("2.4.4", Severity::Moderate),
            create_test_issue("1.1.1", Severity::Critical),
            create_test_issue("2.4.4", Severity::Serious),
        ];

        let counts = issues_by_criterion(&issues);
        assert_eq!(
            counts,
            vec![("1.1.1".to_string(), 1), ("2.4.4".to_string(), 2)]
        );
    }
}
