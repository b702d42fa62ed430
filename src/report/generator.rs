//! Report generation.
//!
//! Every report is written atomically; the Markdown report is a
//! human-readable rendering of a comparison run.

use crate::analysis::{issues_by_criterion, mismatches};
use crate::models::{ComparisonRecord, ComparisonReport, IssueRecord, Severity};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Serialize `value` as pretty JSON and move it into place at `path`.
///
/// Parent directories are created as needed. The document is written to a
/// temporary file in the destination directory and renamed over `path`, so
/// readers see either the previous file or the complete new one.
pub fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> std::io::Result<()> {
    write_atomic(path, |tmp| {
        serde_json::to_writer_pretty(&mut *tmp, value)?;
        tmp.write_all(b"\n")
    })
}

/// Write `content` to `path` with the same guarantees as [`write_json_atomic`].
pub fn write_text_atomic(content: &str, path: &Path) -> std::io::Result<()> {
    write_atomic(path, |tmp| tmp.write_all(content.as_bytes()))
}

fn write_atomic<F>(path: &Path, fill: F) -> std::io::Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> std::io::Result<()>,
{
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut tmp = NamedTempFile::new_in(&parent)?;
    fill(&mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Generate a complete Markdown report for a comparison run.
pub fn generate_markdown_report(report: &ComparisonReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Accessibility Evaluation: {}\n\n", report.agent));
    output.push_str(&generate_summary_section(report));
    output.push_str(&generate_scenarios_section(&report.comparisons));
    output.push_str(&generate_mismatch_section(&report.comparisons));

    if !report.skipped.is_empty() {
        output.push_str("## Skipped Scenarios\n\n");
        for skipped in &report.skipped {
            output.push_str(&format!(
                "- `{}`: {}\n",
                skipped.file.display(),
                skipped.error
            ));
        }
        output.push('\n');
    }

    output.push_str("---\n\n*Report generated by a11y-personas*\n");

    output
}

fn generate_summary_section(report: &ComparisonReport) -> String {
    let summary = &report.summary;
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Scenarios | Matches | Accuracy |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {:.2}% |\n\n",
        summary.total_scenarios,
        summary.matches,
        summary.accuracy * 100.0
    ));

    let all_issues: Vec<IssueRecord> = report
        .comparisons
        .iter()
        .flat_map(|c| c.agent_issues.iter().cloned())
        .collect();
    let by_criterion = issues_by_criterion(&all_issues);
    if !by_criterion.is_empty() {
        section.push_str("### Issues by WCAG Criterion\n\n");
        section.push_str("| Criterion | Issues |\n");
        section.push_str("|:---|:---:|\n");
        for (criterion, count) in by_criterion {
            section.push_str(&format!("| {} | {} |\n", criterion, count));
        }
        section.push('\n');
    }

    section
}

fn generate_scenarios_section(comparisons: &[ComparisonRecord]) -> String {
    let mut section = String::new();

    section.push_str("## Scenarios\n\n");
    if comparisons.is_empty() {
        section.push_str("No scenarios were evaluated.\n\n");
        return section;
    }

    section.push_str("| Scenario | Expected | Agent | Match | Issues |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
    for comparison in comparisons {
        section.push_str(&format!(
            "| `{}` | {} | {} | {} | {} |\n",
            comparison.scenario_id,
            comparison.expected_label,
            comparison.agent_label,
            if comparison.is_match { "✓" } else { "✗" },
            comparison.agent_found
        ));
    }
    section.push('\n');

    section
}

fn generate_mismatch_section(comparisons: &[ComparisonRecord]) -> String {
    let missed = mismatches(comparisons);
    if missed.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Mismatches\n\n");

    for comparison in missed {
        section.push_str(&format!(
            "### {}\n\n**Expected:** {} | **Agent:** {}\n\n",
            comparison.scenario_id, comparison.expected_label, comparison.agent_label
        ));
        if !comparison.expected_issues.is_empty() {
            section.push_str(&format!("> {}\n\n", comparison.expected_issues));
        }
        for issue in &comparison.agent_issues {
            section.push_str(&generate_issue_line(issue));
        }
        section.push('\n');
    }

    section
}

fn generate_issue_line(issue: &IssueRecord) -> String {
    let badge = match issue.severity {
        Severity::Other(ref s) => format!("{} {}", issue.severity.emoji(), s),
        ref known => format!("{} **{}**", known.emoji(), known.as_str().to_uppercase()),
    };
    format!(
        "- {} `{}` {}: {}\n",
        badge, issue.wcag_criterion, issue.issue_type, issue.evidence
    )
}
