//! Scenario comparison.
//!
//! Runs scenarios through an agent, checks each label against the
//! scenario's expectation, and aggregates accuracy over a batch.

use crate::agent::{Agent, Persona};
use crate::analysis::batch_summary;
use crate::errors::{ScenarioError, ScenarioResult};
use crate::models::{ComparisonRecord, ComparisonReport, SkippedScenario};
use crate::report::write_json_atomic;
use crate::scenario::loader::{discover_scenarios, load_scenario, Scenario};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started { file: &'a Path },
    Compared { file: &'a Path, comparison: &'a ComparisonRecord },
    Skipped { file: &'a Path, error: &'a ScenarioError },
}

/// How a batch treats a scenario that cannot be compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Record the failure and continue instead of aborting the run.
    pub keep_going: bool,
}

/// Evaluate one scenario and compare the label with its expectation.
///
/// A persona with no entry in the scenario is compared against
/// [`Expectation::NoExpectation`](crate::models::Expectation::NoExpectation)
/// and always mismatches.
pub fn evaluate_scenario<P: Persona>(
    agent: &mut Agent<P>,
    scenario: &Scenario,
) -> ScenarioResult<ComparisonRecord> {
    let (expected_label, reasoning) = scenario.expectation_for(agent.persona_name());

    let result = agent
        .evaluate(&scenario.html)
        .map_err(|source| ScenarioError::Agent {
            scenario_id: scenario.scenario_id.clone(),
            source,
        })?;

    Ok(ComparisonRecord {
        scenario_id: scenario.scenario_id.clone(),
        is_match: expected_label.matches(result.label),
        expected_label,
        agent_label: result.label,
        expected_issues: reasoning.to_string(),
        agent_found: result.issues_found_count,
        agent_issues: result.issues,
    })
}

fn compare_file<P: Persona>(agent: &mut Agent<P>, file: &Path) -> ScenarioResult<ComparisonRecord> {
    let scenario = load_scenario(file)?;
    evaluate_scenario(agent, &scenario)
}

/// Compare every scenario file, in the order given.
pub fn run_batch<P, F>(
    agent: &mut Agent<P>,
    files: &[PathBuf],
    options: BatchOptions,
    mut on_event: F,
) -> ScenarioResult<ComparisonReport>
where
    P: Persona,
    F: FnMut(BatchEvent<'_>),
{
    let mut comparisons = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();

    for file in files {
        on_event(BatchEvent::Started { file });

        match compare_file(agent, file) {
            Ok(comparison) => {
                on_event(BatchEvent::Compared {
                    file,
                    comparison: &comparison,
                });
                comparisons.push(comparison);
            }
            Err(error) if options.keep_going => {
                warn!("Skipping {}: {}", file.display(), error);
                on_event(BatchEvent::Skipped {
                    file,
                    error: &error,
                });
                skipped.push(SkippedScenario {
                    file: file.clone(),
                    error: error.to_string(),
                });
            }
            Err(error) => return Err(error),
        }
    }

    let summary = batch_summary(&comparisons);
    info!(
        "[{}] Compared {} scenarios: {} matches",
        agent.persona_name(),
        summary.total_scenarios,
        summary.matches
    );

    Ok(ComparisonReport {
        agent: agent.persona_name().to_string(),
        comparisons,
        summary,
        skipped,
    })
}

/// Discover and compare every scenario in a directory.
pub fn compare_directory<P: Persona>(
    agent: &mut Agent<P>,
    dir: &Path,
    options: BatchOptions,
) -> ScenarioResult<ComparisonReport> {
    let files = discover_scenarios(dir)?;
    run_batch(agent, &files, options, |_| {})
}

/// Write the comparison report as one JSON document.
pub fn save_report(report: &ComparisonReport, path: &Path) -> ScenarioResult<()> {
    write_json_atomic(report, path).map_err(|source| ScenarioError::Write {
        path: path.to_path_buf(),
        source,
    })
}
