//! Scenario discovery and loading.

use crate::errors::{ScenarioError, ScenarioResult};
use crate::models::Expectation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A fixture pairing an HTML input with persona-keyed expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id: String,
    pub html: String,
    /// Keyed by lower-case persona name.
    #[serde(default)]
    pub expected_results: HashMap<String, ExpectedResult>,
}

/// What a scenario expects one persona to report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedResult {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub reasoning: String,
}

impl Scenario {
    /// Expectation and reasoning for a persona; lookup is by lower-cased name.
    pub fn expectation_for(&self, persona_name: &str) -> (Expectation, &str) {
        match self.expected_results.get(&persona_name.to_lowercase()) {
            Some(entry) => {
                let expectation = entry
                    .result
                    .as_deref()
                    .map(Expectation::from_result)
                    .unwrap_or(Expectation::NoExpectation);
                (expectation, entry.reasoning.as_str())
            }
            None => (Expectation::NoExpectation, ""),
        }
    }
}

/// Load and parse one scenario file.
pub fn load_scenario(path: &Path) -> ScenarioResult<Scenario> {
    let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ScenarioError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// List the `*.json` files directly inside `dir`, sorted by file name.
///
/// The sort only makes reports reproducible; comparison results do not
/// depend on it.
pub fn discover_scenarios(dir: &Path) -> ScenarioResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ScenarioError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if entry.file_type().is_file() && is_json {
            files.push(path.to_path_buf());
        } else {
            debug!("Skipping {}", path.display());
        }
    }

    Ok(files)
}
