//! Error types for the agent lifecycle and the scenario comparator.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by a persona agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Error in tool {tool}: {message}")]
    Tool { tool: String, message: String },

    #[error("Failed to write results to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AgentError {
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        AgentError::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Failures raised while loading or comparing scenarios.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed scenario {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to scan scenario directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Evaluation of scenario {scenario_id} failed: {source}")]
    Agent {
        scenario_id: String,
        #[source]
        source: AgentError,
    },
}

pub type AgentResult<T> = Result<T, AgentError>;
pub type ScenarioResult<T> = Result<T, ScenarioError>;
