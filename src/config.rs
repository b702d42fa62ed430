//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.a11y-personas.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".a11y-personas.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Evaluation settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Comparison report path. Defaults to `results/<persona>_evaluation.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Where to save the agent's raw result log, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<PathBuf>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Which persona runs against which scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Directory holding `*.json` scenario files.
    #[serde(default = "default_scenarios_dir")]
    pub scenarios_dir: PathBuf,

    /// Persona key, e.g. "lakshmi".
    #[serde(default = "default_persona")]
    pub persona: String,

    /// Skip malformed scenarios instead of aborting the run.
    #[serde(default)]
    pub keep_going: bool,

    /// Timeout for fetching URL inputs.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            scenarios_dir: default_scenarios_dir(),
            persona: default_persona(),
            keep_going: false,
            fetch_timeout_seconds: default_fetch_timeout(),
        }
    }
}

fn default_scenarios_dir() -> PathBuf {
    PathBuf::from("scenarios/shared")
}

fn default_persona() -> String {
    "lakshmi".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

/// Console and human-readable report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Print each issue under its scenario.
    #[serde(default = "default_true")]
    pub show_issues: bool,

    /// Also write a Markdown report to this path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_issues: true,
            markdown: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when they were given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.scenarios {
            self.evaluation.scenarios_dir = dir.clone();
        }
        if let Some(ref persona) = args.persona {
            self.evaluation.persona = persona.clone();
        }
        if let Some(timeout) = args.fetch_timeout {
            self.evaluation.fetch_timeout_seconds = timeout;
        }
        if args.keep_going {
            self.evaluation.keep_going = true;
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }
        if let Some(ref results) = args.results {
            self.general.results = Some(results.clone());
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(ref markdown) = args.markdown {
            self.report.markdown = Some(markdown.clone());
        }
        if args.hide_issues {
            self.report.show_issues = false;
        }
    }

    /// Comparison report path, derived from the persona when not configured.
    pub fn output_path(&self) -> PathBuf {
        self.general.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "results/{}_evaluation.json",
                self.evaluation.persona.to_lowercase()
            ))
        })
    }

    /// Log level after merging: `--quiet` wins, then `verbose` from either
    /// the flag or `[general]`.
    pub fn log_level(&self, args: &crate::cli::Args) -> tracing::Level {
        if args.quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.evaluation.persona, "lakshmi");
        assert_eq!(
            config.evaluation.scenarios_dir,
            PathBuf::from("scenarios/shared")
        );
        assert!(!config.evaluation.keep_going);
        assert_eq!(
            config.output_path(),
            PathBuf::from("results/lakshmi_evaluation.json")
        );
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "out/report.json"
verbose = true

[evaluation]
persona = "marcus"
scenarios_dir = "fixtures/scenarios"
keep_going = true

[report]
show_issues = false
markdown = "out/report.md"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.output_path(), PathBuf::from("out/report.json"));
        assert!(config.general.verbose);
        assert_eq!(config.evaluation.persona, "marcus");
        assert!(config.evaluation.keep_going);
        assert_eq!(config.evaluation.fetch_timeout_seconds, 30);
        assert!(!config.report.show_issues);
        assert_eq!(config.report.markdown, Some(PathBuf::from("out/report.md")));
    }

    #[test]
    fn test_output_path_follows_persona() {
        let mut config = Config::default();
        config.evaluation.persona = "Aiyana".to_string();
        assert_eq!(
            config.output_path(),
            PathBuf::from("results/aiyana_evaluation.json")
        );
    }

    #[test]
    fn test_merge_with_args_only_overrides_given() {
        let mut config: Config = toml::from_str(
            r#"
[evaluation]
persona = "marcus"
scenarios_dir = "custom"
"#,
        )
        .unwrap();

        let args = Args::parse_from(["a11y-personas", "--output", "x.json", "--keep-going"]);
        config.merge_with_args(&args);

        assert_eq!(config.evaluation.persona, "marcus");
        assert_eq!(config.evaluation.scenarios_dir, PathBuf::from("custom"));
        assert!(config.evaluation.keep_going);
        assert_eq!(config.output_path(), PathBuf::from("x.json"));

        let args = Args::parse_from(["a11y-personas", "--persona", "aiyana"]);
        config.merge_with_args(&args);
        assert_eq!(config.evaluation.persona, "aiyana");
    }

    #[test]
    fn test_log_level() {
        let mut config = Config::default();
        let args = Args::parse_from(["a11y-personas"]);
        config.merge_with_args(&args);
        assert_eq!(config.log_level(&args), tracing::Level::INFO);

        let args = Args::parse_from(["a11y-personas", "--verbose"]);
        config.merge_with_args(&args);
        assert_eq!(config.log_level(&args), tracing::Level::DEBUG);

        let args = Args::parse_from(["a11y-personas", "--quiet"]);
        assert_eq!(config.log_level(&args), tracing::Level::ERROR);
    }

    #[test]
    fn test_verbose_from_config_file_sets_debug() {
        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let args = Args::parse_from(["a11y-personas"]);
        config.merge_with_args(&args);

        assert_eq!(config.log_level(&args), tracing::Level::DEBUG);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[evaluation]"));
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("persona = \"lakshmi\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.evaluation.persona, "lakshmi");
    }
}
