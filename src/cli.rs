//! Command-line interface argument parsing.
//!
//! Every flag is optional: with none given the tool evaluates the shared
//! scenarios for the default persona and writes the default report.

use clap::Parser;
use std::path::PathBuf;

/// a11y-personas - persona-based accessibility evaluation
///
/// Runs a simulated assistive-technology user against each scenario's
/// HTML, labels the outcome PASS, PARTIAL or FAIL, and scores the labels
/// against the scenario's expectations.
///
/// Examples:
///   a11y-personas
///   a11y-personas --persona marcus --scenarios scenarios/shared
///   a11y-personas --keep-going --markdown results/report.md
///   a11y-personas --list-personas
///   a11y-personas --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory of scenario JSON files
    ///
    /// Default: scenarios/shared, or [evaluation].scenarios_dir from the config file.
    #[arg(short, long, value_name = "DIR")]
    pub scenarios: Option<PathBuf>,

    /// Persona to evaluate with (lakshmi, marcus, aiyana)
    #[arg(short, long, value_name = "NAME")]
    pub persona: Option<String>,

    /// Output file path for the comparison report
    ///
    /// Default: results/<persona>_evaluation.json
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also save the agent's raw evaluation results to this file
    #[arg(long, value_name = "FILE")]
    pub results: Option<PathBuf>,

    /// Also write a Markdown report to this file
    #[arg(long, value_name = "FILE")]
    pub markdown: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .a11y-personas.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip scenarios that fail to load or evaluate instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Timeout in seconds when an input is a URL
    #[arg(long, value_name = "SECS", env = "A11Y_FETCH_TIMEOUT")]
    pub fetch_timeout: Option<u64>,

    /// Do not print individual issues under each scenario
    #[arg(long)]
    pub hide_issues: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List the built-in personas and exit
    #[arg(long)]
    pub list_personas: bool,

    /// Generate a default .a11y-personas.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref persona) = self.persona {
            if !crate::personas::is_known(persona) {
                return Err(format!(
                    "Unknown persona '{}'. Available: {}",
                    persona,
                    crate::personas::PERSONA_KEYS.join(", ")
                ));
            }
        }

        if self.fetch_timeout == Some(0) {
            return Err("Fetch timeout must be at least 1 second".to_string());
        }

        if let Some(ref dir) = self.scenarios {
            if dir.exists() && !dir.is_dir() {
                return Err(format!(
                    "Scenario path is not a directory: {}",
                    dir.display()
                ));
            }
        }

        Ok(())
    }
}
