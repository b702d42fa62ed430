//! a11y-personas - persona-based accessibility evaluation harness
//!
//! Runs a simulated assistive-technology user against every scenario in a
//! directory, compares the resulting PASS/PARTIAL/FAIL labels with the
//! scenarios' expectations, and writes a JSON accuracy report.
//!
//! Exit codes:
//!   0 - Run completed and reports were written (accuracy is not encoded)
//!   1 - Runtime error (bad config, unreadable scenario, write failure, etc.)

mod agent;
mod analysis;
mod cli;
mod config;
mod errors;
mod models;
mod personas;
mod report;
mod scenario;

use agent::{Agent, Persona, ToolConfig};
use anyhow::{anyhow, Context, Result};
use cli::Args;
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{ComparisonRecord, ComparisonReport, Summary};
use scenario::{BatchEvent, BatchOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::FmtSubscriber;

const RULE_WIDTH: usize = 60;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle early-exit flags (no logging needed)
    if args.init_config {
        return handle_init_config();
    }
    if args.list_personas {
        handle_list_personas();
        return Ok(());
    }

    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(config.log_level(&args));

    info!("a11y-personas v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    log_config_source(&source);

    if let Err(e) = run_evaluation(&config, args.quiet) {
        error!("Evaluation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Where the configuration came from, logged once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    DefaultFileInvalid(anyhow::Error),
}

/// Handle --init-config: generate a default .a11y-personas.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    Ok(())
}

/// Handle --list-personas.
fn handle_list_personas() {
    let tool_config = ToolConfig::default();
    println!("Available personas:");
    for key in personas::PERSONA_KEYS {
        if let Some(persona) = personas::build(key, &tool_config) {
            println!("  {:<10} {} - {}", key, persona.name(), persona.description());
        }
    }
}

/// Initialize logging at the configured level. `RUST_LOG` overrides.
fn init_logging(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so the outcome is returned for
/// [`log_config_source`] instead of being logged here.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::DefaultFileInvalid(e))),
    }
}

fn log_config_source(source: &ConfigSource) {
    match source {
        ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
        ConfigSource::DefaultFile => info!("Loaded default config from {}", config::CONFIG_FILE),
        ConfigSource::Defaults => debug!("No config file found, using defaults"),
        ConfigSource::DefaultFileInvalid(e) => warn!("Failed to load config: {:#}", e),
    }
}

/// Run every scenario through the configured persona and write the reports.
fn run_evaluation(config: &Config, quiet: bool) -> Result<()> {
    let tool_config = ToolConfig {
        fetch_timeout_seconds: config.evaluation.fetch_timeout_seconds,
    };
    let persona = personas::build(&config.evaluation.persona, &tool_config).ok_or_else(|| {
        anyhow!(
            "Unknown persona '{}'. Available: {}",
            config.evaluation.persona,
            personas::PERSONA_KEYS.join(", ")
        )
    })?;
    let mut agent = Agent::new(persona);

    let scenarios_dir = &config.evaluation.scenarios_dir;
    let options = BatchOptions {
        keep_going: config.evaluation.keep_going,
    };

    let report = if quiet {
        scenario::compare_directory(&mut agent, scenarios_dir, options)?
    } else {
        run_with_progress(&mut agent, scenarios_dir, options, config.report.show_issues)?
    };

    let output_path = config.output_path();
    scenario::save_report(&report, &output_path)?;

    if let Some(ref markdown_path) = config.report.markdown {
        report::write_text_atomic(&report::generate_markdown_report(&report), markdown_path)
            .with_context(|| {
                format!("Failed to write Markdown report to {}", markdown_path.display())
            })?;
        info!("Markdown report saved to {}", markdown_path.display());
    }

    if let Some(ref results_path) = config.general.results {
        debug!("Saving {} evaluation results", agent.results().len());
        agent
            .save_results(results_path)
            .with_context(|| format!("Failed to save results to {}", results_path.display()))?;
    }

    if !quiet {
        print_overall(&report, &agent.summary());
        println!("\n✅ Results saved to {}", output_path.display());
    }

    Ok(())
}

/// Compare every scenario with a progress bar and a printed block per scenario.
fn run_with_progress(
    agent: &mut Agent,
    scenarios_dir: &Path,
    options: BatchOptions,
    show_issues: bool,
) -> Result<ComparisonReport> {
    let files = scenario::discover_scenarios(scenarios_dir)
        .with_context(|| format!("Failed to list scenarios in {}", scenarios_dir.display()))?;

    println!(
        "🧑‍🦯 Persona: {} - {}",
        agent.persona_name(),
        agent.persona_description()
    );
    println!(
        "📂 Scenarios: {} ({} files)",
        scenarios_dir.display(),
        files.len()
    );

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let report = scenario::run_batch(agent, &files, options, |event| match event {
        BatchEvent::Started { file } => {
            progress.set_message(display_name(file));
        }
        BatchEvent::Compared { file, comparison } => {
            progress.suspend(|| print_comparison(file, comparison, show_issues));
            progress.inc(1);
        }
        BatchEvent::Skipped { file, error } => {
            progress.suspend(|| println!("\n⚠️  Skipped {}: {}", display_name(file), error));
            progress.inc(1);
        }
    });
    progress.finish_and_clear();

    Ok(report?)
}

fn display_name(file: &Path) -> String {
    file.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string())
}

fn print_comparison(file: &Path, comparison: &ComparisonRecord, show_issues: bool) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("Evaluating: {}", display_name(file));
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Expected: {}", comparison.expected_label);
    println!("Agent:    {}", comparison.agent_label);
    println!("Match:    {}", if comparison.is_match { "✓" } else { "✗" });

    if show_issues {
        println!("\nAgent found {} issues:", comparison.agent_found);
        for issue in &comparison.agent_issues {
            println!(
                "  - {} {}: {}",
                issue.severity.emoji(),
                issue.issue_type,
                issue.evidence
            );
        }
    }
}

fn print_overall(report: &ComparisonReport, summary: &Summary) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("OVERALL RESULTS");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Scenarios evaluated: {}", report.summary.total_scenarios);
    println!("Matches: {}", report.summary.matches);
    println!("Accuracy: {:.2}%", report.summary.accuracy * 100.0);

    if !report.skipped.is_empty() {
        println!("Skipped: {}", report.skipped.len());
    }

    println!(
        "Evaluations: {} | Issues: {}",
        summary.evaluations_performed(),
        summary.total_issues()
    );
    if let Summary::Populated {
        severity_breakdown, ..
    } = summary
    {
        println!(
            "🔴 Critical: {} | 🟠 Serious: {} | 🟡 Moderate: {} | 🟢 Minor: {}",
            severity_breakdown.critical,
            severity_breakdown.serious,
            severity_breakdown.moderate,
            severity_breakdown.minor
        );
    }
    if let Some(pass_rate) = summary.pass_rate() {
        println!("Pass rate: {:.2}%", pass_rate * 100.0);
    }
}
