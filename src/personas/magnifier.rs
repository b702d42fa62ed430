//! Low-vision persona using a screen magnifier at high zoom.

use crate::agent::tools::{find_tags, load_markup, snippet, Tag, ToolConfig, ToolOutput};
use crate::agent::Persona;
use crate::errors::AgentResult;
use crate::models::{IssueRecord, Severity};
use crate::personas::finding;
use regex::Regex;
use std::sync::LazyLock;

const TOOL: &str = "ZoomText (simulated)";
const VERSION: &str = "2024";

/// CSS pixel width a page must reflow into at 400% zoom on a 1280px screen.
const REFLOW_WIDTH_PX: f64 = 320.0;
const MIN_FONT_SIZE_PX: f64 = 12.0;
const MIN_MAXIMUM_SCALE: f64 = 2.0;

const ZOOM_BLOCKED_PREFIX: &str = "pinch zoom blocked: ";

static FIXED_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|[\s;{"'])((?:min-)?width\s*:\s*(\d+(?:\.\d+)?)px)"#)
        .expect("invalid width pattern")
});

static FONT_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(font-size\s*:\s*(\d+(?:\.\d+)?)px)").expect("invalid font-size pattern")
});

static SPACING_OVERRIDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)((?:line-height|letter-spacing|word-spacing)\s*:[^;"'}]*!important)"#)
        .expect("invalid spacing pattern")
});

pub struct MagnifierPersona {
    config: ToolConfig,
}

impl MagnifierPersona {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }
}

impl Persona for MagnifierPersona {
    fn name(&self) -> &str {
        "Marcus"
    }

    fn description(&self) -> &str {
        "Low-vision user who reads at 400% zoom with a screen magnifier"
    }

    fn run_tool(&self, input: &str) -> AgentResult<ToolOutput> {
        let markup = load_markup(input, &self.config, TOOL)?;
        let mut output = ToolOutput::new(TOOL, VERSION, markup);

        let lines = observations(&output.markup);
        for line in lines {
            output.announce(line);
        }

        Ok(output)
    }

    fn analyze_output(&self, output: &ToolOutput) -> Vec<IssueRecord> {
        let markup = &output.markup;
        let mut issues = Vec::new();

        check_viewport(markup, &output.output, &mut issues);
        check_fixed_widths(markup, &mut issues);
        check_font_sizes(markup, &mut issues);
        check_text_spacing(markup, &mut issues);

        issues
    }
}

fn observations(markup: &str) -> Vec<String> {
    let mut lines = vec!["zoom set to 400%".to_string()];

    match viewport_restriction(markup) {
        Some((_, reason)) => lines.push(format!("{}{}", ZOOM_BLOCKED_PREFIX, reason)),
        None => lines.push("pinch zoom available".to_string()),
    }
    for (declaration, px) in fixed_widths(markup) {
        lines.push(format!(
            "horizontal scrolling required: {} ({}px wider than viewport)",
            declaration,
            px - REFLOW_WIDTH_PX
        ));
    }
    for (declaration, _) in small_fonts(markup) {
        lines.push(format!("small text before zoom: {}", declaration));
    }

    lines
}

fn parse_px(value: &str) -> f64 {
    value.parse().unwrap_or(0.0)
}

/// Returns the viewport meta tag and why it blocks zooming.
fn viewport_restriction(markup: &str) -> Option<(String, String)> {
    let meta = viewport_meta(markup)?;
    let content = meta.attr("content")?.to_lowercase();

    for part in content.split([',', ';']) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "user-scalable" if value == "no" || value == "0" => {
                return Some((meta.raw.clone(), format!("user-scalable={}", value)));
            }
            "maximum-scale" => {
                if let Ok(scale) = value.parse::<f64>() {
                    if scale < MIN_MAXIMUM_SCALE {
                        return Some((meta.raw.clone(), format!("maximum-scale={}", value)));
                    }
                }
            }
            _ => {}
        }
    }

    None
}

fn viewport_meta(markup: &str) -> Option<Tag> {
    find_tags(markup, &["meta"])
        .into_iter()
        .find(|t| t.attr("name").map(str::to_lowercase).as_deref() == Some("viewport"))
}

fn fixed_widths(markup: &str) -> Vec<(String, f64)> {
    FIXED_WIDTH
        .captures_iter(markup)
        .map(|caps| (caps[1].to_string(), parse_px(&caps[2])))
        .filter(|(_, px)| *px > REFLOW_WIDTH_PX)
        .collect()
}

fn small_fonts(markup: &str) -> Vec<(String, f64)> {
    FONT_SIZE
        .captures_iter(markup)
        .map(|caps| (caps[1].to_string(), parse_px(&caps[2])))
        .filter(|(_, px)| *px < MIN_FONT_SIZE_PX)
        .collect()
}

fn check_viewport(markup: &str, observations: &[String], issues: &mut Vec<IssueRecord>) {
    let Some(reason) = observations
        .iter()
        .find_map(|line| line.strip_prefix(ZOOM_BLOCKED_PREFIX))
    else {
        return;
    };
    let element = viewport_meta(markup)
        .map(|meta| snippet(&meta.raw, 160))
        .unwrap_or_else(|| "meta[name=viewport]".to_string());
    issues.push(finding(
        "1.4.4",
        "zoom_disabled",
        Severity::Critical,
        format!("ZoomText reported: pinch zoom blocked by {}", reason),
        element,
        "Remove user-scalable=no and any maximum-scale below 2 from the viewport meta tag",
    ));
}

fn check_fixed_widths(markup: &str, issues: &mut Vec<IssueRecord>) {
    for (declaration, px) in fixed_widths(markup) {
        issues.push(finding(
            "1.4.10",
            "fixed_width_layout",
            Severity::Serious,
            format!(
                "ZoomText reported: content {}px wide forces horizontal scrolling at 400%",
                px
            ),
            declaration,
            "Use relative widths or max-width so content reflows at 320 CSS pixels",
        ));
    }
}

fn check_font_sizes(markup: &str, issues: &mut Vec<IssueRecord>) {
    for (declaration, px) in small_fonts(markup) {
        issues.push(finding(
            "1.4.4",
            "small_font_size",
            Severity::Moderate,
            format!("ZoomText reported: {}px text is hard to read even when magnified", px),
            declaration,
            "Use a base font size of at least 16px in rem or em units",
        ));
    }
}

fn check_text_spacing(markup: &str, issues: &mut Vec<IssueRecord>) {
    for caps in SPACING_OVERRIDE.captures_iter(markup) {
        let declaration = caps[1].to_string();
        issues.push(finding(
            "1.4.12",
            "text_spacing_locked",
            Severity::Minor,
            format!(
                "ZoomText reported: custom text spacing overridden by {}",
                declaration
            ),
            declaration,
            "Drop !important from spacing properties so user styles can apply",
        ));
    }
}
