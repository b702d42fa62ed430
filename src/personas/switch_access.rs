//! Switch-access persona for users with limited hand mobility.
//!
//! Switch scanning only reaches elements in the focus order, so the checks
//! here look for controls that are unreachable, reordered, time-limited or
//! visually untrackable.

use crate::agent::tools::{all_tags, find_tags, load_markup, snippet, Tag, ToolConfig, ToolOutput};
use crate::agent::Persona;
use crate::errors::AgentResult;
use crate::models::{IssueRecord, Severity};
use crate::personas::finding;
use regex::Regex;
use std::sync::LazyLock;

const TOOL: &str = "Switch Control (simulated)";
const VERSION: &str = "1.0";

const FOCUSABLE: &[&str] = &["a", "button", "input", "select", "textarea", "summary"];
const CLICK_TARGETS: &[&str] = &["div", "span", "li", "td", "img", "p"];

static OUTLINE_REMOVED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(outline\s*:\s*(?:none|0)\b[^;}]*)").expect("invalid outline pattern")
});

pub struct SwitchAccessPersona {
    config: ToolConfig,
}

impl SwitchAccessPersona {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }
}

impl Persona for SwitchAccessPersona {
    fn name(&self) -> &str {
        "Aiyana"
    }

    fn description(&self) -> &str {
        "User with limited hand mobility who navigates by scanning with a single switch"
    }

    fn run_tool(&self, input: &str) -> AgentResult<ToolOutput> {
        let markup = load_markup(input, &self.config, TOOL)?;
        let mut output = ToolOutput::new(TOOL, VERSION, markup);

        let stops: Vec<String> = scan_order(&output.markup)
            .iter()
            .enumerate()
            .map(|(i, tag)| format!("scan stop {}: {}", i + 1, snippet(&tag.raw, 60)))
            .collect();
        if stops.is_empty() {
            output.announce("no scan stops found");
        }
        for stop in stops {
            output.announce(stop);
        }

        Ok(output)
    }

    fn analyze_output(&self, output: &ToolOutput) -> Vec<IssueRecord> {
        let markup = &output.markup;
        let mut issues = Vec::new();

        check_click_handlers(markup, &mut issues);
        check_positive_tabindex(markup, &mut issues);
        check_meta_refresh(markup, &mut issues);
        check_focus_indicator(markup, &mut issues);

        issues
    }
}

fn tabindex(tag: &Tag) -> Option<i32> {
    tag.attr("tabindex").and_then(|v| v.trim().parse().ok())
}

fn is_focusable(tag: &Tag) -> bool {
    if tag.has_attr("disabled") {
        return false;
    }
    match tabindex(tag) {
        Some(index) => index >= 0,
        None => {
            FOCUSABLE.contains(&tag.name.as_str())
                && (tag.name != "a" || tag.has_attr("href"))
                && !(tag.name == "input" && tag.attr("type") == Some("hidden"))
        }
    }
}

/// Focus order: positive tabindex first in ascending order, then document order.
fn scan_order(markup: &str) -> Vec<Tag> {
    let focusable: Vec<Tag> = all_tags(markup).into_iter().filter(is_focusable).collect();

    let mut ordered: Vec<(i32, Tag)> = focusable
        .iter()
        .filter_map(|t| tabindex(t).filter(|i| *i > 0).map(|i| (i, t.clone())))
        .collect();
    ordered.sort_by_key(|(index, _)| *index);

    let mut stops: Vec<Tag> = ordered.into_iter().map(|(_, t)| t).collect();
    stops.extend(
        focusable
            .into_iter()
            .filter(|t| !tabindex(t).is_some_and(|i| i > 0)),
    );
    stops
}

fn check_click_handlers(markup: &str, issues: &mut Vec<IssueRecord>) {
    for tag in find_tags(markup, CLICK_TARGETS) {
        if tag.has_attr("onclick") && !is_focusable(&tag) {
            issues.push(finding(
                "2.1.1",
                "click_handler_not_focusable",
                Severity::Critical,
                format!(
                    "Switch Control skipped <{}> with an onclick handler; it never received a scan stop",
                    tag.name
                ),
                snippet(&tag.raw, 120),
                "Use a <button> or add tabindex=\"0\", a role, and key handlers",
            ));
        }
    }
}

fn check_positive_tabindex(markup: &str, issues: &mut Vec<IssueRecord>) {
    for tag in all_tags(markup) {
        if let Some(index) = tabindex(&tag).filter(|i| *i > 0) {
            issues.push(finding(
                "2.4.3",
                "positive_tabindex",
                Severity::Moderate,
                format!(
                    "Switch Control scanned <{}> out of document order (tabindex={})",
                    tag.name, index
                ),
                snippet(&tag.raw, 120),
                "Remove positive tabindex values and order the DOM to match the visual order",
            ));
        }
    }
}

fn check_meta_refresh(markup: &str, issues: &mut Vec<IssueRecord>) {
    for meta in find_tags(markup, &["meta"]) {
        let is_refresh = meta
            .attr("http-equiv")
            .is_some_and(|v| v.eq_ignore_ascii_case("refresh"));
        if !is_refresh {
            continue;
        }
        let delay = meta
            .attr("content")
            .and_then(|c| c.split([';', ',']).next())
            .and_then(|d| d.trim().parse::<u32>().ok())
            .unwrap_or(0);
        if delay > 0 {
            issues.push(finding(
                "2.2.1",
                "timed_refresh",
                Severity::Serious,
                format!(
                    "Page refreshed after {}s while Switch Control was still scanning",
                    delay
                ),
                snippet(&meta.raw, 120),
                "Remove the timed refresh or let the user turn off or extend it",
            ));
        }
    }
}

fn check_focus_indicator(markup: &str, issues: &mut Vec<IssueRecord>) {
    for caps in OUTLINE_REMOVED.captures_iter(markup) {
        let declaration = caps[1].trim().to_string();
        issues.push(finding(
            "2.4.7",
            "focus_indicator_removed",
            Severity::Serious,
            format!(
                "Switch Control highlight was the only visible focus cue ({})",
                declaration
            ),
            declaration,
            "Keep a visible :focus or :focus-visible style when removing the default outline",
        ));
    }
}
