//! Tool plumbing shared by the personas.
//!
//! This module defines the raw output every tool hands back to the
//! lifecycle, loads the markup an evaluation runs against, and provides
//! the small markup scanners the reference personas are built on.

use crate::errors::{AgentError, AgentResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Tool name recorded when the tool output does not carry one.
pub const UNKNOWN_TOOL: &str = "unknown";

/// Raw output of an assistive technology or testing tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Tool identifier; `None` is an accepted degraded output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Announcements or observations, in the order the tool produced them.
    #[serde(default)]
    pub output: Vec<String>,
    /// Markup the tool ran against.
    #[serde(default)]
    pub markup: String,
    pub timestamp: DateTime<Utc>,
}

impl ToolOutput {
    pub fn new(tool: &str, version: &str, markup: String) -> Self {
        Self {
            tool: Some(tool.to_string()),
            version: Some(version.to_string()),
            output: Vec::new(),
            markup,
            timestamp: Utc::now(),
        }
    }

    pub fn tool_name(&self) -> &str {
        self.tool.as_deref().unwrap_or(UNKNOWN_TOOL)
    }

    pub fn announce(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }
}

/// Settings for tools that need to reach the network.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub fetch_timeout_seconds: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: 30,
        }
    }
}

/// Returns true when the input should be fetched rather than parsed.
pub fn is_url(input: &str) -> bool {
    let trimmed = input.trim_start();
    trimmed.starts_with("http://") || trimmed.starts_with("https://")
}

/// Resolve an evaluation input into markup: URLs are fetched, anything else
/// is treated as HTML.
pub fn load_markup(input: &str, config: &ToolConfig, tool: &str) -> AgentResult<String> {
    if !is_url(input) {
        return Ok(input.to_string());
    }

    let url = input.trim();
    debug!("Fetching {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_seconds))
        .build()
        .map_err(|e| AgentError::tool(tool, format!("Failed to build HTTP client: {}", e)))?;

    let response = client.get(url).send().map_err(|e| {
        if e.is_timeout() {
            AgentError::tool(
                tool,
                format!("Request timed out after {}s", config.fetch_timeout_seconds),
            )
        } else if e.is_connect() {
            AgentError::tool(tool, format!("Cannot connect to {}", url))
        } else {
            AgentError::tool(tool, format!("Failed to fetch {}: {}", url, e))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AgentError::tool(tool, format!("{} returned {}", url, status)));
    }

    response
        .text()
        .map_err(|e| AgentError::tool(tool, format!("Failed to read body of {}: {}", url, e)))
}

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:@][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("invalid attribute pattern")
});

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("invalid tag pattern"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid whitespace pattern"));

/// An opening tag found in markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// Lower-cased element name.
    pub name: String,
    /// The tag exactly as written.
    pub raw: String,
    /// Attributes with lower-cased names. Valueless attributes map to "".
    pub attributes: BTreeMap<String, String>,
}

impl Tag {
    fn parse(name: &str, raw: &str, attribute_text: &str) -> Self {
        let mut attributes = BTreeMap::new();
        for caps in ATTRIBUTE.captures_iter(attribute_text) {
            let key = caps[1].to_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            attributes.entry(key).or_insert(value);
        }

        Self {
            name: name.to_lowercase(),
            raw: raw.to_string(),
            attributes,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attribute value trimmed, `None` when absent or blank.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|v| !v.is_empty())
    }
}

/// An element with its text content.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    /// Inner text with nested tags removed and whitespace collapsed.
    pub text: String,
    /// Inner markup as written.
    pub inner: String,
}

/// Find every opening tag for the given element names.
pub fn find_tags(markup: &str, names: &[&str]) -> Vec<Tag> {
    let pattern = format!(r"(?is)<({})\b([^>]*)>", names.join("|"));
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    re.captures_iter(markup)
        .map(|caps| Tag::parse(&caps[1], &caps[0], &caps[2]))
        .collect()
}

/// Every opening tag in the document, in order.
pub fn all_tags(markup: &str) -> Vec<Tag> {
    find_tags(markup, &["[a-z][a-z0-9-]*"])
}

/// Find elements of one kind together with their content.
pub fn find_elements(markup: &str, name: &str) -> Vec<Element> {
    let pattern = format!(r"(?is)<({name})\b([^>]*)>(.*?)</{name}\s*>");
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    re.captures_iter(markup)
        .map(|caps| {
            let inner = caps[3].to_string();
            Element {
                tag: Tag::parse(&caps[1], &caps[0], &caps[2]),
                text: strip_tags(&inner),
                inner,
            }
        })
        .collect()
}

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<head\b.*?</head\s*>")
        .expect("invalid hidden block pattern")
});

/// Text a user would perceive: scripts, styles and the document head removed.
pub fn visible_text(markup: &str) -> String {
    strip_tags(&HIDDEN_BLOCKS.replace_all(markup, " "))
}

/// Remove tags and collapse whitespace.
pub fn strip_tags(markup: &str) -> String {
    let text = MARKUP_TAG.replace_all(markup, " ");
    WHITESPACE.replace_all(text.trim(), " ").to_string()
}

/// Shorten a snippet for evidence fields.
pub fn snippet(raw: &str, max_chars: usize) -> String {
    let collapsed = WHITESPACE.replace_all(raw.trim(), " ");
    if collapsed.chars().count() > max_chars {
        let head: String = collapsed.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        collapsed.to_string()
    }
}
