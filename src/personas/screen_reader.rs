//! Screen-reader persona.
//!
//! Simulates what NVDA would announce for images, links, buttons, form
//! fields and headings, then flags what a blind user could not resolve.

use crate::agent::tools::{
    find_elements, find_tags, load_markup, snippet, visible_text, Element, Tag, ToolConfig,
    ToolOutput,
};
use crate::agent::Persona;
use crate::errors::AgentResult;
use crate::models::{IssueRecord, Severity};
use crate::personas::finding;

const TOOL: &str = "NVDA (simulated)";
const VERSION: &str = "2024.1";

const UNINFORMATIVE_ALT: &[&str] = &[
    "image", "img", "graphic", "photo", "picture", "pic", "icon", "spacer", "banner",
];

const GENERIC_LINK_TEXT: &[&str] = &[
    "click here",
    "here",
    "read more",
    "more",
    "learn more",
    "link",
    "this link",
];

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".bmp"];

const UNNAMED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image"];

const LANGUAGE_PREFIX: &str = "document language ";
const HEADING_PREFIX: &str = "heading level ";

pub struct ScreenReaderPersona {
    config: ToolConfig,
}

impl ScreenReaderPersona {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }
}

impl Persona for ScreenReaderPersona {
    fn name(&self) -> &str {
        "Lakshmi"
    }

    fn description(&self) -> &str {
        "Blind user who browses with the NVDA screen reader and keyboard navigation"
    }

    fn run_tool(&self, input: &str) -> AgentResult<ToolOutput> {
        let markup = load_markup(input, &self.config, TOOL)?;
        let mut output = ToolOutput::new(TOOL, VERSION, markup);

        for line in announcements(&output.markup) {
            output.announce(line);
        }

        Ok(output)
    }

    fn analyze_output(&self, output: &ToolOutput) -> Vec<IssueRecord> {
        let markup = &output.markup;
        let transcript = &output.output;
        let mut issues = Vec::new();

        check_language(markup, transcript, &mut issues);
        check_images(markup, &mut issues);
        check_links(markup, &mut issues);
        check_buttons(markup, &mut issues);
        check_form_fields(markup, &mut issues);
        check_headings(markup, transcript, &mut issues);

        issues
    }
}

/// The transcript NVDA would produce reading the page top to bottom.
fn announcements(markup: &str) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(lang) = find_tags(markup, &["html"])
        .first()
        .and_then(|t| t.non_empty_attr("lang"))
    {
        lines.push(format!("{}{}", LANGUAGE_PREFIX, lang));
    }

    for (level, heading) in headings(markup) {
        lines.push(format!("{}{}, {}", HEADING_PREFIX, level, heading.text));
    }
    lines.extend(find_tags(markup, &["img"]).iter().filter_map(announce_image));
    lines.extend(links(markup).iter().map(announce_link));
    lines.extend(find_elements(markup, "button").iter().map(announce_button));

    let labels = find_elements(markup, "label");
    for field in form_fields(markup) {
        lines.push(announce_field(&field, &labels));
    }

    lines
}

fn evidence(announcement: &str) -> String {
    format!("NVDA announced: \"{}\"", announcement)
}

fn is_hidden(tag: &Tag) -> bool {
    tag.attr("aria-hidden") == Some("true")
        || matches!(tag.attr("role"), Some("presentation") | Some("none"))
}

fn file_name(src: &str) -> &str {
    src.rsplit('/').next().unwrap_or(src)
}

fn announce_image(tag: &Tag) -> Option<String> {
    if is_hidden(tag) {
        return None;
    }
    match tag.attr("alt") {
        None => Some(format!(
            "graphic, {}",
            file_name(tag.attr("src").unwrap_or("unlabeled"))
        )),
        Some(alt) if alt.trim().is_empty() => None,
        Some(alt) => Some(format!("graphic, {}", alt.trim())),
    }
}

fn is_uninformative_alt(alt: &str) -> bool {
    let alt = alt.trim().to_lowercase();
    UNINFORMATIVE_ALT.contains(&alt.as_str()) || IMAGE_EXTENSIONS.iter().any(|ext| alt.ends_with(ext))
}

/// Accessible name for a link or button.
fn element_name(element: &Element) -> Option<String> {
    if let Some(label) = element.tag.non_empty_attr("aria-label") {
        return Some(label.to_string());
    }
    if !element.text.is_empty() {
        return Some(element.text.clone());
    }
    find_tags(&element.inner, &["img"])
        .iter()
        .find_map(|img| img.non_empty_attr("alt").map(String::from))
        .or_else(|| element.tag.non_empty_attr("title").map(String::from))
}

fn links(markup: &str) -> Vec<Element> {
    find_elements(markup, "a")
        .into_iter()
        .filter(|a| a.tag.has_attr("href"))
        .collect()
}

fn announce_link(link: &Element) -> String {
    match element_name(link) {
        Some(name) => format!("link, {}", name),
        None => "link".to_string(),
    }
}

fn announce_button(button: &Element) -> String {
    match element_name(button) {
        Some(name) => format!("button, {}", name),
        None => "button".to_string(),
    }
}

fn form_fields(markup: &str) -> Vec<Tag> {
    find_tags(markup, &["input", "select", "textarea"])
        .into_iter()
        .filter(|tag| {
            let kind = tag.attr("type").unwrap_or("text").to_lowercase();
            !(tag.name == "input" && UNNAMED_INPUT_TYPES.contains(&kind.as_str()))
        })
        .collect()
}

fn field_role(field: &Tag) -> &'static str {
    match field.name.as_str() {
        "select" => "combo box",
        "textarea" => "edit multi line",
        _ => match field.attr("type").map(str::to_lowercase).as_deref() {
            Some("checkbox") => "check box",
            Some("radio") => "radio button",
            _ => "edit",
        },
    }
}

/// Accessible name for a form control, without falling back to placeholder.
fn field_name(field: &Tag, labels: &[Element]) -> Option<String> {
    if let Some(label) = field.non_empty_attr("aria-label") {
        return Some(label.to_string());
    }
    if let Some(ids) = field.non_empty_attr("aria-labelledby") {
        return Some(format!("labelled by {}", ids));
    }
    if let Some(id) = field.non_empty_attr("id") {
        let explicit = labels
            .iter()
            .find(|l| l.tag.attr("for").map(str::trim) == Some(id));
        if let Some(label) = explicit.filter(|l| !l.text.is_empty()) {
            return Some(label.text.clone());
        }
    }
    if let Some(label) = labels
        .iter()
        .find(|l| l.inner.contains(&field.raw) && !l.text.is_empty())
    {
        return Some(label.text.clone());
    }
    field.non_empty_attr("title").map(String::from)
}

fn announce_field(field: &Tag, labels: &[Element]) -> String {
    let role = field_role(field);
    match field_name(field, labels) {
        Some(name) => format!("{}, {}", name, role),
        None => match field.non_empty_attr("placeholder") {
            Some(placeholder) => format!("{}, {}", role, placeholder),
            None => format!("{}, blank", role),
        },
    }
}

fn headings(markup: &str) -> Vec<(u8, Element)> {
    let mut found = Vec::new();
    for level in 1..=6u8 {
        for heading in find_elements(markup, &format!("h{}", level)) {
            found.push((level, heading));
        }
    }
    found
}

fn announced(transcript: &[String], prefix: &str) -> bool {
    transcript.iter().any(|line| line.starts_with(prefix))
}

fn check_language(markup: &str, transcript: &[String], issues: &mut Vec<IssueRecord>) {
    if announced(transcript, LANGUAGE_PREFIX) {
        return;
    }
    let Some(html) = find_tags(markup, &["html"]).into_iter().next() else {
        return;
    };
    issues.push(finding(
        "3.1.1",
        "missing_page_language",
        Severity::Moderate,
        "NVDA read the page with the default synthesizer language".to_string(),
        snippet(&html.raw, 80),
        "Add a lang attribute to the <html> element, e.g. lang=\"en\"",
    ));
}

fn check_images(markup: &str, issues: &mut Vec<IssueRecord>) {
    for img in find_tags(markup, &["img"]) {
        let Some(announcement) = announce_image(&img) else {
            continue;
        };
        match img.attr("alt") {
            None => issues.push(finding(
                "1.1.1",
                "missing_alt_text",
                Severity::Critical,
                evidence(&announcement),
                snippet(&img.raw, 120),
                "Add alt text describing the image, or alt=\"\" if it is decorative",
            )),
            Some(alt) if is_uninformative_alt(alt) => issues.push(finding(
                "1.1.1",
                "uninformative_alt_text",
                Severity::Critical,
                evidence(&announcement),
                snippet(&img.raw, 120),
                "Replace the alt text with a description of what the image shows",
            )),
            Some(_) => {}
        }
    }
}

fn check_links(markup: &str, issues: &mut Vec<IssueRecord>) {
    for link in links(markup) {
        match element_name(&link) {
            None => issues.push(finding(
                "2.4.4",
                "empty_link",
                Severity::Serious,
                evidence(&announce_link(&link)),
                snippet(&link.tag.raw, 120),
                "Give the link text or an aria-label that describes its destination",
            )),
            Some(name) if GENERIC_LINK_TEXT.contains(&name.trim().to_lowercase().as_str()) => {
                issues.push(finding(
                    "2.4.4",
                    "generic_link_text",
                    Severity::Moderate,
                    evidence(&announce_link(&link)),
                    snippet(&link.tag.raw, 120),
                    "Use link text that makes sense out of context",
                ))
            }
            Some(_) => {}
        }
    }
}

fn check_buttons(markup: &str, issues: &mut Vec<IssueRecord>) {
    for button in find_elements(markup, "button") {
        if element_name(&button).is_none() {
            issues.push(finding(
                "4.1.2",
                "unlabeled_button",
                Severity::Critical,
                evidence(&announce_button(&button)),
                snippet(&button.tag.raw, 120),
                "Add visible text or an aria-label to the button",
            ));
        }
    }
}

fn check_form_fields(markup: &str, issues: &mut Vec<IssueRecord>) {
    let labels = find_elements(markup, "label");

    for field in form_fields(markup) {
        if field_name(&field, &labels).is_some() {
            continue;
        }
        let announcement = announce_field(&field, &labels);
        if field.non_empty_attr("placeholder").is_some() {
            issues.push(finding(
                "3.3.2",
                "placeholder_as_label",
                Severity::Serious,
                evidence(&announcement),
                snippet(&field.raw, 120),
                "Add a persistent <label>; placeholder text disappears on input",
            ));
        } else {
            issues.push(finding(
                "4.1.2",
                "unlabeled_form_field",
                Severity::Critical,
                evidence(&announcement),
                snippet(&field.raw, 120),
                "Associate a <label for> with the field or give it an aria-label",
            ));
        }
    }
}

fn check_headings(markup: &str, transcript: &[String], issues: &mut Vec<IssueRecord>) {
    if announced(transcript, HEADING_PREFIX) || visible_text(markup).is_empty() {
        return;
    }
    issues.push(finding(
        "1.3.1",
        "missing_headings",
        Severity::Minor,
        "NVDA announced: \"no next heading\"".to_string(),
        "document".to_string(),
        "Structure the content with h1-h6 headings",
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::lifecycle::determine_label;
    use crate::agent::Agent;
    use crate::models::Label;

    fn analyze(html: &str) -> Vec<IssueRecord> {
        let persona = ScreenReaderPersona::new(ToolConfig::default());
        let output = persona.run_tool(html).unwrap();
        persona.analyze_output(&output)
    }

    fn issue_types(issues: &[IssueRecord]) -> Vec<&str> {
        issues.iter().map(|i| i.issue_type.as_str()).collect()
    }

    #[test]
    fn test_accessible_page_passes() {
        let html = r#"<html lang="en"><body><h1>Shop</h1>
            <img src="shoe.jpg" alt="Red running shoe, side view">
            <img src="divider.png" alt="">
            <a href="/shoes">Browse running shoes</a>
            <label for="q">Search</label><input id="q" type="search">
            <button>Add to cart</button></body></html>"#;

        let issues = analyze(html);
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
        assert_eq!(determine_label(&issues), Label::Pass);
    }

    #[test]
    fn test_missing_and_uninformative_alt() {
        let html = r#"<html lang="en"><h1>T</h1>
            <img src="/img/product.jpg"><img src="b.png" alt="image"><img src="c.png" alt="IMG_2231.JPG"></html>"#;

        let issues = analyze(html);
        assert_eq!(
            issue_types(&issues),
            vec!["missing_alt_text", "uninformative_alt_text", "uninformative_alt_text"]
        );
        assert_eq!(issues[0].evidence, "NVDA announced: \"graphic, product.jpg\"");
        assert!(issues.iter().all(|i| i.severity == Severity::Critical));
        assert_eq!(issues[0].wcag_criterion, "1.1.1");
    }

    #[test]
    fn test_hidden_images_are_skipped() {
        let html = r#"<h1>T</h1><img src="x.png" aria-hidden="true"><img src="y.png" role="presentation">"#;
        assert!(analyze(html).is_empty());
    }

    #[test]
    fn test_link_checks() {
        let html = r#"<h1>News</h1>
            <a href="/a"></a>
            <a href="/b">Click here</a>
            <a href="/c"><img src="logo.png" alt="Home"></a>
            <a name="anchor"></a>"#;

        let issues = analyze(html);
        assert_eq!(issue_types(&issues), vec!["empty_link", "generic_link_text"]);
        assert_eq!(issues[0].severity, Severity::Serious);
        assert_eq!(issues[1].severity, Severity::Moderate);
        assert_eq!(determine_label(&issues), Label::Partial);
    }

    #[test]
    fn test_icon_button_without_name_fails() {
        let html = r#"<h1>T</h1><button><svg></svg></button><button aria-label="Close"></button>"#;
        let issues = analyze(html);
        assert_eq!(issue_types(&issues), vec!["unlabeled_button"]);
        assert_eq!(issues[0].evidence, "NVDA announced: \"button\"");
    }

    #[test]
    fn test_form_field_labels() {
        let html = r#"<h1>Sign up</h1>
            <label>Email <input type="email" name="email"></label>
            <input type="text" placeholder="Phone">
            <input type="password">
            <input type="hidden" name="csrf">
            <input type="submit" value="Go">
            <select aria-label="Country"></select>"#;

        let issues = analyze(html);
        assert_eq!(
            issue_types(&issues),
            vec!["placeholder_as_label", "unlabeled_form_field"]
        );
        assert_eq!(issues[0].evidence, "NVDA announced: \"edit, Phone\"");
        assert_eq!(issues[1].evidence, "NVDA announced: \"edit, blank\"");
    }

    #[test]
    fn test_missing_lang_and_headings() {
        let html = "<html><body><p>Welcome to the store.</p></body></html>";
        let issues = analyze(html);
        assert_eq!(
            issue_types(&issues),
            vec!["missing_page_language", "missing_headings"]
        );
        assert_eq!(determine_label(&issues), Label::Partial);
    }

    #[test]
    fn test_language_and_headings_come_from_transcript() {
        let persona = ScreenReaderPersona::new(ToolConfig::default());
        let mut output = persona
            .run_tool(r#"<html lang="en"><h1>Store</h1><p>Welcome.</p></html>"#)
            .unwrap();
        assert!(persona.analyze_output(&output).is_empty());

        output.output.clear();
        let issues = persona.analyze_output(&output);
        assert_eq!(
            issue_types(&issues),
            vec!["missing_page_language", "missing_headings"]
        );
    }

    #[test]
    fn test_transcript_is_recorded() {
        let persona = ScreenReaderPersona::new(ToolConfig::default());
        let output = persona
            .run_tool(r#"<html lang="en"><h2>Deals</h2><a href="/x">Today's deals</a></html>"#)
            .unwrap();

        assert_eq!(output.tool_name(), TOOL);
        assert_eq!(
            output.output,
            vec![
                "document language en".to_string(),
                "heading level 2, Deals".to_string(),
                "link, Today's deals".to_string(),
            ]
        );
    }

    #[test]
    fn test_through_agent() {
        let mut agent = Agent::new(ScreenReaderPersona::new(ToolConfig::default()));
        let result = agent.evaluate(r#"<h1>T</h1><img src="a.png">"#).unwrap();

        assert_eq!(result.persona, "Lakshmi");
        assert_eq!(result.tool_used, "NVDA (simulated)");
        assert_eq!(result.label, Label::Fail);
    }
}
