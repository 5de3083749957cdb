//! Markdown rendering of sanitized fragments.
//!
//! Conversion is delegated to htmd with a fixed rule set plus element
//! overrides for images and task-list checkboxes. Rendering is a pure
//! function of its inputs.

use std::sync::LazyLock;

use htmd::options::{self, Options};
use htmd::{Element, HtmlToMarkdown, element_handler::Handlers};
use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use regex::Regex;

use crate::{MarksiftError, Result};

static ABSOLUTE_HTTP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("ABSOLUTE_HTTP: hardcoded regex is valid"));

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("BLANK_RUNS: hardcoded regex is valid"));

/// Heading markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// `#` repeated to the heading depth
    #[default]
    Atx,
    /// Underlined with `=` or `-`
    Setext,
}

/// Code block layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    #[default]
    Fenced,
    Indented,
}

/// Fence characters for fenced code blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeFence {
    #[default]
    Backticks,
    Tildes,
}

/// Horizontal rule token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleToken {
    /// `---`
    #[default]
    Dashes,
    /// `***`
    Asterisks,
    /// `___`
    Underscores,
}

impl RuleToken {
    /// The literal rule line
    pub fn as_str(self) -> &'static str {
        match self {
            RuleToken::Dashes => "---",
            RuleToken::Asterisks => "***",
            RuleToken::Underscores => "___",
        }
    }
}

/// Unordered list marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulletMarker {
    #[default]
    Dash,
    Asterisk,
}

/// Rule set for Markdown conversion
///
/// The image rule is not configurable: only absolute http(s) images are
/// ever emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRules {
    pub heading_style: HeadingStyle,
    pub code_block_style: CodeBlockStyle,
    pub code_fence: CodeFence,
    pub rule_token: RuleToken,
    pub bullet_marker: BulletMarker,
    /// Render tables and task-list checkboxes
    pub gfm: bool,
}

impl Default for RenderRules {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            code_fence: CodeFence::Backticks,
            rule_token: RuleToken::Dashes,
            bullet_marker: BulletMarker::Dash,
            gfm: true,
        }
    }
}

impl RenderRules {
    fn options(&self) -> Options {
        Options {
            heading_style: match self.heading_style {
                HeadingStyle::Atx => options::HeadingStyle::Atx,
                HeadingStyle::Setext => options::HeadingStyle::Setex,
            },
            code_block_style: match self.code_block_style {
                CodeBlockStyle::Fenced => options::CodeBlockStyle::Fenced,
                CodeBlockStyle::Indented => options::CodeBlockStyle::Indented,
            },
            code_block_fence: match self.code_fence {
                CodeFence::Backticks => options::CodeBlockFence::Backticks,
                CodeFence::Tildes => options::CodeBlockFence::Tildes,
            },
            hr_style: match self.rule_token {
                RuleToken::Dashes => options::HrStyle::Dashes,
                RuleToken::Asterisks => options::HrStyle::Asterisks,
                RuleToken::Underscores => options::HrStyle::Underscores,
            },
            bullet_list_marker: match self.bullet_marker {
                BulletMarker::Dash => options::BulletListMarker::Dash,
                BulletMarker::Asterisk => options::BulletListMarker::Asterisk,
            },
            ..Default::default()
        }
    }

    fn converter(&self) -> HtmlToMarkdown {
        let gfm = self.gfm;
        let rule = self.rule_token.as_str();
        HtmlToMarkdown::builder()
            .options(self.options())
            .add_handler(vec!["hr"], move |_: &dyn Handlers, _: Element| Some(format!("\n\n{rule}\n\n").into()))
            .add_handler(vec!["img"], |_: &dyn Handlers, element: Element| Some(render_image(&element).into()))
            .add_handler(vec!["input"], move |_: &dyn Handlers, element: Element| {
                Some(render_checkbox(&element, gfm).into())
            })
            .build()
    }
}

/// Convert a sanitized fragment to Markdown
///
/// # Example
///
/// ```rust
/// use marksift_core::{RenderRules, render};
///
/// let md = render("<h1>T</h1><p>Hello <b>world</b></p>", &RenderRules::default()).unwrap();
/// assert_eq!(md, "# T\n\nHello **world**");
/// ```
pub fn render(html: &str, rules: &RenderRules) -> Result<String> {
    let html = if rules.gfm { html.to_string() } else { flatten_tables(html)? };

    let markdown = rules
        .converter()
        .convert(&html)
        .map_err(|e| MarksiftError::RenderError(e.to_string()))?;

    Ok(BLANK_RUNS.replace_all(&markdown, "\n\n").trim().to_string())
}

/// Unwrap table markup so cells degrade to plain lines of text
fn flatten_tables(html: &str) -> Result<String> {
    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("td, th", |el| {
                    el.after(" ", ContentType::Text);
                    el.remove_and_keep_content();
                    Ok(())
                }),
                element!("tr", |el| {
                    el.after("<br>", ContentType::Html);
                    el.remove_and_keep_content();
                    Ok(())
                }),
                element!("table, thead, tbody, tfoot, caption", |el| {
                    el.before("<p>", ContentType::Html);
                    el.after("</p>", ContentType::Html);
                    el.remove_and_keep_content();
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )?;
    Ok(output)
}

fn attr<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element
        .attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| &*attr.value)
}

/// Images survive only with an absolute http(s) source
fn render_image(element: &Element) -> String {
    let src = attr(element, "src").unwrap_or_default().trim();
    if !ABSOLUTE_HTTP.is_match(src) {
        return String::new();
    }

    let alt = escape_alt(attr(element, "alt").unwrap_or_default());
    match attr(element, "title").filter(|title| !title.is_empty()) {
        Some(title) => format!("\n![{alt}]({src} \"{}\")\n", title.replace('"', "\\\"")),
        None => format!("\n![{alt}]({src})\n"),
    }
}

/// Brackets would end the alt text early
fn escape_alt(alt: &str) -> String {
    alt.replace('[', "\\[").replace(']', "\\]")
}

fn render_checkbox(element: &Element, gfm: bool) -> String {
    let is_checkbox = attr(element, "type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox"));
    if !gfm || !is_checkbox {
        return String::new();
    }
    if attr(element, "checked").is_some() { "[x] ".to_string() } else { "[ ] ".to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn md(html: &str) -> String {
        render(html, &RenderRules::default()).unwrap()
    }

    #[test]
    fn test_headings_and_bold() {
        assert_eq!(md("<h1>T</h1><p>Hello <b>world</b></p>"), "# T\n\nHello **world**");
        assert!(md("<h3>Deep</h3>").starts_with("### Deep"));
    }

    #[test]
    fn test_absolute_image_kept() {
        assert_eq!(md(r#"<img src="https://x.com/a.png" alt="A">"#), "![A](https://x.com/a.png)");
    }

    #[test]
    fn test_image_title_clause() {
        assert_eq!(
            md(r#"<img src="http://x.com/a.png" alt="A" title="Caption">"#),
            r#"![A](http://x.com/a.png "Caption")"#
        );
    }

    #[test]
    fn test_image_alt_and_title_are_escaped() {
        assert_eq!(
            md(r#"<img src="https://x.com/a.png" alt="a]b" title='say "hi"'>"#),
            r#"![a\]b](https://x.com/a.png "say \"hi\"")"#
        );
    }

    #[test]
    fn test_rule_sits_between_blocks() {
        let out = md("<ul><li>one</li><li>two</li></ul><hr><p>x</p>");
        assert!(out.contains("-   two\n\n---\n\nx"), "{out}");
        let rules = RenderRules { rule_token: RuleToken::Underscores, ..Default::default() };
        assert_eq!(render("<p>a</p><hr><p>b</p>", &rules).unwrap(), "a\n\n___\n\nb");
    }

    #[test]
    fn test_image_scheme_is_case_insensitive() {
        assert_eq!(md(r#"<img src="HTTPS://x.com/a.png">"#), "![](HTTPS://x.com/a.png)");
    }

    #[rstest]
    #[case("data:image/png;base64,AAAA")]
    #[case("blob:https://x.com/1234")]
    #[case("file:///tmp/a.png")]
    #[case("/images/a.png")]
    #[case("a.png")]
    #[case("//cdn.x.com/a.png")]
    #[case("")]
    fn test_non_http_images_dropped(#[case] src: &str) {
        let out = md(&format!(r#"<p>before<img src="{src}" alt="A">after</p>"#));
        assert!(!out.contains("!["), "{src} rendered as {out}");
        assert!(out.contains("before"));
    }

    #[test]
    fn test_image_without_src_dropped() {
        assert_eq!(md(r#"<img alt="nothing">"#), "");
    }

    #[test]
    fn test_image_on_its_own_line() {
        let out = md(r#"<p>Look:<img src="https://x.com/a.png" alt="A">done</p>"#);
        assert!(out.lines().any(|line| line.trim() == "![A](https://x.com/a.png)"), "{out}");
    }

    #[test]
    fn test_fenced_code_with_language() {
        let out = md(r#"<pre><code class="language-rust">fn main() {}</code></pre>"#);
        assert!(out.starts_with("```rust"), "{out}");
        assert!(out.contains("fn main() {}"));
    }

    #[test]
    fn test_bullets_and_rules() {
        let out = md("<ul><li>one</li><li>two</li></ul><hr>");
        assert!(out.contains("-   one"), "{out}");
        assert!(out.contains("-   two"), "{out}");
        assert!(out.lines().any(|line| line == "---"), "{out}");
    }

    #[test]
    fn test_table_rendered() {
        let out = md("<table><thead><tr><th>A</th><th>B</th></tr></thead><tbody><tr><td>1</td><td>2</td></tr></tbody></table>");
        assert!(out.contains('|'));
        assert!(out.contains("A"));
        assert!(out.contains("2"));
    }

    #[test]
    fn test_task_list() {
        let out = md(r#"<ul><li><input type="checkbox" checked>done</li><li><input type="checkbox">todo</li></ul>"#);
        assert!(out.contains("[x] done"), "{out}");
        assert!(out.contains("[ ] todo"), "{out}");
    }

    #[test]
    fn test_without_gfm() {
        let rules = RenderRules { gfm: false, ..Default::default() };
        let out = render(
            r#"<table><tr><td>cell</td></tr></table><ul><li><input type="checkbox" checked>done</li></ul>"#,
            &rules,
        )
        .unwrap();
        assert!(!out.contains('|'), "{out}");
        assert!(out.contains("cell"));
        assert!(!out.contains("[x]"));
    }

    #[test]
    fn test_blank_runs_collapsed() {
        let out = md("<p>a</p><br><br><br><br><p>b</p>");
        assert!(!out.contains("\n\n\n"));
    }

    #[test]
    fn test_alternate_rules() {
        let rules = RenderRules {
            code_fence: CodeFence::Tildes,
            rule_token: RuleToken::Asterisks,
            bullet_marker: BulletMarker::Asterisk,
            ..Default::default()
        };
        let out = render("<ul><li>one</li></ul><hr><pre><code>x</code></pre>", &rules).unwrap();
        assert!(out.contains("*   one"), "{out}");
        assert!(out.lines().any(|line| line == "***"), "{out}");
        assert!(out.contains("~~~"), "{out}");
    }

    #[test]
    fn test_render_is_deterministic() {
        let html = r#"<h2>X</h2><p>y <em>z</em></p><img src="https://x.com/a.png">"#;
        assert_eq!(md(html), md(html));
    }
}
