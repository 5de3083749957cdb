//! Generic extraction for pages without a usable profile result.
//!
//! The search only ever widens: first the page's semantic containers, then
//! the whole body minus known page chrome.

use tracing::debug;

use crate::Result;
use crate::extract::Extraction;
use crate::parse::Document;
use crate::rewrite::remove_matching;

/// Semantic containers tried before falling back to the whole body
pub const SEMANTIC_CONTAINERS: &[&str] = &["article", "main"];

/// Structural and non-content nodes stripped from the body
pub const BODY_DENYLIST: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "header", "footer", "nav", "form", "aside", ".sidebar", ".ad",
    ".ads", "#header", "#footer", "#nav", "#sidebar",
];

/// Extract content without a profile
///
/// The title is always the document `<title>`; `used_fallback` is always set.
pub fn fallback(doc: &Document) -> Result<Extraction> {
    let title = doc.title();

    for container in SEMANTIC_CONTAINERS {
        if let Some(html) = doc.select_inner_html(container)?
            && !html.trim().is_empty()
        {
            debug!(container, "semantic container matched");
            return Ok(Extraction { title, content_html: html, used_fallback: true, profile: None });
        }
    }

    debug!("no semantic container, stripping body");
    let body = doc.select_inner_html("body")?.unwrap_or_default();
    let content_html = remove_matching(&body, BODY_DENYLIST)?;

    Ok(Extraction { title, content_html, used_fallback: true, profile: None })
}
