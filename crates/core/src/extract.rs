//! Profile-driven content extraction.
//!
//! Given a parsed page and the profile resolved for its host, [`extract`]
//! picks the title and the article subtree using the profile's ordered
//! selector lists and then runs the profile's repairs over that subtree.

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::Result;
use crate::parse::{Document, collapse_whitespace};
use crate::profile::SiteProfile;
use crate::repair::{RepairContext, apply_repairs};

/// The result of an extraction strategy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// Plain, trimmed title
    pub title: String,
    /// Article fragment; not yet sanitized
    pub content_html: String,
    /// Set when the generic fallback produced this result
    pub used_fallback: bool,
    /// Name of the profile that produced this result
    pub profile: Option<String>,
}

impl Extraction {
    /// Length of the content after trimming, in characters
    pub fn content_len(&self) -> usize {
        self.content_html.trim().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content_html.trim().is_empty()
    }
}

/// Extract title and content from `doc` using `profile`
///
/// Finding nothing is not an error: the result simply has empty content,
/// which the pipeline treats as insufficient.
pub fn extract(doc: &Document, profile: &SiteProfile, url: &Url) -> Result<Extraction> {
    let title = select_title(doc, &profile.title)?;

    let mut content_html = String::new();
    for selector in &profile.content {
        if let Some(element) = doc.select_first(selector)? {
            debug!(profile = %profile.name, selector = %selector, "content selector matched");
            content_html = element.inner_html();
            break;
        }
    }

    if content_html.trim().is_empty() {
        debug!(profile = %profile.name, "no content selector produced anything");
        return Ok(Extraction { title, content_html, used_fallback: false, profile: Some(profile.name.clone()) });
    }

    let content_html = apply_repairs(content_html, &profile.repairs, RepairContext { title: &title, url })?;

    Ok(Extraction { title, content_html, used_fallback: false, profile: Some(profile.name.clone()) })
}

/// First non-empty title rule wins; otherwise the document `<title>`
pub fn select_title(doc: &Document, selectors: &[String]) -> Result<String> {
    for selector in selectors {
        let text = doc.select_text(selector)?;
        if !text.is_empty() {
            return Ok(collapse_whitespace(&text));
        }
    }
    Ok(doc.title())
}
