//! Streaming DOM edits over HTML fragments.
//!
//! Every structural change the pipeline makes (sanitizing, repairs, noise
//! stripping) goes through lol_html so the fragment is rewritten in one pass
//! without re-serializing a full tree.

use lol_html::{RewriteStrSettings, element, rewrite_str};

use crate::{MarksiftError, Result};

/// Checks that a selector is something lol_html can match.
///
/// lol_html supports a smaller selector grammar than scraper, so profile
/// selectors used for rewriting are validated before a handler is built.
pub fn validate_selector(selector: &str) -> Result<()> {
    selector
        .parse::<lol_html::Selector>()
        .map(|_| ())
        .map_err(|e| MarksiftError::HtmlParseError(format!("Invalid selector {selector:?}: {e}")))
}

/// Removes every element matching any of `selectors`, contents included.
pub fn remove_matching<S: AsRef<str>>(html: &str, selectors: &[S]) -> Result<String> {
    if selectors.is_empty() {
        return Ok(html.to_string());
    }

    let mut handlers = Vec::with_capacity(selectors.len());
    for selector in selectors {
        let selector = selector.as_ref();
        validate_selector(selector)?;
        handlers.push(element!(selector, |el| {
            el.remove();
            Ok(())
        }));
    }

    let output = rewrite_str(html, RewriteStrSettings { element_content_handlers: handlers, ..RewriteStrSettings::new() })?;
    Ok(output)
}

/// Copies attribute `from` into `to` on every match and drops `from`.
///
/// With `reveal`, every matched element also gets its inline style forced
/// visible, whether or not it carried the placeholder attribute.
pub fn promote_attribute(html: &str, selector: &str, from: &str, to: &str, reveal: bool) -> Result<String> {
    validate_selector(selector)?;

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, |el| {
                if let Some(value) = el.get_attribute(from) {
                    el.set_attribute(to, &value)?;
                    el.remove_attribute(from);
                }
                if reveal {
                    let style = reveal_style(el.get_attribute("style").as_deref());
                    el.set_attribute("style", &style)?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;
    Ok(output)
}

/// Renames every element matching `selector` to `tag`, keeping its contents.
pub fn rename_matching(html: &str, selector: &str, tag: &str) -> Result<String> {
    validate_selector(selector)?;

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(selector, |el| {
                el.set_tag_name(tag)?;
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;
    Ok(output)
}

/// Rewrites an inline style so lazy-load hiding no longer applies.
///
/// Existing `visibility` and `opacity` declarations are replaced; all other
/// declarations are kept in order.
pub fn reveal_style(style: Option<&str>) -> String {
    let mut declarations: Vec<String> = style
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let property = decl.split(':').next().unwrap_or_default().trim().to_ascii_lowercase();
            property != "visibility" && property != "opacity"
        })
        .map(str::to_string)
        .collect();

    declarations.push("visibility: visible".to_string());
    declarations.push("opacity: 1".to_string());
    declarations.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_matching_descendant_selector() {
        let html = r#"<pre><span class="pre-numbering">1</span><code>x</code></pre><span class="pre-numbering">keep</span>"#;
        let out = remove_matching(html, &["pre .pre-numbering"]).unwrap();
        assert_eq!(out, r#"<pre><code>x</code></pre><span class="pre-numbering">keep</span>"#);
    }

    #[test]
    fn test_remove_matching_nothing_to_do() {
        assert_eq!(remove_matching::<&str>("<p>a</p>", &[]).unwrap(), "<p>a</p>");
        assert_eq!(remove_matching("<p>a</p>", &["script"]).unwrap(), "<p>a</p>");
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        assert!(matches!(
            remove_matching("<p>a</p>", &["p:::bad"]),
            Err(MarksiftError::HtmlParseError(_))
        ));
    }

    #[test]
    fn test_promote_attribute() {
        let html = r#"<img data-src="https://x.com/b.png" style="opacity:0">"#;
        let out = promote_attribute(html, "img", "data-src", "src", true).unwrap();
        assert!(out.contains(r#"src="https://x.com/b.png""#));
        assert!(!out.contains("data-src"));
        assert!(out.contains("visibility: visible; opacity: 1"));
        assert!(!out.contains("opacity:0"));
    }

    #[test]
    fn test_promote_attribute_without_reveal_leaves_style() {
        let html = r#"<img data-src="a.png" style="width: 10px">"#;
        let out = promote_attribute(html, "img", "data-src", "src", false).unwrap();
        assert!(out.contains(r#"style="width: 10px""#));
    }

    #[test]
    fn test_rename_matching() {
        let html = r#"<p><strong class="abstract-label">Background:</strong> text</p>"#;
        let out = rename_matching(html, ".abstract-label", "h4").unwrap();
        assert_eq!(out, r#"<p><h4 class="abstract-label">Background:</h4> text</p>"#);
    }

    #[test]
    fn test_reveal_style_keeps_other_declarations() {
        assert_eq!(
            reveal_style(Some("width: 100px; visibility:hidden; OPACITY: 0;")),
            "width: 100px; visibility: visible; opacity: 1"
        );
        assert_eq!(reveal_style(None), "visibility: visible; opacity: 1");
    }
}
