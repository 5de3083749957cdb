//! Profile repairs applied to a selected article subtree.
//!
//! Repairs run in the order a profile lists them. Each takes the current
//! fragment and returns a new one; nothing outside the subtree is touched.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::Result;
use crate::parse::Document;
use crate::profile::{Composition, Repair};
use crate::rewrite::{promote_attribute, remove_matching, rename_matching};

static TRAILING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([0-9]+)/?$").expect("TRAILING_ID: hardcoded regex is valid"));

/// Request details some repairs need
#[derive(Debug, Clone, Copy)]
pub struct RepairContext<'a> {
    /// Title already chosen for the article
    pub title: &'a str,
    pub url: &'a Url,
}

/// Apply `repairs` to `fragment` in order
pub fn apply_repairs(fragment: String, repairs: &[Repair], ctx: RepairContext<'_>) -> Result<String> {
    repairs.iter().try_fold(fragment, |html, repair| apply_repair(&html, repair, ctx))
}

fn apply_repair(html: &str, repair: &Repair, ctx: RepairContext<'_>) -> Result<String> {
    match repair {
        Repair::PromoteLazySource { selector, from, to, reveal } => promote_attribute(html, selector, from, to, *reveal),
        Repair::Remove { selector } => remove_matching(html, &[selector]),
        Repair::Compose(composition) => compose(html, composition, ctx),
    }
}

/// Build a single fragment from the regions of a structured abstract page
///
/// Sections appear in a fixed order and are skipped when their region is
/// missing or empty: title, authors, source, identifier, abstract,
/// conflict of interest, legal notice.
pub fn compose(html: &str, composition: &Composition, ctx: RepairContext<'_>) -> Result<String> {
    let doc = Document::parse(html);
    let mut composed = String::new();

    if !ctx.title.is_empty() {
        composed.push_str(&format!("<h2>{}</h2>", escape_text(ctx.title)));
    }

    let authors = doc.select_text(&composition.authors)?;
    if !authors.is_empty() {
        composed.push_str(&labelled_paragraph("Authors", &authors));
    }

    let source = doc.select_text(&composition.source)?;
    if !source.is_empty() {
        composed.push_str(&labelled_paragraph("Source", &source));
    }

    let mut identifier = doc.select_text(&composition.identifier)?;
    if identifier.is_empty()
        && let Some(caps) = TRAILING_ID.captures(ctx.url.path())
    {
        identifier = caps[1].to_string();
    }
    if !identifier.is_empty() {
        composed.push_str(&labelled_paragraph(&composition.identifier_label, &identifier));
    }

    if let Some(body) = region(&doc, &composition.abstract_body)? {
        composed.push_str("<h3>Abstract</h3>");
        composed.push_str(&rename_matching(&body, &composition.subsection_label, "h4")?);
    }

    if let Some(body) = region(&doc, &composition.conflict)? {
        composed.push_str("<h3>Conflict of Interest</h3>");
        composed.push_str(&body);
    }

    if let Some(notice) = region(&doc, &composition.legal_notice)? {
        composed.push_str(&notice);
    }

    Ok(composed)
}

/// Inner HTML of the first match, unless it is blank
fn region(doc: &Document, selector: &str) -> Result<Option<String>> {
    Ok(doc.select_inner_html(selector)?.filter(|body| !body.trim().is_empty()))
}

fn labelled_paragraph(label: &str, text: &str) -> String {
    format!("<p><strong>{}:</strong> {}</p>", escape_text(label), escape_text(text))
}

/// Escape text for inclusion in HTML
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBMED_BODY: &str = r#"
        <header><nav>PubMed nav</nav></header>
        <h1 class="heading-title"> Effects of coffee on sleep </h1>
        <div class="authors-list">
            <span>Jane Doe</span>,
            <span>John Roe</span>
        </div>
        <div class="article-source">Sleep Med. 2021 Jan;77:1-9.</div>
        <strong class="current-id">33333333</strong>
        <div id="abstract">
            <p><strong class="abstract-label">Background:</strong> Coffee is popular.</p>
            <p><strong class="abstract-label">Results:</strong> People slept less.</p>
        </div>
        <div id="conflict-of-interest"><p>None declared.</p></div>
        <p class="copyright"><span>Copyright © 2021 Elsevier B.V.</span></p>
    "#;

    fn ctx<'a>(title: &'a str, url: &'a Url) -> RepairContext<'a> {
        RepairContext { title, url }
    }

    #[test]
    fn test_compose_section_order() {
        let url = Url::parse("https://pubmed.ncbi.nlm.nih.gov/33333333/").unwrap();
        let out = compose(PUBMED_BODY, &Composition::default(), ctx("Effects of coffee on sleep", &url)).unwrap();

        let positions: Vec<usize> = [
            "<h2>Effects of coffee on sleep</h2>",
            "<strong>Authors:</strong> Jane Doe, John Roe",
            "<strong>Source:</strong> Sleep Med.",
            "<strong>PMID:</strong> 33333333",
            "<h3>Abstract</h3>",
            r#"<h4 class="abstract-label">Background:</h4>"#,
            "<h3>Conflict of Interest</h3>",
            "Copyright © 2021",
        ]
        .iter()
        .map(|needle| out.find(needle).unwrap_or_else(|| panic!("missing {needle:?} in {out}")))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "out of order: {out}");
        assert!(!out.contains("PubMed nav"));
    }

    #[test]
    fn test_compose_identifier_from_url() {
        let url = Url::parse("https://pubmed.ncbi.nlm.nih.gov/987654/").unwrap();
        let out = compose("<div id='abstract'><p>Text</p></div>", &Composition::default(), ctx("T", &url)).unwrap();
        assert!(out.contains("<strong>PMID:</strong> 987654"));
        assert!(!out.contains("Authors:"));
        assert!(!out.contains("Conflict of Interest"));
    }

    #[test]
    fn test_compose_skips_blank_regions() {
        let url = Url::parse("https://pubmed.ncbi.nlm.nih.gov/33333333/").unwrap();
        let html = r#"
            <div id="abstract"></div>
            <div id="conflict-of-interest">
            </div>
            <p class="copyright">  </p>
        "#;
        let out = compose(html, &Composition::default(), ctx("T", &url)).unwrap();

        assert_eq!(out, "<h2>T</h2><p><strong>PMID:</strong> 33333333</p>");
    }

    #[test]
    fn test_compose_escapes_region_text() {
        let url = Url::parse("https://pubmed.ncbi.nlm.nih.gov/search/").unwrap();
        let out = compose(
            r#"<div class="authors-list">A &lt;B&gt; &amp; C</div>"#,
            &Composition::default(),
            ctx("Fish & <Chips>", &url),
        )
        .unwrap();
        assert!(out.starts_with("<h2>Fish &amp; &lt;Chips&gt;</h2>"));
        assert!(out.contains("A &lt;B&gt; &amp; C"));
        assert!(!out.contains("PMID"));
    }

    #[test]
    fn test_apply_repairs_in_order() {
        let url = Url::parse("https://example.com/").unwrap();
        let repairs = vec![Repair::lazy_images(), Repair::remove(".ad")];
        let html = r#"<div class="ad"><img data-src="https://x.com/ad.png"></div><img data-src="https://x.com/b.png">"#;

        let out = apply_repairs(html.to_string(), &repairs, ctx("", &url)).unwrap();
        assert!(!out.contains("ad.png"));
        assert!(out.contains(r#"src="https://x.com/b.png""#));
    }
}
