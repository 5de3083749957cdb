//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! extractors. Parsing is tolerant: html5ever repairs malformed markup the
//! same way browsers do, so building a document never fails.
//!
//! # Example
//!
//! ```rust
//! use marksift_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><title> Test Page </title></head>
//!         <body><p class="content">Paragraph</p></body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! assert_eq!(doc.title(), "Test Page");
//! assert_eq!(doc.select("p.content").unwrap().len(), 1);
//! ```

use scraper::{Html, Selector};

use crate::{MarksiftError, Result};

/// Parses a CSS selector, mapping failures to [`MarksiftError::HtmlParseError`].
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| MarksiftError::HtmlParseError(format!("Invalid selector {selector:?}: {e}")))
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Represents a parsed HTML document.
///
/// A Document wraps a full HTML page (or a fragment parsed as one) and
/// provides CSS-selector queries over it.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`MarksiftError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use marksift_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Gets the first element matching a selector, if any.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Gets the trimmed, whitespace-collapsed text of the first match.
    ///
    /// Returns an empty string when nothing matches.
    pub fn select_text(&self, selector: &str) -> Result<String> {
        Ok(self.select_first(selector)?.map(|el| collapse_whitespace(&el.text())).unwrap_or_default())
    }

    /// Gets the inner HTML of the first match, if any.
    pub fn select_inner_html(&self, selector: &str) -> Result<Option<String>> {
        Ok(self.select_first(selector)?.map(|el| el.inner_html()))
    }

    /// Gets the title of the document.
    ///
    /// Returns the trimmed text of the `<title>` element, or an empty string.
    pub fn title(&self) -> String {
        self.select_text("title").unwrap_or_default()
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use marksift_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the inner HTML of this element, excluding its own tags.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }
}
