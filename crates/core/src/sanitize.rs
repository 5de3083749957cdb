//! Final cleanup of extracted fragments.
//!
//! Whatever strategy produced the article, its fragment passes through
//! [`sanitize`] before rendering. The fragment is rewritten on its own, so
//! nothing from the surrounding page can leak back in.

use crate::Result;
use crate::rewrite::remove_matching;

/// Elements that never carry article content.
pub const NON_CONTENT_TAGS: &[&str] = &["script", "style", "iframe", "noscript", "svg"];

/// Removes script, style, iframe, noscript, and svg elements from a fragment.
///
/// The pass is idempotent: sanitizing an already sanitized fragment returns
/// it unchanged.
///
/// # Example
///
/// ```rust
/// use marksift_core::sanitize;
///
/// let clean = sanitize("<p>Hi</p><script>track()</script>").unwrap();
/// assert_eq!(clean, "<p>Hi</p>");
/// ```
pub fn sanitize(fragment: &str) -> Result<String> {
    remove_matching(fragment, NON_CONTENT_TAGS)
}
