//! Article extraction and Markdown conversion.
//!
//! `marksift-core` turns a web article into clean Markdown and a title. A
//! page is matched against an ordered table of [`SiteProfile`]s; a matching
//! profile selects and repairs the article subtree, and pages without a
//! usable profile result go through a generic fallback. The chosen fragment
//! is sanitized and rendered with a fixed rule set.
//!
//! ```rust
//! use marksift_core::Pipeline;
//! use url::Url;
//!
//! let url = Url::parse("https://example.com/").unwrap();
//! let html = "<article><h1>T</h1><p>Hello <b>world</b></p></article>";
//! let converted = Pipeline::new().convert_html(html, &url).unwrap();
//! assert_eq!(converted.markdown, "# T\n\nHello **world**");
//! ```

pub mod error;
pub mod extract;
pub mod fallback;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod profile;
pub mod render;
pub mod repair;
pub mod rewrite;
pub mod sanitize;

pub use error::{ErrorKind, MarksiftError, Result};
pub use extract::{Extraction, extract};
pub use fallback::fallback;
#[cfg(feature = "fetch")]
pub use fetch::fetch_url;
pub use fetch::{FetchConfig, fetch_file, fetch_stdin, validate_url};
pub use parse::Document;
pub use pipeline::{Converted, Pipeline, PipelineBuilder, PipelineConfig, Stage};
pub use profile::{Composition, Matcher, ProfileTable, Repair, SiteProfile};
pub use render::{BulletMarker, CodeBlockStyle, CodeFence, HeadingStyle, RenderRules, RuleToken, render};
pub use sanitize::sanitize;
