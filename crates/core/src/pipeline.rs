//! URL-to-Markdown pipeline.
//!
//! A request moves through a fixed sequence of stages:
//!
//! ```text
//! Fetching → Parsing → ProfileMatch → Extracting → FallbackCheck → Sanitizing → Rendering → Done
//! ```
//!
//! Any stage may end the request with an error. [`Pipeline`] holds only
//! read-only configuration, so one instance can serve concurrent requests.
//!
//! # Example
//!
//! ```rust
//! use marksift_core::Pipeline;
//! use url::Url;
//!
//! let pipeline = Pipeline::new();
//! let url = Url::parse("https://example.com/post").unwrap();
//! let html = "<article><h1>T</h1><p>Hello <b>world</b></p></article>";
//! let converted = pipeline.convert_html(html, &url).unwrap();
//! assert_eq!(converted.markdown, "# T\n\nHello **world**");
//! ```

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::extract::{Extraction, extract};
use crate::fallback::fallback;
#[cfg(feature = "fetch")]
use crate::fetch::{fetch_url, validate_url};
use crate::fetch::FetchConfig;
use crate::parse::Document;
use crate::profile::{ProfileTable, SiteProfile};
use crate::render::{RenderRules, render};
use crate::sanitize::sanitize;
use crate::{MarksiftError, Result};

/// Default minimum content length, in characters, for a profile result
pub const DEFAULT_FALLBACK_THRESHOLD: usize = 100;

/// Pipeline stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Parsing,
    ProfileMatch,
    Extracting,
    FallbackCheck,
    Sanitizing,
    Rendering,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Parsing => "parsing",
            Stage::ProfileMatch => "profile-match",
            Stage::Extracting => "extracting",
            Stage::FallbackCheck => "fallback-check",
            Stage::Sanitizing => "sanitizing",
            Stage::Rendering => "rendering",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Tunables for stage transitions
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Profile results with fewer trimmed characters than this are
    /// replaced by the generic fallback (default: 100).
    pub fallback_threshold: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { fallback_threshold: DEFAULT_FALLBACK_THRESHOLD }
    }
}

/// A finished conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Converted {
    pub title: String,
    pub markdown: String,
    pub used_fallback: bool,
    /// Profile that matched the host, even when its result was superseded
    pub profile: Option<String>,
}

/// The conversion pipeline
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    table: ProfileTable,
    fetch: FetchConfig,
    rules: RenderRules,
    config: PipelineConfig,
}

impl Pipeline {
    /// A pipeline with the built-in profiles and default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.table
    }

    pub fn fetch_config(&self) -> &FetchConfig {
        &self.fetch
    }

    pub fn rules(&self) -> &RenderRules {
        &self.rules
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch `url` and convert the page
    ///
    /// # Errors
    ///
    /// Input errors for a missing or malformed URL, fetch errors from the
    /// origin, and [`MarksiftError::NoContent`] when nothing survives
    /// extraction.
    #[cfg(feature = "fetch")]
    pub async fn run(&self, url: &str) -> Result<Converted> {
        let url = validate_url(url)?;

        debug!(stage = %Stage::Fetching, url = %url, timeout = self.fetch.timeout, "fetching page");
        let html = fetch_url(&url, &self.fetch).await?;

        self.convert_html(&html, &url)
    }

    /// Convert an already fetched page
    ///
    /// `url` is the page's source address; its host selects the profile.
    pub fn convert_html(&self, html: &str, url: &Url) -> Result<Converted> {
        debug!(stage = %Stage::Parsing, bytes = html.len(), "parsing document");
        let doc = Document::parse(html);

        let host = url.host_str().unwrap_or_default();
        debug!(stage = %Stage::ProfileMatch, host, "resolving profile");
        let profile = self.table.resolve(host, url);

        let extraction = self.extract_with_fallback(&doc, profile, url, host)?;

        if extraction.is_empty() {
            return Err(MarksiftError::NoContent);
        }

        debug!(stage = %Stage::Sanitizing, "sanitizing content");
        let clean = sanitize(&extraction.content_html)?;

        debug!(stage = %Stage::Rendering, "rendering markdown");
        let markdown = render(&clean, &self.rules)?;

        debug!(stage = %Stage::Done, chars = markdown.len(), used_fallback = extraction.used_fallback, "converted");
        Ok(Converted {
            title: extraction.title,
            markdown,
            used_fallback: extraction.used_fallback,
            profile: extraction.profile,
        })
    }

    fn extract_with_fallback(
        &self, doc: &Document, profile: Option<&SiteProfile>, url: &Url, host: &str,
    ) -> Result<Extraction> {
        let Some(profile) = profile else {
            debug!(stage = %Stage::FallbackCheck, host, "no profile matched");
            return fallback(doc);
        };

        debug!(stage = %Stage::Extracting, profile = %profile.name, "extracting with profile");
        let extraction = extract(doc, profile, url)?;

        let len = extraction.content_len();
        debug!(stage = %Stage::FallbackCheck, len, threshold = self.config.fallback_threshold, "checking content length");
        if len >= self.config.fallback_threshold {
            return Ok(extraction);
        }

        warn!(host, profile = %profile.name, len, "profile content too short, using fallback");
        let mut generic = fallback(doc)?;
        if !extraction.title.is_empty() {
            generic.title = extraction.title;
        }
        generic.profile = extraction.profile;
        Ok(generic)
    }
}

/// Builder for [`Pipeline`]
///
/// # Example
///
/// ```rust
/// use marksift_core::{Pipeline, ProfileTable};
///
/// let pipeline = Pipeline::builder()
///     .profiles(ProfileTable::empty())
///     .fallback_threshold(0)
///     .timeout(5)
///     .build();
/// assert!(pipeline.profiles().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    pipeline: Pipeline,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the profile table
    pub fn profiles(mut self, table: ProfileTable) -> Self {
        self.pipeline.table = table;
        self
    }

    pub fn fetch_config(mut self, fetch: FetchConfig) -> Self {
        self.pipeline.fetch = fetch;
        self
    }

    /// Request timeout in seconds
    pub fn timeout(mut self, secs: u64) -> Self {
        self.pipeline.fetch.timeout = secs;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.pipeline.fetch.user_agent = user_agent.into();
        self
    }

    pub fn rules(mut self, rules: RenderRules) -> Self {
        self.pipeline.rules = rules;
        self
    }

    pub fn fallback_threshold(mut self, threshold: usize) -> Self {
        self.pipeline.config.fallback_threshold = threshold;
        self
    }

    pub fn build(self) -> Pipeline {
        self.pipeline
    }
}
