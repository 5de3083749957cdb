use serde::{Deserialize, Serialize};
use url::Url;

use crate::parse::parse_selector;
use crate::rewrite::validate_selector;
use crate::{MarksiftError, Result};

/// Host (and optionally path) predicate deciding whether a profile applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matcher {
    /// Substring the request hostname must contain
    pub host: String,
    /// Substring the request path must contain, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Matcher {
    /// Match on hostname alone
    pub fn host(host: impl Into<String>) -> Self {
        Self { host: host.into(), path: None }
    }

    /// Additionally require a path substring
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Test the matcher against a request
    pub fn matches(&self, host: &str, url: &Url) -> bool {
        host.contains(self.host.as_str())
            && self
                .path
                .as_deref()
                .is_none_or(|path| url.path().contains(path))
    }
}

/// A structural transformation applied to the selected article subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Repair {
    /// Copy a lazy-load placeholder attribute into the real one
    PromoteLazySource {
        selector: String,
        from: String,
        to: String,
        /// Force `visibility`/`opacity` visible on every matched element
        #[serde(default)]
        reveal: bool,
    },

    /// Delete decorative or promotional nodes
    Remove { selector: String },

    /// Assemble one fragment from disjoint page regions
    Compose(Composition),
}

impl Repair {
    /// Lazy `data-src` images, revealed
    pub fn lazy_images() -> Self {
        Self::PromoteLazySource {
            selector: "img".to_string(),
            from: "data-src".to_string(),
            to: "src".to_string(),
            reveal: true,
        }
    }

    /// Remove nodes matching `selector`
    pub fn remove(selector: impl Into<String>) -> Self {
        Self::Remove { selector: selector.into() }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::PromoteLazySource { selector, .. } | Self::Remove { selector } => validate_selector(selector),
            Self::Compose(composition) => composition.validate(),
        }
    }
}

/// Region selectors for composing a structured abstract page
///
/// The defaults describe PubMed article pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Composition {
    pub authors: String,
    pub source: String,
    pub identifier: String,
    /// Label printed before the identifier
    pub identifier_label: String,
    pub abstract_body: String,
    /// Elements inside the abstract body that open a structured subsection
    pub subsection_label: String,
    pub conflict: String,
    pub legal_notice: String,
}

impl Default for Composition {
    fn default() -> Self {
        Self {
            authors: ".authors-list".to_string(),
            source: ".article-source".to_string(),
            identifier: ".current-id".to_string(),
            identifier_label: "PMID".to_string(),
            abstract_body: "#abstract".to_string(),
            subsection_label: ".abstract-label".to_string(),
            conflict: "#conflict-of-interest".to_string(),
            legal_notice: ".copyright".to_string(),
        }
    }
}

impl Composition {
    fn validate(&self) -> Result<()> {
        for selector in [&self.authors, &self.source, &self.identifier, &self.abstract_body, &self.conflict, &self.legal_notice] {
            parse_selector(selector)?;
        }
        validate_selector(&self.subsection_label)
    }
}

/// Declarative extraction strategy bound to a hostname pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Short identifier used in logs and results
    pub name: String,
    pub matcher: Matcher,
    /// Title selectors, evaluated in order
    #[serde(default)]
    pub title: Vec<String>,
    /// Content selectors, evaluated in order
    #[serde(default)]
    pub content: Vec<String>,
    /// Repairs, applied in order to the selected subtree
    #[serde(default)]
    pub repairs: Vec<Repair>,
}

impl SiteProfile {
    pub fn new(name: impl Into<String>, matcher: Matcher) -> Self {
        Self { name: name.into(), matcher, title: Vec::new(), content: Vec::new(), repairs: Vec::new() }
    }

    /// Append title selectors
    pub fn title<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.title.extend(selectors.into_iter().map(Into::into));
        self
    }

    /// Append content selectors
    pub fn content<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content.extend(selectors.into_iter().map(Into::into));
        self
    }

    /// Append a repair step
    pub fn repair(mut self, repair: Repair) -> Self {
        self.repairs.push(repair);
        self
    }

    /// Append one removal repair per selector
    pub fn remove<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repairs.extend(selectors.into_iter().map(Repair::remove));
        self
    }

    /// Check every selector in the profile up front
    pub fn validate(&self) -> Result<()> {
        if self.matcher.host.is_empty() {
            return Err(MarksiftError::ConfigError(format!("profile {:?} has an empty host matcher", self.name)));
        }
        for selector in self.title.iter().chain(&self.content) {
            parse_selector(selector).map_err(|e| MarksiftError::ConfigError(format!("profile {:?}: {e}", self.name)))?;
        }
        for repair in &self.repairs {
            repair.validate().map_err(|e| MarksiftError::ConfigError(format!("profile {:?}: {e}", self.name)))?;
        }
        Ok(())
    }
}
