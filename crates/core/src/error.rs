//! Error types for Marksift operations.
//!
//! This module defines the main error type [`MarksiftError`], covering every
//! way a conversion request can fail: bad input, an unreachable or erroring
//! origin, pages with nothing to extract, and internal rewrite failures.
//!
//! # Example
//!
//! ```rust
//! use marksift_core::{ErrorKind, MarksiftError};
//!
//! let err = MarksiftError::NoContent;
//! assert_eq!(err.kind(), ErrorKind::Extraction);
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the conversion pipeline.
///
/// Every variant is terminal for the request that produced it. Use
/// [`MarksiftError::kind`] to map a failure onto a response class.
#[derive(Error, Debug)]
pub enum MarksiftError {
    /// No URL was supplied.
    #[error("URL is required")]
    MissingUrl,

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed, has no host, or is not http(s).
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps DNS failures, connection issues, and other
    /// transport problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The origin answered with a non-success status.
    #[error("Request failed with status code {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Standard I/O errors while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No content could be extracted from the document.
    ///
    /// Returned when every strategy, including the full-body fallback,
    /// yields nothing.
    #[error("Could not extract content from this URL")]
    NoContent,

    /// HTML parsing or rewriting errors.
    ///
    /// Returned for invalid CSS selectors and lol_html rewriter failures.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// Markdown conversion errors.
    #[error("Failed to render Markdown: {0}")]
    RenderError(String),

    /// Profile or service configuration errors.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Broad failure classes used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input, rejected before any network call.
    Input,
    /// The origin could not be reached or answered with an error.
    Fetch,
    /// Nothing usable could be extracted.
    Extraction,
    /// Selector, rewriter, renderer, or configuration failures.
    Internal,
}

impl MarksiftError {
    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingUrl | Self::InvalidUrl(_) => ErrorKind::Input,
            #[cfg(feature = "fetch")]
            Self::HttpError(_) => ErrorKind::Fetch,
            Self::Timeout { .. } | Self::HttpStatus { .. } | Self::FileNotFound(_) | Self::Io(_) => ErrorKind::Fetch,
            Self::NoContent => ErrorKind::Extraction,
            Self::HtmlParseError(_) | Self::RenderError(_) | Self::ConfigError(_) => ErrorKind::Internal,
        }
    }
}

impl From<lol_html::errors::RewritingError> for MarksiftError {
    fn from(err: lol_html::errors::RewritingError) -> Self {
        MarksiftError::HtmlParseError(err.to_string())
    }
}

/// Result type alias for MarksiftError.
pub type Result<T> = std::result::Result<T, MarksiftError>;
