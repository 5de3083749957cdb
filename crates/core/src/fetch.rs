//! Content fetching from URLs, files, and stdin.
//!
//! This module retrieves raw HTML for the pipeline. URL fetching issues a
//! single GET with browser-like headers and a fixed timeout; there is no
//! retry. Files and stdin are supported for offline conversion.

use std::fs;
use std::path::PathBuf;
#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::Client;
use url::Url;

use crate::{MarksiftError, Result};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// HTTP client configuration for fetching web pages.
///
/// Controls the timeout and the headers sent to the origin. The defaults
/// imitate a desktop browser, which many publishing platforms require before
/// they serve article markup.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header.
    pub user_agent: String,
    /// Accept-Language header.
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            accept_language: "zh-CN,zh;q=0.9,en;q=0.8".to_string(),
        }
    }
}

/// Parses and validates a request URL.
///
/// Only absolute `http`/`https` URLs with a host are accepted. This runs
/// before any network activity so malformed input never reaches the client.
pub fn validate_url(url: &str) -> Result<Url> {
    let url = url.trim();
    if url.is_empty() {
        return Err(MarksiftError::MissingUrl);
    }

    let parsed = Url::parse(url).map_err(|e| MarksiftError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(MarksiftError::InvalidUrl(
            "URL must use the http:// or https:// scheme".to_string(),
        ));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(MarksiftError::InvalidUrl("URL must include a host".to_string()));
    }

    Ok(parsed)
}

/// Fetches HTML content from a URL.
///
/// Performs one HTTP GET and returns the response body as text. Redirects are
/// followed; a non-2xx final status becomes [`MarksiftError::HttpStatus`] and
/// an expired timeout becomes [`MarksiftError::Timeout`]. Dropping the returned
/// future aborts the request.
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &Url, config: &FetchConfig) -> Result<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(MarksiftError::HttpError)?;

    let map_err = |e: reqwest::Error| {
        if e.is_timeout() { MarksiftError::Timeout { timeout: config.timeout } } else { MarksiftError::HttpError(e) }
    };

    let response = client
        .get(url.clone())
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        )
        .header("Accept-Language", &config.accept_language)
        .header("Cache-Control", "no-cache")
        .header("Upgrade-Insecure-Requests", "1")
        .send()
        .await
        .map_err(map_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(MarksiftError::HttpStatus { status: status.as_u16(), url: url.to_string() });
    }

    response.text().await.map_err(map_err)
}

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(MarksiftError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(MarksiftError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(MarksiftError::from)?;

    Ok(buffer)
}
