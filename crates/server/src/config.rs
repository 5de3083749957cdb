//! Service configuration.
//!
//! Settings come from environment variables with development defaults.
//! `ServerConfig::from_lookup` takes any key lookup so tests can supply
//! values without touching the process environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use marksift_core::{MarksiftError, Pipeline, ProfileTable};
use thiserror::Error;

pub const ENV_BIND_ADDR: &str = "MARKSIFT_BIND_ADDR";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "MARKSIFT_FETCH_TIMEOUT_SECS";
pub const ENV_FALLBACK_THRESHOLD: &str = "MARKSIFT_FALLBACK_THRESHOLD";
pub const ENV_PROFILES: &str = "MARKSIFT_PROFILES";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
const DEFAULT_FALLBACK_THRESHOLD: usize = 100;

/// Extra time the request timeout allows on top of the fetch timeout
const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 5;

/// Errors raised while building the service configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to load profiles: {0}")]
    Profiles(#[from] MarksiftError),
}

/// Runtime configuration for the HTTP service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub fetch_timeout_secs: u64,
    pub fallback_threshold: usize,
    /// Optional JSON profiles file registered ahead of the built-in profiles
    pub profiles: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            fallback_threshold: DEFAULT_FALLBACK_THRESHOLD,
            profiles: None,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = lookup(ENV_BIND_ADDR).unwrap_or(defaults.bind_addr);
        let fetch_timeout_secs =
            parse_number(ENV_FETCH_TIMEOUT_SECS, lookup(ENV_FETCH_TIMEOUT_SECS), defaults.fetch_timeout_secs)?;
        let fallback_threshold =
            parse_number(ENV_FALLBACK_THRESHOLD, lookup(ENV_FALLBACK_THRESHOLD), defaults.fallback_threshold)?;
        let profiles = lookup(ENV_PROFILES).filter(|path| !path.trim().is_empty()).map(PathBuf::from);

        if fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: ENV_FETCH_TIMEOUT_SECS,
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self { bind_addr, fetch_timeout_secs, fallback_threshold, profiles })
    }

    /// Upper bound on a whole request, fetch included
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs + REQUEST_TIMEOUT_MARGIN_SECS)
    }

    /// Build the conversion pipeline this configuration describes
    pub fn pipeline(&self) -> Result<Pipeline, ConfigError> {
        let mut table = ProfileTable::builtin();
        if let Some(path) = &self.profiles {
            table = table.with_overrides(ProfileTable::load_json(path)?);
        }

        Ok(Pipeline::builder()
            .profiles(table)
            .timeout(self.fetch_timeout_secs)
            .fallback_threshold(self.fallback_threshold)
            .build())
    }
}

fn parse_number<T: std::str::FromStr>(
    field: &'static str, raw: Option<String>, default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue { field, reason: format!("{raw:?}: {e}") }),
    }
}
