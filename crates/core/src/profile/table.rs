use std::fs;
use std::path::Path;

use url::Url;

use crate::profile::builtin::builtin_profiles;
use crate::profile::site::SiteProfile;
use crate::{MarksiftError, Result};

/// Ordered, read-only registry of site profiles
///
/// Resolution is a linear scan in registration order; the first matching
/// profile wins and profiles are never merged.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: Vec<SiteProfile>,
}

impl ProfileTable {
    /// Create a table from profiles in the given order
    pub fn new(profiles: Vec<SiteProfile>) -> Self {
        Self { profiles }
    }

    /// A table with no profiles; every request routes to fallback
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The built-in platform profiles
    pub fn builtin() -> Self {
        Self::new(builtin_profiles())
    }

    /// Register `overrides` ahead of the existing profiles
    pub fn with_overrides(mut self, overrides: Vec<SiteProfile>) -> Self {
        let mut profiles = overrides;
        profiles.append(&mut self.profiles);
        self.profiles = profiles;
        self
    }

    /// Find the profile for a request
    pub fn resolve(&self, host: &str, url: &Url) -> Option<&SiteProfile> {
        self.profiles.iter().find(|profile| profile.matcher.matches(host, url))
    }

    /// Profiles in registration order
    pub fn profiles(&self) -> &[SiteProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Parse a JSON array of profiles, validating every selector
    pub fn parse_json(json: &str) -> Result<Vec<SiteProfile>> {
        let profiles: Vec<SiteProfile> =
            serde_json::from_str(json).map_err(|e| MarksiftError::ConfigError(format!("Invalid profiles JSON: {e}")))?;

        for profile in &profiles {
            profile.validate()?;
        }

        Ok(profiles)
    }

    /// Load a JSON profiles file
    pub fn load_json(path: &Path) -> Result<Vec<SiteProfile>> {
        if !path.exists() {
            return Err(MarksiftError::FileNotFound(path.to_path_buf()));
        }

        let json = fs::read_to_string(path)?;
        Self::parse_json(&json)
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}
