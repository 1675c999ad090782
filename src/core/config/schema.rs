//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Location
//!
//! Searched in order:
//! 1. `--config <path>` or `$TAGGER_CONFIG`
//! 2. `$GITHUB_WORKSPACE/.github/release-tagger.toml`
//!    (or `.github/release-tagger.toml` relative to the working directory)
//!
//! # Validation
//!
//! Unknown keys are rejected. Values are validated after parsing.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::Repository;

/// On-disk configuration.
///
/// # Example
///
/// ```toml
/// publish_latest_tag = true
/// prefer_branch_releases = false
/// api_url = "https://github.example.com/api/v3"
/// repository = "myorg/myaction"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Also move the `latest` ref
    pub publish_latest_tag: Option<bool>,

    /// Maintain movable refs as branches instead of tags
    pub prefer_branch_releases: Option<bool>,

    /// REST API base URL (GitHub Enterprise)
    pub api_url: Option<String>,

    /// `owner/name` of the repository to tag
    pub repository: Option<String>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_url {
            validate_api_url(url)?;
        }

        if let Some(repo) = &self.repository {
            Repository::parse(repo).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }

        Ok(())
    }
}

/// Check that an API base URL is an absolute http(s) URL.
pub(crate) fn validate_api_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "api_url '{}' must be an http(s) URL",
            url
        )))
    }
}
