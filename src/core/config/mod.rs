//! core::config
//!
//! Run configuration and its resolution.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file (see [`schema`] for locations)
//! 3. Action inputs from the environment (`INPUT_*`, `GITHUB_REPOSITORY`,
//!    `GITHUB_API_URL`)
//! 4. CLI flags
//!
//! # Token
//!
//! The token comes from `--token` or the `token` action input. The legacy
//! `GITHUB_TOKEN` environment variable is still honored when neither is
//! set. Its presence always produces a deprecation warning.
//!
//! # Example
//!
//! ```
//! use release_tagger::core::config::{Config, Overrides};
//! use std::collections::HashMap;
//!
//! let env: HashMap<&str, &str> = [
//!     ("INPUT_TOKEN", "ghs_example"),
//!     ("INPUT_PUBLISH_LATEST_TAG", "true"),
//!     ("GITHUB_REPOSITORY", "octocat/hello-world"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let result = Config::resolve(&Overrides::default(), |k| {
//!     env.get(k).map(|v| v.to_string())
//! })
//! .unwrap();
//!
//! assert!(result.config.publish_latest_tag);
//! assert_eq!(result.config.repository.to_string(), "octocat/hello-world");
//! ```

pub mod schema;

pub use schema::FileConfig;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{RefNamespace, Repository};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Config file name under `.github/`.
const CONFIG_FILE_NAME: &str = "release-tagger.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("no API token: pass --token or set the 'token' input")]
    MissingToken,

    #[error("repository unknown: pass --repository or set GITHUB_REPOSITORY")]
    MissingRepository,
}

/// Warnings generated during config resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
}

/// An API token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub token: Option<String>,
    pub repository: Option<String>,
    pub api_url: Option<String>,
    pub publish_latest_tag: Option<bool>,
    pub prefer_branch_releases: Option<bool>,
}

/// Resolved run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API token
    pub token: Token,
    /// Repository whose refs are moved
    pub repository: Repository,
    /// REST API base URL
    pub api_base: String,
    /// Also move the `latest` ref
    pub publish_latest_tag: bool,
    /// Keep movable refs as branches instead of tags
    pub prefer_branch_releases: bool,
    /// Path of the config file that was loaded, if any
    loaded_from: Option<PathBuf>,
}

/// Result of resolving configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The resolved configuration.
    pub config: Config,
    /// Any warnings generated during resolution.
    pub warnings: Vec<ConfigWarning>,
}

impl Config {
    /// Build a configuration directly, bypassing file and environment lookup.
    pub fn new(token: Token, repository: Repository) -> Self {
        Self {
            token,
            repository,
            api_base: DEFAULT_API_BASE.to_string(),
            publish_latest_tag: false,
            prefer_branch_releases: false,
            loaded_from: None,
        }
    }

    /// Resolve configuration from CLI overrides, the config file and the
    /// environment.
    ///
    /// `env` looks up environment variables; pass `|k| std::env::var(k).ok()`
    /// in production.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, a
    /// value is invalid, or the token or repository cannot be determined.
    pub fn resolve<F>(overrides: &Overrides, env: F) -> Result<ConfigLoadResult, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let mut warnings = Vec::new();

        let (file, loaded_from) = Self::load_file(overrides, &env)?;
        file.validate()?;

        let legacy_token = env("GITHUB_TOKEN");
        if legacy_token.is_some() {
            warnings.push(ConfigWarning {
                message: "The GITHUB_TOKEN environment variable is obsolete, please set \
                          the 'token' input instead. In most cases the default value \
                          works and the variable can simply be removed."
                    .to_string(),
            });
        }
        let token = overrides
            .token
            .clone()
            .or_else(|| env("INPUT_TOKEN"))
            .or(legacy_token)
            .map(Token::new)
            .ok_or(ConfigError::MissingToken)?;

        let repository = overrides
            .repository
            .clone()
            .or_else(|| env("GITHUB_REPOSITORY"))
            .or(file.repository)
            .ok_or(ConfigError::MissingRepository)?;
        let repository =
            Repository::parse(&repository).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let api_base = overrides
            .api_url
            .clone()
            .or_else(|| env("GITHUB_API_URL"))
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        schema::validate_api_url(&api_base)?;

        let publish_latest_tag = match overrides.publish_latest_tag {
            Some(value) => value,
            None => match env("INPUT_PUBLISH_LATEST_TAG") {
                Some(raw) => parse_bool_input("publish_latest_tag", &raw)?,
                None => file.publish_latest_tag.unwrap_or(false),
            },
        };

        let prefer_branch_releases = match overrides.prefer_branch_releases {
            Some(value) => value,
            None => match env("INPUT_PREFER_BRANCH_RELEASES") {
                Some(raw) => parse_bool_input("prefer_branch_releases", &raw)?,
                None => file.prefer_branch_releases.unwrap_or(false),
            },
        };

        Ok(ConfigLoadResult {
            config: Config {
                token,
                repository,
                api_base: api_base.trim_end_matches('/').to_string(),
                publish_latest_tag,
                prefer_branch_releases,
                loaded_from,
            },
            warnings,
        })
    }

    /// Locate and read the config file, if any.
    fn load_file<F>(
        overrides: &Overrides,
        env: &F,
    ) -> Result<(FileConfig, Option<PathBuf>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An explicitly named file must exist
        if let Some(path) = overrides
            .config_path
            .clone()
            .or_else(|| env("TAGGER_CONFIG").map(PathBuf::from))
        {
            let config = Self::read_file(&path)?;
            return Ok((config, Some(path)));
        }

        let workspace = env("GITHUB_WORKSPACE")
            .map(PathBuf::from)
            .unwrap_or_default();
        let path = workspace.join(".github").join(CONFIG_FILE_NAME);
        if path.exists() {
            let config = Self::read_file(&path)?;
            return Ok((config, Some(path)));
        }

        Ok((FileConfig::default(), None))
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Namespace the movable refs live in.
    pub fn ref_namespace(&self) -> RefNamespace {
        if self.prefer_branch_releases {
            RefNamespace::Heads
        } else {
            RefNamespace::Tags
        }
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}

/// Parse a boolean action input the way the Actions toolkit does
/// (YAML 1.2 core schema booleans).
fn parse_bool_input(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        other => Err(ConfigError::InvalidValue(format!(
            "input '{}' must be true or false, got '{}'",
            name, other
        ))),
    }
}
