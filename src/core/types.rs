//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`Repository`] - `owner/name` repository slug
//! - [`MovableRef`] - A ref the tagger moves (`v{major}` or `latest`)
//! - [`RefNamespace`] - Whether movable refs are tags or branches
//! - [`RefName`] - Fully-qualified Git reference name
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use release_tagger::core::types::{MovableRef, Oid, RefNamespace};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let refname = MovableRef::Major(2).ref_name(RefNamespace::Tags);
//! assert_eq!(refname.as_str(), "refs/tags/v2");
//!
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("invalid repository '{0}', expected 'owner/name'")]
    InvalidRepository(String),
}

/// A validated Git object identifier.
///
/// Accepts SHA-1 (40 hex) and SHA-256 (64 hex) ids, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    ///
    /// # Example
    ///
    /// ```
    /// use release_tagger::core::types::Oid;
    ///
    /// let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
    /// assert_eq!(oid.short(7), "abc123d");
    /// ```
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A repository slug on the forge (`owner/name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    owner: String,
    name: String,
}

impl Repository {
    /// Parse an `owner/name` slug, as found in `GITHUB_REPOSITORY`.
    ///
    /// # Example
    ///
    /// ```
    /// use release_tagger::core::types::Repository;
    ///
    /// let repo = Repository::parse("octocat/hello-world").unwrap();
    /// assert_eq!(repo.owner(), "octocat");
    /// assert_eq!(repo.name(), "hello-world");
    /// assert!(Repository::parse("no-slash").is_err());
    /// ```
    pub fn parse(slug: &str) -> Result<Self, TypeError> {
        let slug = slug.trim().trim_end_matches(".git");
        match slug.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(TypeError::InvalidRepository(slug.to_string())),
        }
    }

    /// Repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Where movable refs live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefNamespace {
    /// `refs/tags/...`
    #[default]
    Tags,
    /// `refs/heads/...`, used when branch releases are preferred
    Heads,
}

impl RefNamespace {
    /// Path segment below `refs/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RefNamespace::Tags => "tags",
            RefNamespace::Heads => "heads",
        }
    }
}

/// A ref moved by the tagging policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MovableRef {
    /// `v{major}`
    Major(u64),
    /// `latest`
    Latest,
}

impl MovableRef {
    /// Short name of the ref, as reported in the `ref_name` output.
    pub fn short_name(&self) -> String {
        match self {
            MovableRef::Major(major) => format!("v{}", major),
            MovableRef::Latest => "latest".to_string(),
        }
    }

    /// Fully-qualified ref name in the given namespace.
    pub fn ref_name(&self, namespace: RefNamespace) -> RefName {
        // Short names are always `v<digits>` or `latest`, both valid components
        RefName(format!("refs/{}/{}", namespace.as_str(), self.short_name()))
    }
}

impl std::fmt::Display for MovableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// A validated, fully-qualified Git reference name (`refs/...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name is not under `refs/`
    /// or violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Ref name for a tag (`refs/tags/<tag>`).
    pub fn for_tag(tag: &str) -> Result<Self, TypeError> {
        Self::new(format!("refs/tags/{}", tag))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if !name.starts_with("refs/") {
            return Err(TypeError::InvalidRefName(format!(
                "'{}' must start with 'refs/'",
                name
            )));
        }
        if name.ends_with('/') || name.ends_with(".lock") {
            return Err(TypeError::InvalidRefName(format!(
                "'{}' has an invalid ending",
                name
            )));
        }
        if name.contains("..") || name.contains("//") || name.contains("@{") {
            return Err(TypeError::InvalidRefName(format!(
                "'{}' contains an invalid sequence",
                name
            )));
        }
        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if name
            .chars()
            .any(|c| c.is_ascii_control() || INVALID_CHARS.contains(&c))
        {
            return Err(TypeError::InvalidRefName(format!(
                "'{}' contains an invalid character",
                name
            )));
        }
        if name.split('/').any(|c| c.starts_with('.')) {
            return Err(TypeError::InvalidRefName(format!(
                "'{}' has a component starting with '.'",
                name
            )));
        }
        Ok(())
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without the leading `refs/`, as used in the GitHub git-refs API.
    ///
    /// # Example
    ///
    /// ```
    /// use release_tagger::core::types::RefName;
    ///
    /// let name = RefName::for_tag("v1.2.3").unwrap();
    /// assert_eq!(name.api_path(), "tags/v1.2.3");
    /// ```
    pub fn api_path(&self) -> &str {
        self.0.strip_prefix("refs/").unwrap_or(&self.0)
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
