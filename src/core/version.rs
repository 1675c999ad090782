//! core::version
//!
//! Semantic version parsing for release tags.
//!
//! # Grammar
//!
//! Tags must be strict semver (`MAJOR.MINOR.PATCH[-PRE][+BUILD]`), with an
//! optional leading `v` or `V` that is stripped before parsing. Partial
//! versions (`v1`, `1.2`) and leading zeros are rejected.
//!
//! # Ordering
//!
//! [`ReleaseVersion`] orders by semver precedence: a prerelease sorts below
//! the release of the same `MAJOR.MINOR.PATCH`, and build metadata is
//! ignored. Two versions differing only in build metadata compare equal.
//!
//! # Example
//!
//! ```
//! use release_tagger::core::version::ReleaseVersion;
//!
//! let a = ReleaseVersion::parse("v1.2.0").unwrap();
//! let b = ReleaseVersion::parse("1.2.0+build.7").unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.major(), 1);
//! assert!(ReleaseVersion::parse("release-42").is_err());
//! ```

use std::cmp::Ordering;

use thiserror::Error;

/// Errors from version parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    /// The tag does not conform to strict semver.
    #[error("invalid version tag '{tag}': {message}")]
    InvalidVersionTag { tag: String, message: String },
}

/// A release version parsed from a tag.
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    /// The tag as it appeared on the release
    tag: String,
    version: semver::Version,
}

impl ReleaseVersion {
    /// Parse a release tag.
    ///
    /// # Errors
    ///
    /// Returns `VersionError::InvalidVersionTag` if the tag is not strict semver.
    pub fn parse(tag: &str) -> Result<Self, VersionError> {
        let raw = tag
            .strip_prefix('v')
            .or_else(|| tag.strip_prefix('V'))
            .unwrap_or(tag);

        let version =
            semver::Version::parse(raw).map_err(|e| VersionError::InvalidVersionTag {
                tag: tag.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            tag: tag.to_string(),
            version,
        })
    }

    /// Major version component.
    pub fn major(&self) -> u64 {
        self.version.major
    }

    /// Whether the version carries a prerelease component (`-rc.1`).
    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }

    /// The original tag string.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    fn precedence_key(&self) -> (u64, u64, u64, &semver::Prerelease) {
        (
            self.version.major,
            self.version.minor,
            self.version.patch,
            &self.version.pre,
        )
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ReleaseVersion {}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_key().cmp(&other.precedence_key())
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(tag: &str) -> ReleaseVersion {
        ReleaseVersion::parse(tag).unwrap()
    }

    mod parse {
        use super::*;

        #[test]
        fn accepts_with_and_without_prefix() {
            assert_eq!(v("v1.2.3").to_string(), "1.2.3");
            assert_eq!(v("V1.2.3").to_string(), "1.2.3");
            assert_eq!(v("1.2.3").to_string(), "1.2.3");
        }

        #[test]
        fn keeps_original_tag() {
            assert_eq!(v("v4.0.1").tag(), "v4.0.1");
        }

        #[test]
        fn accepts_prerelease_and_build() {
            let version = v("v2.0.0-rc.1+sha.5114f85");
            assert!(version.is_prerelease());
            assert_eq!(version.major(), 2);
        }

        #[test]
        fn rejects_non_semver() {
            for tag in [
                "release-42",
                "v1",
                "v1.2",
                "1.2.3.4",
                "v01.2.3",
                "",
                "v",
                "vv1.2.3",
                " 1.2.3",
                "latest",
            ] {
                assert!(
                    ReleaseVersion::parse(tag).is_err(),
                    "expected '{}' to be rejected",
                    tag
                );
            }
        }

        #[test]
        fn error_names_the_tag() {
            let err = ReleaseVersion::parse("release-42").unwrap_err();
            assert!(err.to_string().contains("release-42"));
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn numeric_components() {
            assert!(v("1.10.0") > v("1.9.0"));
            assert!(v("2.0.0") > v("1.99.99"));
            assert!(v("1.0.1") > v("1.0.0"));
        }

        #[test]
        fn prerelease_sorts_below_release() {
            assert!(v("1.0.0-rc.1") < v("1.0.0"));
            assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
            assert!(v("1.0.0-rc.1") > v("0.9.9"));
        }

        #[test]
        fn build_metadata_ignored() {
            assert_eq!(v("1.0.0+a"), v("1.0.0+b"));
            assert_eq!(v("1.0.0+a").cmp(&v("1.0.0")), Ordering::Equal);
        }

        #[test]
        fn prefix_ignored() {
            assert_eq!(v("v3.1.4"), v("3.1.4"));
        }
    }
}
