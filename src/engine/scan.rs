//! engine::scan
//!
//! Release survey: what do the existing releases say the movable refs
//! should be?
//!
//! # Architecture
//!
//! The scanner walks every page of the forge's release listing and produces
//! a [`Survey`] containing:
//! - the highest release per major version (`MajorTagState`)
//! - the highest release across the repository (`RepoLatestState`)
//! - the historical tags that were skipped because they are not semver
//!
//! Only fully-published releases are eligible. Drafts are invisible
//! externally and prereleases (platform flag or semver prerelease
//! component) never own a movable ref.
//!
//! # Invariants
//!
//! - Scan is read-only; it never mutates the forge
//! - Pagination is exhaustive: the survey either covers every page or fails
//! - A malformed historical tag is skipped, never fatal

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::core::types::Oid;
use crate::core::version::{ReleaseVersion, VersionError};
use crate::forge::{Forge, ForgeError, Release, ReleaseState};

/// Errors from surveying releases.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The release listing failed.
    #[error("failed to list releases")]
    Forge(#[from] ForgeError),

    /// The forge handed back a cursor it already returned.
    #[error("release listing repeated cursor '{0}'")]
    CursorLoop(String),
}

/// A release version together with the commit it was cut from, when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedCommit {
    pub version: ReleaseVersion,
    pub commit: Option<Oid>,
}

/// A historical tag the survey could not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTag {
    pub tag: String,
    pub error: VersionError,
}

/// Derived state of the repository's releases.
#[derive(Debug, Clone, Default)]
pub struct Survey {
    /// Highest eligible release across the repository
    pub repo_latest: Option<VersionedCommit>,
    /// Highest eligible release per major version
    pub majors: BTreeMap<u64, VersionedCommit>,
    /// Non-semver tags of eligible releases
    pub skipped: Vec<SkippedTag>,
    /// Number of releases examined, eligible or not
    pub releases_seen: usize,
}

impl Survey {
    /// Build a survey from an already-complete release list.
    pub fn from_releases<'a>(releases: impl IntoIterator<Item = &'a Release>) -> Self {
        let mut survey = Survey::default();
        for release in releases {
            survey.observe(release);
        }
        survey
    }

    /// Highest release of a major line.
    pub fn major(&self, major: u64) -> Option<&VersionedCommit> {
        self.majors.get(&major)
    }

    /// Fold one release into the survey.
    fn observe(&mut self, release: &Release) {
        self.releases_seen += 1;

        if release.state != ReleaseState::Published {
            return;
        }

        let version = match ReleaseVersion::parse(&release.tag_name) {
            Ok(version) => version,
            Err(error) => {
                self.skipped.push(SkippedTag {
                    tag: release.tag_name.clone(),
                    error,
                });
                return;
            }
        };

        if version.is_prerelease() {
            return;
        }

        let candidate = VersionedCommit {
            version,
            commit: release.target.clone(),
        };

        // Listing is newest first; on equal precedence the first seen wins
        let major = self
            .majors
            .entry(candidate.version.major())
            .or_insert_with(|| candidate.clone());
        if candidate.version > major.version {
            *major = candidate.clone();
        }

        match &self.repo_latest {
            Some(latest) if latest.version >= candidate.version => {}
            _ => self.repo_latest = Some(candidate),
        }
    }
}

/// Survey every release on the forge.
///
/// # Errors
///
/// Returns `ScanError::Forge` if any page fails; no partial survey is
/// ever returned.
pub async fn survey(forge: &dyn Forge) -> Result<Survey, ScanError> {
    let mut survey = Survey::default();
    let mut seen_cursors = HashSet::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = forge.list_releases(cursor.as_deref()).await?;
        for release in &page.releases {
            survey.observe(release);
        }

        match page.next {
            Some(next) => {
                if !seen_cursors.insert(next.clone()) {
                    return Err(ScanError::CursorLoop(next));
                }
                cursor = Some(next);
            }
            None => break,
        }
    }

    Ok(survey)
}
