//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge provides a deterministic implementation of the `Forge` trait
//! for use in tests. It stores releases and refs in memory, pages the release
//! listing, and allows configuring failure and write-conflict scenarios.
//!
//! # Example
//!
//! ```
//! use release_tagger::core::types::{Oid, RefName};
//! use release_tagger::forge::mock::MockForge;
//! use release_tagger::forge::Forge;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new();
//! let name = RefName::new("refs/tags/v1").unwrap();
//! let sha = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//!
//! forge.create_ref(&name, &sha).await.unwrap();
//! let read = forge.get_ref(&name).await.unwrap().unwrap();
//! assert_eq!(read.sha, sha);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use super::traits::{Forge, ForgeError, GitRef, RefTarget, Release, ReleasePage, ReleaseState};
use crate::core::types::{Oid, RefName};

/// Default number of releases per listing page.
const DEFAULT_PAGE_SIZE: usize = 30;

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Releases, newest first.
    releases: Vec<Release>,
    /// Stored refs by full name.
    refs: BTreeMap<String, GitRef>,
    /// Releases per listing page.
    page_size: usize,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Pending write conflicts per ref name.
    conflicts: HashMap<String, PendingConflict>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// A scripted conflict: the next `remaining` writes to the ref fail.
#[derive(Debug, Clone)]
struct PendingConflict {
    remaining: usize,
    /// SHA another writer moves the ref to when the conflict fires.
    racer: Option<Oid>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every list_releases call with the given error.
    ListReleases(ForgeError),
    /// Fail the list_releases call for the given zero-based page.
    ListReleasesPage { page: usize, error: ForgeError },
    /// Fail get_ref with the given error.
    GetRef(ForgeError),
    /// Fail writes to one ref only.
    WriteTo { name: String, error: ForgeError },
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ListReleases {
        cursor: Option<String>,
    },
    GetRef {
        name: String,
    },
    CreateRef {
        name: String,
        sha: String,
    },
    UpdateRef {
        name: String,
        sha: String,
        force: bool,
    },
}

impl MockOperation {
    /// Whether the operation writes a ref.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            MockOperation::CreateRef { .. } | MockOperation::UpdateRef { .. }
        )
    }
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                releases: Vec::new(),
                refs: BTreeMap::new(),
                page_size: DEFAULT_PAGE_SIZE,
                fail_on: None,
                conflicts: HashMap::new(),
                operations: Vec::new(),
            })),
        }
    }

    /// Create a mock forge with pre-existing releases (newest first).
    pub fn with_releases(releases: Vec<Release>) -> Self {
        let forge = Self::new();
        forge.inner.lock().unwrap().releases = releases;
        forge
    }

    /// Set the number of releases returned per page.
    pub fn page_size(self, size: usize) -> Self {
        self.inner.lock().unwrap().page_size = size.max(1);
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use release_tagger::forge::mock::{MockForge, FailOn};
    /// use release_tagger::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::ListReleases(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Make the next `count` writes to `name` fail with `Conflict`.
    ///
    /// When `racer` is set, each conflict also moves the ref to that SHA,
    /// as if another writer had won the race.
    pub fn inject_conflicts(&self, name: &str, count: usize, racer: Option<Oid>) {
        let mut inner = self.inner.lock().unwrap();
        inner.conflicts.insert(
            name.to_string(),
            PendingConflict {
                remaining: count,
                racer,
            },
        );
    }

    /// Add a release (as the newest).
    pub fn add_release(&self, release: Release) {
        let mut inner = self.inner.lock().unwrap();
        inner.releases.insert(0, release);
    }

    /// Seed a ref pointing at a commit.
    pub fn set_ref(&self, name: &str, sha: &Oid) {
        let mut inner = self.inner.lock().unwrap();
        inner.refs.insert(
            name.to_string(),
            GitRef {
                name: RefName::new(name).unwrap(),
                sha: sha.clone(),
                target: RefTarget::Commit,
            },
        );
    }

    /// Seed a ref pointing at an annotated tag object.
    pub fn set_annotated_ref(&self, name: &str, sha: &Oid) {
        let mut inner = self.inner.lock().unwrap();
        inner.refs.insert(
            name.to_string(),
            GitRef {
                name: RefName::new(name).unwrap(),
                sha: sha.clone(),
                target: RefTarget::Tag,
            },
        );
    }

    /// Current target of a ref (for test verification).
    pub fn ref_sha(&self, name: &str) -> Option<Oid> {
        let inner = self.inner.lock().unwrap();
        inner.refs.get(name).map(|r| r.sha.clone())
    }

    /// All refs (for test verification).
    pub fn all_refs(&self) -> BTreeMap<String, Oid> {
        let inner = self.inner.lock().unwrap();
        inner
            .refs
            .iter()
            .map(|(name, r)| (name.clone(), r.sha.clone()))
            .collect()
    }

    /// Get all recorded operations.
    ///
    /// Useful for verifying the mock was called correctly.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Recorded write operations only.
    pub fn writes(&self) -> Vec<MockOperation> {
        self.operations()
            .into_iter()
            .filter(MockOperation::is_write)
            .collect()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if a write to `name` should fail, consuming a scripted conflict.
    fn check_write(&self, name: &str) -> Option<ForgeError> {
        let mut inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::WriteTo { name: target, error }) if target == name => {
                return Some(error.clone())
            }
            _ => {}
        }

        let pending = inner.conflicts.get_mut(name)?;
        if pending.remaining == 0 {
            return None;
        }
        pending.remaining -= 1;
        let racer = pending.racer.clone();

        if let Some(sha) = racer {
            let ref_name = RefName::new(name).unwrap();
            inner.refs.insert(
                name.to_string(),
                GitRef {
                    name: ref_name,
                    sha,
                    target: RefTarget::Commit,
                },
            );
        }
        Some(ForgeError::Conflict(format!("{} was modified concurrently", name)))
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a release for tests.
///
/// # Example
///
/// ```
/// use release_tagger::forge::mock::release;
/// use release_tagger::forge::ReleaseState;
///
/// let r = release("v1.0.0", ReleaseState::Published, None);
/// assert_eq!(r.tag_name, "v1.0.0");
/// ```
pub fn release(tag: &str, state: ReleaseState, target: Option<&Oid>) -> Release {
    Release {
        tag_name: tag.to_string(),
        state,
        target: target.cloned(),
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_releases(&self, cursor: Option<&str>) -> Result<ReleasePage, ForgeError> {
        self.record(MockOperation::ListReleases {
            cursor: cursor.map(str::to_string),
        });

        let inner = self.inner.lock().unwrap();
        let start: usize = match cursor {
            Some(c) => c.parse().map_err(|_| ForgeError::ApiError {
                status: 400,
                message: format!("bad cursor '{}'", c),
            })?,
            None => 0,
        };
        let page = start / inner.page_size;

        match &inner.fail_on {
            Some(FailOn::ListReleases(e)) => return Err(e.clone()),
            Some(FailOn::ListReleasesPage { page: p, error }) if *p == page => {
                return Err(error.clone())
            }
            _ => {}
        }

        let end = (start + inner.page_size).min(inner.releases.len());
        let releases = inner.releases.get(start..end).unwrap_or_default().to_vec();
        let next = (end < inner.releases.len()).then(|| end.to_string());

        Ok(ReleasePage { releases, next })
    }

    async fn get_ref(&self, name: &RefName) -> Result<Option<GitRef>, ForgeError> {
        self.record(MockOperation::GetRef {
            name: name.to_string(),
        });

        let inner = self.inner.lock().unwrap();
        if let Some(FailOn::GetRef(e)) = &inner.fail_on {
            return Err(e.clone());
        }
        Ok(inner.refs.get(name.as_str()).cloned())
    }

    async fn create_ref(&self, name: &RefName, sha: &Oid) -> Result<GitRef, ForgeError> {
        self.record(MockOperation::CreateRef {
            name: name.to_string(),
            sha: sha.to_string(),
        });

        if let Some(e) = self.check_write(name.as_str()) {
            return Err(e);
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.refs.contains_key(name.as_str()) {
            return Err(ForgeError::Conflict(format!(
                "Reference already exists: {}",
                name
            )));
        }

        let created = GitRef {
            name: name.clone(),
            sha: sha.clone(),
            target: RefTarget::Commit,
        };
        inner.refs.insert(name.to_string(), created.clone());
        Ok(created)
    }

    async fn update_ref(
        &self,
        name: &RefName,
        sha: &Oid,
        force: bool,
    ) -> Result<GitRef, ForgeError> {
        self.record(MockOperation::UpdateRef {
            name: name.to_string(),
            sha: sha.to_string(),
            force,
        });

        if let Some(e) = self.check_write(name.as_str()) {
            return Err(e);
        }

        let mut inner = self.inner.lock().unwrap();
        let existing = inner
            .refs
            .get_mut(name.as_str())
            .ok_or_else(|| ForgeError::NotFound(format!("Reference does not exist: {}", name)))?;

        existing.sha = sha.clone();
        existing.target = RefTarget::Commit;
        Ok(existing.clone())
    }
}
