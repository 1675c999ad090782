//! forge::traits
//!
//! Forge trait definition for reading releases and moving refs.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! All methods return `Result` to handle API errors gracefully. The trait is
//! the whole remote surface the tagger needs:
//!
//! - `list_releases` - one page of releases plus a continuation cursor
//! - `get_ref` - read a ref, `None` when absent
//! - `create_ref` - create a ref, `Conflict` when it already exists
//! - `update_ref` - move a ref, `Conflict` on a concurrent write
//!
//! # Example
//!
//! ```ignore
//! use release_tagger::forge::Forge;
//! use release_tagger::core::types::{MovableRef, Oid, RefNamespace};
//!
//! async fn point_v1(forge: &dyn Forge, sha: &Oid) -> Result<(), ForgeError> {
//!     let name = MovableRef::Major(1).ref_name(RefNamespace::Tags);
//!     match forge.get_ref(&name).await? {
//!         None => { forge.create_ref(&name, sha).await?; }
//!         Some(r) if &r.sha == sha => {}
//!         Some(_) => { forge.update_ref(&name, sha, true).await?; }
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Oid, RefName};

/// Errors from forge operations.
///
/// These error types map to common failure modes when interacting
/// with remote hosting services like GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A ref write lost a race with another writer.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ForgeError {
    /// Whether the error means the credential was rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, ForgeError::AuthFailed(_))
    }
}

/// Publication state of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    /// Published, not a prerelease
    Published,
    /// Prerelease on the platform
    Prerelease,
    /// Draft, invisible externally
    Draft,
}

impl std::fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseState::Published => write!(f, "published"),
            ReleaseState::Prerelease => write!(f, "prerelease"),
            ReleaseState::Draft => write!(f, "draft"),
        }
    }
}

/// A release as listed by the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Tag name (not necessarily semver)
    pub tag_name: String,
    /// Publication state
    pub state: ReleaseState,
    /// Commit the release targets, when the forge reports a SHA
    pub target: Option<Oid>,
}

/// One page of releases.
#[derive(Debug, Clone, Default)]
pub struct ReleasePage {
    /// Releases on this page
    pub releases: Vec<Release>,
    /// Cursor for the next page; `None` when this is the last page
    pub next: Option<String>,
}

/// Kind of object a ref points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefTarget {
    /// A commit
    Commit,
    /// An annotated tag object
    Tag,
    /// Anything else (tree, blob)
    Other,
}

/// A ref as stored on the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitRef {
    /// Fully-qualified name (`refs/tags/v1`)
    pub name: RefName,
    /// Object the ref points at
    pub sha: Oid,
    /// Kind of that object
    pub target: RefTarget,
}

/// The Forge trait for interacting with the remote release and ref store.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. Callers should handle:
/// - `AuthFailed`: credential rejected
/// - `Conflict`: a concurrent writer got there first; re-read and retry
/// - `RateLimited` / `ApiError` / `NetworkError`: remote failure
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// List one page of releases, newest first.
    ///
    /// Pass `None` for the first page and the previous page's `next` for
    /// the following ones.
    async fn list_releases(&self, cursor: Option<&str>) -> Result<ReleasePage, ForgeError>;

    /// Read a ref.
    ///
    /// # Returns
    ///
    /// `Some(GitRef)` if the ref exists, `None` otherwise.
    async fn get_ref(&self, name: &RefName) -> Result<Option<GitRef>, ForgeError>;

    /// Create a ref pointing at `sha`.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the ref already exists
    async fn create_ref(&self, name: &RefName, sha: &Oid) -> Result<GitRef, ForgeError>;

    /// Move an existing ref to `sha`.
    ///
    /// With `force` the move need not be a fast-forward.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the write lost a race with another writer
    /// - `NotFound` if the ref does not exist
    async fn update_ref(&self, name: &RefName, sha: &Oid, force: bool)
        -> Result<GitRef, ForgeError>;
}
