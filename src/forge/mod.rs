//! forge
//!
//! Abstraction for the remote release and ref store.
//!
//! # Architecture
//!
//! The `Forge` trait defines the four remote capabilities the tagger uses:
//! listing releases (paged), and reading, creating and moving refs. The
//! engine only ever talks to `dyn Forge`, so the policy and synchronization
//! logic run unchanged against GitHub or the in-memory mock.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - [`github`]: GitHub implementation using the REST API
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use release_tagger::forge::{github::GitHubForge, Forge};
//!
//! let forge = GitHubForge::new(config.token.clone(), config.repository.clone());
//! let first = forge.list_releases(None).await?;
//! println!("{} releases on the first page", first.releases.len());
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
