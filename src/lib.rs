//! release-tagger - keeps movable release refs on the newest release
//!
//! When a semantically versioned release is published or edited,
//! release-tagger moves the `v{major}` ref (and optionally `latest`) to the
//! release's commit, provided no higher release already owns it.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates the Gate → Scan → Plan → Execute lifecycle
//! - [`core`] - Domain types, versions, events and configuration
//! - [`forge`] - Abstraction over the remote (GitHub REST, in-memory mock)
//! - [`ui`] - Output utilities
//!
//! # Correctness Invariants
//!
//! 1. A ref never moves to a release lower than the highest of its line
//! 2. `latest` only moves to the repository-wide highest release
//! 3. All ref writes flow through a single executor
//! 4. Re-running on the same event performs no write

pub mod cli;
pub mod core;
pub mod engine;
pub mod forge;
pub mod ui;
