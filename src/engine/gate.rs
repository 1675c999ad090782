//! engine::gate
//!
//! Event gating: is this event something the tagger acts on?
//!
//! # Architecture
//!
//! Gating is the first step of a run. It looks only at the triggering event
//! and decides `Applicable` or `NotApplicable(reason)`. Non-applicable events
//! are not errors: the run ends successfully with an informational message
//! and no remote call is made.
//!
//! An event is applicable when:
//! - it is a release `published` or `edited` event,
//! - the release carries a tag that parses as strict semver,
//! - the release is neither a draft nor a prerelease.
//!
//! # Invariants
//!
//! - Gating is pure and deterministic
//! - Gating never touches the forge
//!
//! # Example
//!
//! ```
//! use release_tagger::core::event::{EventKind, ReleaseEvent};
//! use release_tagger::engine::gate::{gate, GateResult};
//!
//! let event = ReleaseEvent {
//!     kind: EventKind::Published,
//!     tag: Some("release-42".to_string()),
//!     draft: false,
//!     prerelease: false,
//!     sha: None,
//! };
//!
//! match gate(&event) {
//!     GateResult::Applicable(version) => println!("tagging {}", version),
//!     GateResult::NotApplicable(reason) => println!("skipping: {}", reason),
//! }
//! ```

use crate::core::event::{EventKind, ReleaseEvent};
use crate::core::version::{ReleaseVersion, VersionError};

/// Why a run ended without touching any ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Not a release published/edited event.
    NotReleaseEvent(EventKind),
    /// The event carries no release tag.
    MissingTag,
    /// The release tag is not strict semver.
    InvalidVersionTag(VersionError),
    /// The release is a draft.
    Draft,
    /// The release is a prerelease.
    Prerelease(String),
    /// A higher release already owns the major ref.
    OlderThanMajor {
        incoming: ReleaseVersion,
        current: ReleaseVersion,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotReleaseEvent(kind) => write!(
                f,
                "This action should only be used in a release context (event: {})",
                kind
            ),
            SkipReason::MissingTag => write!(f, "The release event carries no tag"),
            SkipReason::InvalidVersionTag(e) => write!(
                f,
                "This action can only operate on semantically versioned releases ({})",
                e
            ),
            SkipReason::Draft => write!(f, "Draft releases are not tagged"),
            SkipReason::Prerelease(tag) => {
                write!(f, "Prerelease {} does not move any movable tag", tag)
            }
            SkipReason::OlderThanMajor { incoming, current } => write!(
                f,
                "Nothing to do because release {} is earlier than v{} tag release {}",
                incoming,
                current.major(),
                current
            ),
        }
    }
}

/// Result of gating an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateResult {
    /// The event is in scope; carries the parsed release version.
    Applicable(ReleaseVersion),
    /// The event is out of scope.
    NotApplicable(SkipReason),
}

/// Gate an event.
pub fn gate(event: &ReleaseEvent) -> GateResult {
    if !matches!(event.kind, EventKind::Published | EventKind::Edited) {
        return GateResult::NotApplicable(SkipReason::NotReleaseEvent(event.kind.clone()));
    }

    let Some(tag) = event.tag.as_deref() else {
        return GateResult::NotApplicable(SkipReason::MissingTag);
    };

    let version = match ReleaseVersion::parse(tag) {
        Ok(version) => version,
        Err(e) => return GateResult::NotApplicable(SkipReason::InvalidVersionTag(e)),
    };

    if event.draft {
        return GateResult::NotApplicable(SkipReason::Draft);
    }

    if event.prerelease || version.is_prerelease() {
        return GateResult::NotApplicable(SkipReason::Prerelease(tag.to_string()));
    }

    GateResult::Applicable(version)
}
