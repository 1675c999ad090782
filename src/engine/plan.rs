//! engine::plan
//!
//! The tagging policy: which movable refs move, and where.
//!
//! # Rules
//!
//! Given the incoming release version and the survey of existing releases:
//!
//! 1. If the incoming version is lower than the highest release of its
//!    major line, nothing moves (replays and late edits never regress a
//!    major ref).
//! 2. Otherwise `v{major}` moves to the incoming commit.
//! 3. `latest` moves too, but only when publishing `latest` is enabled and
//!    the incoming version is at least the repository-wide highest release.
//!    An older major line's point release never steals `latest`.
//! 4. When rule 1 applies, rule 3 is skipped.
//!
//! Equal versions still produce a move; the executor turns a move to the
//! current target into a no-op.
//!
//! # Invariants
//!
//! - Planner does not perform I/O
//! - Planner does not mutate any state
//! - Same input always produces the same decision
//!
//! # Example
//!
//! ```
//! use release_tagger::core::types::{MovableRef, Oid};
//! use release_tagger::core::version::ReleaseVersion;
//! use release_tagger::engine::plan::{decide, Decision};
//! use release_tagger::engine::scan::Survey;
//!
//! let incoming = ReleaseVersion::parse("v1.2.0").unwrap();
//! let sha = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//!
//! match decide(&incoming, &sha, &Survey::default(), true) {
//!     Decision::Apply(plan) => {
//!         assert_eq!(plan.major.target, MovableRef::Major(1));
//!         assert!(plan.latest_move().is_some());
//!     }
//!     Decision::Skip(reason) => panic!("unexpected skip: {}", reason),
//! }
//! ```

use super::gate::SkipReason;
use super::scan::Survey;
use crate::core::types::{MovableRef, Oid};
use crate::core::version::ReleaseVersion;

/// A single proposed ref write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefMove {
    /// Which movable ref
    pub target: MovableRef,
    /// Commit it should point at
    pub sha: Oid,
}

/// What happens to `latest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatestDecision {
    /// `latest` moves with the major ref.
    Move(RefMove),
    /// Publishing `latest` is disabled.
    Disabled,
    /// A higher release elsewhere in the repository owns `latest`.
    Behind { repo_latest: ReleaseVersion },
}

/// The writes a run will attempt, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// The incoming release version
    pub version: ReleaseVersion,
    /// Move of `v{major}`
    pub major: RefMove,
    /// Fate of `latest`
    pub latest: LatestDecision,
}

impl Plan {
    /// The `latest` move, if any.
    pub fn latest_move(&self) -> Option<&RefMove> {
        match &self.latest {
            LatestDecision::Move(m) => Some(m),
            _ => None,
        }
    }

    /// All moves in application order (major ref first).
    pub fn moves(&self) -> Vec<&RefMove> {
        std::iter::once(&self.major)
            .chain(self.latest_move())
            .collect()
    }
}

/// Outcome of the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Apply the plan.
    Apply(Plan),
    /// Leave every ref alone.
    Skip(SkipReason),
}

/// Decide which refs move for an incoming release.
pub fn decide(
    incoming: &ReleaseVersion,
    sha: &Oid,
    survey: &Survey,
    publish_latest: bool,
) -> Decision {
    if let Some(current) = survey.major(incoming.major()) {
        if *incoming < current.version {
            return Decision::Skip(SkipReason::OlderThanMajor {
                incoming: incoming.clone(),
                current: current.version.clone(),
            });
        }
    }

    let major = RefMove {
        target: MovableRef::Major(incoming.major()),
        sha: sha.clone(),
    };

    let latest = match &survey.repo_latest {
        _ if !publish_latest => LatestDecision::Disabled,
        Some(repo_latest) if *incoming < repo_latest.version => LatestDecision::Behind {
            repo_latest: repo_latest.version.clone(),
        },
        _ => LatestDecision::Move(RefMove {
            target: MovableRef::Latest,
            sha: sha.clone(),
        }),
    };

    Decision::Apply(Plan {
        version: incoming.clone(),
        major,
        latest,
    })
}
