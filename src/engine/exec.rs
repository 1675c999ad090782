//! engine::exec
//!
//! Applies a plan against the forge's ref store.
//!
//! # Protocol
//!
//! For each move, major ref first:
//!
//! 1. Read the ref.
//! 2. Absent: create it. At the target already: nothing to write.
//!    Elsewhere: force-update it.
//! 3. A write that loses a race (`ForgeError::Conflict`) is retried once,
//!    starting again from the read. A second conflict is
//!    [`ExecError::RefConflict`].
//! 4. Any other forge failure is [`ExecError::Forge`] and stops the run.
//!
//! There is no rollback. Every ref write is independently idempotent, so a
//! run that stops after moving the major ref leaves a valid state that the
//! next run reconciles. Errors carry the refs already applied so the caller
//! can report partial application.
//!
//! # Example
//!
//! ```ignore
//! let executor = Executor::new(&forge, RefNamespace::Tags);
//! let result = executor.apply(&plan).await?;
//! println!("{} (latest: {})", result.ref_name, result.latest_updated);
//! ```

use thiserror::Error;

use super::plan::{Plan, RefMove};
use crate::core::types::{MovableRef, Oid, RefName, RefNamespace};
use crate::forge::{Forge, ForgeError};

/// What a sync did to one ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefOutcome {
    /// The ref did not exist and was created.
    Created,
    /// The ref was moved from `previous`.
    Updated { previous: Oid },
    /// The ref already pointed at the target; nothing was written.
    Unchanged,
}

impl RefOutcome {
    /// Whether a write reached the forge.
    pub fn wrote(&self) -> bool {
        !matches!(self, RefOutcome::Unchanged)
    }
}

/// A ref that has been brought to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRef {
    pub target: MovableRef,
    pub name: RefName,
    pub sha: Oid,
    pub outcome: RefOutcome,
}

impl std::fmt::Display for AppliedRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            RefOutcome::Created => write!(f, "created {} at {}", self.name, self.sha.short(7)),
            RefOutcome::Updated { previous } => write!(
                f,
                "moved {} from {} to {}",
                self.name,
                previous.short(7),
                self.sha.short(7)
            ),
            RefOutcome::Unchanged => {
                write!(f, "{} already at {}", self.name, self.sha.short(7))
            }
        }
    }
}

/// Result of applying a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    /// Short name of the major ref (`v2`)
    pub ref_name: String,
    /// Whether `latest` now points at the release
    pub latest_updated: bool,
    /// Per-ref outcomes, in application order
    pub applied: Vec<AppliedRef>,
}

impl SyncResult {
    /// Number of writes that reached the forge.
    pub fn writes(&self) -> usize {
        self.applied.iter().filter(|a| a.outcome.wrote()).count()
    }
}

/// Errors from applying a plan.
#[derive(Debug, Error)]
pub enum ExecError {
    /// Another writer moved the ref during both attempts.
    #[error("{name} was modified concurrently twice; re-run the workflow to reconcile")]
    RefConflict {
        name: RefName,
        applied: Vec<AppliedRef>,
    },

    /// The forge rejected or failed a read or write.
    #[error("failed to sync {name}")]
    Forge {
        name: RefName,
        #[source]
        source: ForgeError,
        applied: Vec<AppliedRef>,
    },
}

impl ExecError {
    /// Refs that were brought to their target before the failure.
    pub fn applied(&self) -> &[AppliedRef] {
        match self {
            ExecError::RefConflict { applied, .. } | ExecError::Forge { applied, .. } => applied,
        }
    }

    /// The underlying forge error, if any.
    pub fn forge_error(&self) -> Option<&ForgeError> {
        match self {
            ExecError::Forge { source, .. } => Some(source),
            ExecError::RefConflict { .. } => None,
        }
    }
}

/// Failure of a single ref sync, before partial results are attached.
enum SyncFailure {
    Conflict,
    Forge(ForgeError),
}

/// Applies plans to the forge.
pub struct Executor<'a> {
    forge: &'a dyn Forge,
    namespace: RefNamespace,
}

impl<'a> Executor<'a> {
    /// Create an executor writing refs in `namespace`.
    pub fn new(forge: &'a dyn Forge, namespace: RefNamespace) -> Self {
        Self { forge, namespace }
    }

    /// Apply every move of the plan, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing ref; see [`ExecError`].
    pub async fn apply(&self, plan: &Plan) -> Result<SyncResult, ExecError> {
        let mut applied = Vec::new();

        for mv in plan.moves() {
            let name = mv.target.ref_name(self.namespace);
            match self.sync_ref(&name, mv).await {
                Ok(outcome) => applied.push(AppliedRef {
                    target: mv.target,
                    name,
                    sha: mv.sha.clone(),
                    outcome,
                }),
                Err(SyncFailure::Conflict) => {
                    return Err(ExecError::RefConflict { name, applied })
                }
                Err(SyncFailure::Forge(source)) => {
                    return Err(ExecError::Forge {
                        name,
                        source,
                        applied,
                    })
                }
            }
        }

        let latest_updated = applied.iter().any(|a| a.target == MovableRef::Latest);
        Ok(SyncResult {
            ref_name: plan.major.target.short_name(),
            latest_updated,
            applied,
        })
    }

    /// Bring one ref to its target, retrying once on conflict.
    async fn sync_ref(&self, name: &RefName, mv: &RefMove) -> Result<RefOutcome, SyncFailure> {
        let mut retried = false;

        loop {
            let current = self
                .forge
                .get_ref(name)
                .await
                .map_err(SyncFailure::Forge)?;

            let written = match current {
                Some(existing) if existing.sha == mv.sha => return Ok(RefOutcome::Unchanged),
                Some(existing) => self
                    .forge
                    .update_ref(name, &mv.sha, true)
                    .await
                    .map(|_| RefOutcome::Updated {
                        previous: existing.sha,
                    }),
                None => self
                    .forge
                    .create_ref(name, &mv.sha)
                    .await
                    .map(|_| RefOutcome::Created),
            };

            match written {
                Ok(outcome) => return Ok(outcome),
                Err(ForgeError::Conflict(_)) if !retried => retried = true,
                Err(ForgeError::Conflict(_)) => return Err(SyncFailure::Conflict),
                Err(e) => return Err(SyncFailure::Forge(e)),
            }
        }
    }
}
