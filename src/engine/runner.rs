//! engine::runner
//!
//! Engine runner - the single entry point for a tagging run.
//!
//! # Architecture
//!
//! The runner enforces the lifecycle:
//!
//! ```text
//! Gate -> Resolve commit -> Scan -> Plan -> Execute -> Return
//! ```
//!
//! Gating happens before any remote call, so an out-of-scope event never
//! touches the forge. Policy no-ops are `RunOutcome::Skipped`, never errors.
//!
//! # Invariants
//!
//! - Gating is always performed before scanning
//! - The executor is the only component that writes refs
//! - The run holds no state between invocations
//!
//! # Example
//!
//! ```ignore
//! use release_tagger::engine::runner::{run, RunOutcome};
//!
//! match run(&forge, &config, &event, &ctx).await? {
//!     RunOutcome::Tagged(result) => println!("moved {}", result.ref_name),
//!     RunOutcome::Skipped(reason) => println!("{}", reason),
//! }
//! ```

use thiserror::Error;

use super::exec::{ExecError, Executor, SyncResult};
use super::gate::{gate, GateResult, SkipReason};
use super::plan::{decide, Decision, LatestDecision};
use super::scan::{survey, ScanError};
use super::Context;
use crate::core::config::Config;
use crate::core::event::ReleaseEvent;
use crate::core::types::{Oid, RefName};
use crate::forge::{Forge, ForgeError, RefTarget};
use crate::ui::output;

/// Errors from the engine runner.
#[derive(Debug, Error)]
pub enum RunError {
    /// The forge rejected the credentials.
    #[error("authentication failed: {0}")]
    Auth(ForgeError),

    /// Surveying releases failed.
    #[error(transparent)]
    Api(ScanError),

    /// The forge failed while looking up the release tag.
    #[error("failed to look up release tag '{tag}'")]
    TagLookup {
        tag: String,
        #[source]
        source: ForgeError,
    },

    /// The release's commit could not be determined.
    #[error("cannot resolve the commit for release tag '{tag}': {reason}")]
    UnresolvedCommit { tag: String, reason: String },

    /// Applying the plan failed, possibly after some refs moved.
    #[error(transparent)]
    Sync(#[from] ExecError),
}

impl RunError {
    /// Check if this is an authentication failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, RunError::Auth(_))
    }

    /// Check if a remote call failed for reasons other than credentials.
    pub fn is_api(&self) -> bool {
        match self {
            RunError::Api(_) | RunError::TagLookup { .. } => true,
            RunError::Sync(exec) => exec.forge_error().is_some(),
            RunError::Auth(_) | RunError::UnresolvedCommit { .. } => false,
        }
    }
}

impl From<ScanError> for RunError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Forge(e) if e.is_auth() => RunError::Auth(e),
            other => RunError::Api(other),
        }
    }
}

/// How a run ended successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was written.
    Skipped(SkipReason),
    /// The plan was applied.
    Tagged(SyncResult),
}

/// Run the tagging lifecycle for one event.
///
/// # Errors
///
/// Fatal remote failures only; see [`RunError`].
pub async fn run(
    forge: &dyn Forge,
    config: &Config,
    event: &ReleaseEvent,
    ctx: &Context,
) -> Result<RunOutcome, RunError> {
    let verbosity = ctx.verbosity();

    // Step 1: Gate
    output::debug(format!("Gating {} event", event.kind), verbosity);
    let incoming = match gate(event) {
        GateResult::Applicable(version) => version,
        GateResult::NotApplicable(reason) => {
            output::debug(format!("Not applicable: {}", reason), verbosity);
            return Ok(RunOutcome::Skipped(reason));
        }
    };

    // Step 2: Resolve the release commit
    let sha = match &event.sha {
        Some(sha) => sha.clone(),
        None => resolve_tag_commit(forge, incoming.tag()).await?,
    };
    output::debug(
        format!("Release {} is commit {}", incoming.tag(), sha.short(7)),
        verbosity,
    );

    // Step 3: Scan
    output::debug(format!("Listing releases via {}", forge.name()), verbosity);
    let survey = survey(forge).await?;
    for skipped in &survey.skipped {
        output::debug(
            format!("Ignoring release '{}': {}", skipped.tag, skipped.error),
            verbosity,
        );
    }
    output::debug(
        format!(
            "Surveyed {} releases; highest is {}",
            survey.releases_seen,
            survey
                .repo_latest
                .as_ref()
                .map(|l| l.version.to_string())
                .unwrap_or_else(|| "none".to_string())
        ),
        verbosity,
    );

    // Step 4: Plan
    let plan = match decide(&incoming, &sha, &survey, config.publish_latest_tag) {
        Decision::Apply(plan) => plan,
        Decision::Skip(reason) => {
            output::debug(format!("Policy skip: {}", reason), verbosity);
            return Ok(RunOutcome::Skipped(reason));
        }
    };
    output::debug(
        format!("Moving {} ref(s) for release {}", plan.moves().len(), plan.version),
        verbosity,
    );
    match &plan.latest {
        LatestDecision::Move(_) => {}
        LatestDecision::Disabled => output::debug("Publishing latest is disabled", verbosity),
        LatestDecision::Behind { repo_latest } => output::debug(
            format!("latest stays with higher release {}", repo_latest),
            verbosity,
        ),
    }

    // Step 5: Execute
    let executor = Executor::new(forge, config.ref_namespace());
    let result = executor.apply(&plan).await.map_err(|e| match e {
        ExecError::Forge {
            source, applied, ..
        } if source.is_auth() && applied.is_empty() => RunError::Auth(source),
        other => RunError::Sync(other),
    })?;

    for applied in &result.applied {
        output::debug(applied, verbosity);
    }

    Ok(RunOutcome::Tagged(result))
}

/// Look up the commit a release tag points at.
///
/// Annotated tags point at a tag object rather than a commit; those need
/// the commit supplied with the event.
async fn resolve_tag_commit(forge: &dyn Forge, tag: &str) -> Result<Oid, RunError> {
    let unresolved = |reason: String| RunError::UnresolvedCommit {
        tag: tag.to_string(),
        reason,
    };

    let name = RefName::for_tag(tag).map_err(|e| unresolved(e.to_string()))?;
    match forge.get_ref(&name).await {
        Ok(Some(found)) if found.target == RefTarget::Commit => Ok(found.sha),
        Ok(Some(_)) => Err(unresolved(
            "tag is annotated; pass the commit with --sha".to_string(),
        )),
        Ok(None) => Err(unresolved("tag does not exist".to_string())),
        Err(e) if e.is_auth() => Err(RunError::Auth(e)),
        Err(source) => Err(RunError::TagLookup {
            tag: tag.to_string(),
            source,
        }),
    }
}
