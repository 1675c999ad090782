//! engine
//!
//! Orchestrates a tagging run: Gate -> Scan -> Plan -> Execute.
//!
//! # Architecture
//!
//! 1. **Gate**: Decide whether the triggering event is in scope
//! 2. **Scan**: Survey the repository's releases
//! 3. **Plan**: Apply the tagging policy to produce the ref moves
//! 4. **Execute**: Bring each movable ref to its target
//!
//! Out-of-scope events and policy no-ops end the run early with a
//! [`SkipReason`]; they are outcomes, not errors.
//!
//! # Invariants
//!
//! - Gating and planning are pure
//! - The engine never writes a ref directly; all writes flow through the
//!   [`Executor`]
//! - Every run re-derives its state from the forge

pub mod exec;
pub mod gate;
pub mod plan;
pub mod runner;
pub mod scan;

// Re-exports for convenience
pub use exec::{AppliedRef, ExecError, Executor, RefOutcome, SyncResult};
pub use gate::{gate, GateResult, SkipReason};
pub use plan::{decide, Decision, LatestDecision, Plan, RefMove};
pub use runner::{run, RunError, RunOutcome};
pub use scan::{survey, ScanError, Survey};

use crate::ui::output::Verbosity;

/// Execution context for a run.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// Output verbosity for this run.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_default() {
        let ctx = Context::default();
        assert!(!ctx.debug);
        assert!(!ctx.quiet);
        assert_eq!(ctx.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn quiet_wins_over_debug() {
        let ctx = Context {
            debug: true,
            quiet: true,
        };
        assert_eq!(ctx.verbosity(), Verbosity::Quiet);
    }
}
