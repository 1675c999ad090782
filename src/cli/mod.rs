//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Assemble the triggering event and the configuration
//! - Delegate to the engine and report the outcome
//! - Does NOT write refs directly
//!
//! # Exit behaviour
//!
//! Out-of-scope events and policy no-ops exit successfully with an
//! informational message. Fatal errors are returned to `main`, which prints
//! them and exits non-zero.

pub mod args;

pub use args::Cli;

use anyhow::{Context as _, Result};

use crate::core::config::{Config, Overrides};
use crate::core::event::{EventError, EventKind, ReleaseEvent};
use crate::core::types::Oid;
use crate::engine::{self, GateResult, RunError, RunOutcome, SkipReason, SyncResult};
use crate::forge::github::GitHubForge;
use crate::ui::output::{self, Verbosity};

/// Where to report misbehaviour.
pub const BUG_REPORT_URL: &str = "https://github.com/Actions-R-Us/actions-tagger/issues";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let env = |key: &str| std::env::var(key).ok();

    let ctx = engine::Context {
        debug: cli.debug || env("RUNNER_DEBUG").is_some_and(|v| v == "1"),
        quiet: cli.quiet,
    };
    let verbosity = ctx.verbosity();

    let event = load_event(&cli, env)?;

    // Soft exits need neither a token nor the network
    if let GateResult::NotApplicable(reason) = engine::gate(&event) {
        report_skip(&reason, verbosity);
        return Ok(());
    }

    let loaded = Config::resolve(&overrides(&cli), env)?;
    for warning in &loaded.warnings {
        output::warn(&warning.message, verbosity);
    }
    let config = loaded.config;
    if let Some(path) = config.loaded_from() {
        output::debug(format!("Loaded config from {}", path.display()), verbosity);
    }

    let forge = GitHubForge::with_api_base(
        config.token.clone(),
        config.repository.clone(),
        config.api_base.as_str(),
    );

    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    match rt.block_on(engine::run(&forge, &config, &event, &ctx)) {
        Ok(RunOutcome::Tagged(result)) => report_tagged(&result, verbosity),
        Ok(RunOutcome::Skipped(reason)) => {
            report_skip(&reason, verbosity);
            Ok(())
        }
        Err(err) => {
            report_failure(&err, verbosity);
            Err(err.into())
        }
    }
}

/// Build the event from flags, falling back to the Actions environment.
///
/// Flags win: `--event`/`--tag` describe a synthetic event, and `--sha`
/// overrides the commit of either source.
pub fn load_event<F>(cli: &Cli, env: F) -> Result<ReleaseEvent, EventError>
where
    F: Fn(&str) -> Option<String>,
{
    let sha = cli.sha.as_deref().map(Oid::new).transpose()?;

    if cli.has_event_flags() {
        return Ok(ReleaseEvent {
            kind: EventKind::from_flag(cli.event.as_deref().unwrap_or("published")),
            tag: cli.tag.clone(),
            draft: false,
            prerelease: false,
            sha,
        });
    }

    let mut event = ReleaseEvent::from_actions_env(env)?.ok_or(EventError::Missing)?;
    if sha.is_some() {
        event.sha = sha;
    }
    Ok(event)
}

fn overrides(cli: &Cli) -> Overrides {
    Overrides {
        config_path: cli.config.clone(),
        token: cli.token.clone(),
        repository: cli.repository.clone(),
        api_url: cli.api_url.clone(),
        publish_latest_tag: cli.publish_latest_flag(),
        prefer_branch_releases: cli.prefer_branch_flag(),
    }
}

fn report_skip(reason: &SkipReason, verbosity: Verbosity) {
    output::print(reason, verbosity);
    output::print(
        "If you believe this to be an error, please submit a bug report",
        verbosity,
    );
    output::print(BUG_REPORT_URL, verbosity);
}

fn report_tagged(result: &SyncResult, verbosity: Verbosity) -> Result<()> {
    for applied in &result.applied {
        output::print(applied, verbosity);
    }

    let latest = result.latest_updated.to_string();
    output::set_output("ref_name", &result.ref_name).context("failed to write step output")?;
    output::set_output("latest", &latest).context("failed to write step output")?;

    output::success(format!("ref_name={}", result.ref_name), verbosity);
    output::success(format!("latest={}", latest), verbosity);
    Ok(())
}

/// Name the refs that moved before a failure; they are not rolled back.
fn report_failure(err: &RunError, verbosity: Verbosity) {
    if let RunError::Sync(exec) = err {
        for applied in exec.applied() {
            output::warn(format!("Before the failure: {}", applied), verbosity);
        }
    }
    if err.is_auth() {
        output::warn(
            "The token needs 'contents: write' permission on the repository",
            verbosity,
        );
    } else if err.is_api() {
        output::warn(
            "The GitHub API call failed; re-running the workflow is safe",
            verbosity,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    const SHA: &str = "abc123def4567890abc123def4567890abc12345";

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("release-tagger").chain(args.iter().copied()))
            .unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn event_from_flags_defaults_to_published() {
        let event = load_event(&cli(&["--tag", "v1.0.0"]), no_env).unwrap();
        assert_eq!(event.kind, EventKind::Published);
        assert_eq!(event.tag.as_deref(), Some("v1.0.0"));
        assert!(event.sha.is_none());
    }

    #[test]
    fn event_flag_without_tag() {
        let event = load_event(&cli(&["--event", "push"]), no_env).unwrap();
        assert_eq!(event.kind, EventKind::Other("push".into()));
        assert!(event.tag.is_none());
    }

    #[test]
    fn missing_event() {
        let result = load_event(&cli(&[]), no_env);
        assert!(matches!(result, Err(EventError::Missing)));
    }

    #[test]
    fn invalid_sha_flag() {
        let result = load_event(&cli(&["--tag", "v1.0.0", "--sha", "zzz"]), no_env);
        assert!(matches!(result, Err(EventError::InvalidSha(_))));
    }

    #[test]
    fn sha_flag_overrides_actions_env() {
        let dir = tempfile::TempDir::new().unwrap();
        let payload = dir.path().join("event.json");
        std::fs::write(
            &payload,
            r#"{"action":"edited","release":{"tag_name":"v3.1.0"}}"#,
        )
        .unwrap();

        let env: HashMap<&str, String> = [
            ("GITHUB_EVENT_NAME", "release".to_string()),
            ("GITHUB_EVENT_PATH", payload.display().to_string()),
            ("GITHUB_SHA", "f".repeat(40)),
        ]
        .into_iter()
        .collect();

        let event = load_event(&cli(&["--sha", SHA]), |k| env.get(k).cloned()).unwrap();
        assert_eq!(event.kind, EventKind::Edited);
        assert_eq!(event.sha.unwrap().as_str(), SHA);
    }

    #[test]
    fn overrides_carry_flags() {
        let o = overrides(&cli(&[
            "--token",
            "t",
            "--repository",
            "octo/widgets",
            "--no-publish-latest-tag",
        ]));
        assert_eq!(o.token.as_deref(), Some("t"));
        assert_eq!(o.repository.as_deref(), Some("octo/widgets"));
        assert_eq!(o.publish_latest_tag, Some(false));
        assert_eq!(o.prefer_branch_releases, None);
    }
}
