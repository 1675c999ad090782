//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! Every flag is optional. Inside a GitHub Actions release workflow the
//! event, repository and inputs come from the runner environment; flags
//! override them.

use clap::Parser;
use std::path::PathBuf;

/// release-tagger - keep major-version and latest tags on the newest release
#[derive(Parser, Debug)]
#[command(name = "release-tagger")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API token (defaults to the `token` action input)
    #[arg(long)]
    pub token: Option<String>,

    /// Repository as owner/name (defaults to GITHUB_REPOSITORY)
    #[arg(long, value_name = "OWNER/NAME")]
    pub repository: Option<String>,

    /// REST API base URL (defaults to GITHUB_API_URL or api.github.com)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Release event action to simulate (published, edited, ...)
    #[arg(long, value_name = "ACTION")]
    pub event: Option<String>,

    /// Release tag of the simulated event
    #[arg(long)]
    pub tag: Option<String>,

    /// Commit the release tag points at
    #[arg(long)]
    pub sha: Option<String>,

    /// Also move the `latest` ref
    #[arg(long, conflicts_with = "no_publish_latest_tag")]
    pub publish_latest_tag: bool,

    /// Never move the `latest` ref
    #[arg(long)]
    pub no_publish_latest_tag: bool,

    /// Keep movable refs as branches instead of tags
    #[arg(long, conflicts_with = "no_prefer_branch_releases")]
    pub prefer_branch_releases: bool,

    /// Keep movable refs as tags
    #[arg(long)]
    pub no_prefer_branch_releases: bool,

    /// Config file (defaults to .github/release-tagger.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Whether the event is described by flags rather than the environment.
    pub fn has_event_flags(&self) -> bool {
        self.event.is_some() || self.tag.is_some()
    }

    /// Explicit `latest` setting, if either flag was given.
    pub fn publish_latest_flag(&self) -> Option<bool> {
        tri_state(self.publish_latest_tag, self.no_publish_latest_tag)
    }

    /// Explicit namespace setting, if either flag was given.
    pub fn prefer_branch_flag(&self) -> Option<bool> {
        tri_state(self.prefer_branch_releases, self.no_prefer_branch_releases)
    }
}

fn tri_state(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
