//! core::event
//!
//! The triggering release event.
//!
//! # Sources
//!
//! Inside GitHub Actions the event is read from the runner environment:
//! - `GITHUB_EVENT_NAME` - workflow trigger (`release` for release events)
//! - `GITHUB_EVENT_PATH` - path to the JSON webhook payload
//! - `GITHUB_SHA` - commit the release tag points at
//!
//! Outside Actions the CLI builds a [`ReleaseEvent`] from flags instead.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::types::{Oid, TypeError};

/// Errors from reading the triggering event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to read event payload '{path}'")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse event payload: {0}")]
    ParseError(String),

    #[error("invalid commit sha in event")]
    InvalidSha(#[from] TypeError),

    #[error("no event supplied: run inside a release workflow or pass --event and --tag")]
    Missing,
}

/// Kind of the triggering event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A release was published.
    Published,
    /// A release was edited.
    Edited,
    /// Any other trigger (`push`, release `deleted`, ...).
    Other(String),
}

impl EventKind {
    /// Map a workflow event name and payload action to a kind.
    pub fn from_trigger(event_name: &str, action: Option<&str>) -> Self {
        match (event_name, action) {
            ("release", Some("published")) => EventKind::Published,
            ("release", Some("edited")) => EventKind::Edited,
            ("release", Some(action)) => EventKind::Other(format!("release.{}", action)),
            (name, _) => EventKind::Other(name.to_string()),
        }
    }

    /// Parse the value of the `--event` flag.
    pub fn from_flag(value: &str) -> Self {
        match value {
            "published" => EventKind::Published,
            "edited" => EventKind::Edited,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Published => write!(f, "published"),
            EventKind::Edited => write!(f, "edited"),
            EventKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A release event as seen by the tagger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEvent {
    /// Event kind
    pub kind: EventKind,
    /// Raw tag name of the release, if the event carries one
    pub tag: Option<String>,
    /// Release is a draft
    pub draft: bool,
    /// Release is flagged as a prerelease on the platform
    pub prerelease: bool,
    /// Commit the release points at, if known
    pub sha: Option<Oid>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    action: Option<String>,
    release: Option<PayloadRelease>,
}

#[derive(Debug, Deserialize)]
struct PayloadRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    prerelease: bool,
}

impl ReleaseEvent {
    /// Build an event from a webhook payload.
    ///
    /// # Example
    ///
    /// ```
    /// use release_tagger::core::event::{EventKind, ReleaseEvent};
    ///
    /// let payload = r#"{"action":"published","release":{"tag_name":"v1.2.0"}}"#;
    /// let event = ReleaseEvent::from_payload("release", payload, None).unwrap();
    /// assert_eq!(event.kind, EventKind::Published);
    /// assert_eq!(event.tag.as_deref(), Some("v1.2.0"));
    /// ```
    pub fn from_payload(
        event_name: &str,
        payload: &str,
        sha: Option<&str>,
    ) -> Result<Self, EventError> {
        let payload: Payload =
            serde_json::from_str(payload).map_err(|e| EventError::ParseError(e.to_string()))?;

        let kind = EventKind::from_trigger(event_name, payload.action.as_deref());
        let sha = sha.filter(|s| !s.is_empty()).map(Oid::new).transpose()?;

        Ok(match payload.release {
            Some(release) => Self {
                kind,
                tag: Some(release.tag_name),
                draft: release.draft,
                prerelease: release.prerelease,
                sha,
            },
            None => Self {
                kind,
                tag: None,
                draft: false,
                prerelease: false,
                sha,
            },
        })
    }

    /// Read the event from the Actions runner environment.
    ///
    /// Returns `Ok(None)` when not running inside a workflow
    /// (`GITHUB_EVENT_NAME` unset).
    pub fn from_actions_env<F>(env: F) -> Result<Option<Self>, EventError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(event_name) = env("GITHUB_EVENT_NAME") else {
            return Ok(None);
        };

        let sha = env("GITHUB_SHA");
        let payload = match env("GITHUB_EVENT_PATH") {
            Some(path) => read_payload(Path::new(&path))?,
            None => "{}".to_string(),
        };

        Self::from_payload(&event_name, &payload, sha.as_deref()).map(Some)
    }
}

fn read_payload(path: &Path) -> Result<String, EventError> {
    std::fs::read_to_string(path).map_err(|e| EventError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}
