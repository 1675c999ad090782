//! Integration tests for the release-tagger binary.
//!
//! These tests exercise the CLI end to end: soft exits, configuration
//! errors and a full run against a local mock of the REST API.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHA: &str = "abc123def4567890abc123def4567890abc12345";

/// Variables from the surrounding environment that would change behaviour.
const AMBIENT: &[&str] = &[
    "GITHUB_ACTIONS",
    "GITHUB_EVENT_NAME",
    "GITHUB_EVENT_PATH",
    "GITHUB_SHA",
    "GITHUB_OUTPUT",
    "GITHUB_REPOSITORY",
    "GITHUB_API_URL",
    "GITHUB_WORKSPACE",
    "GITHUB_TOKEN",
    "INPUT_TOKEN",
    "INPUT_PUBLISH_LATEST_TAG",
    "INPUT_PREFER_BRANCH_RELEASES",
    "TAGGER_CONFIG",
    "RUNNER_DEBUG",
];

/// Get a command for running release-tagger in an isolated directory.
fn tagger(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("release-tagger").unwrap();
    for var in AMBIENT {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn version_flag_works() {
    let dir = TempDir::new().unwrap();
    tagger(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("release-tagger"));
}

#[test]
fn non_semver_tag_is_soft_exit() {
    let dir = TempDir::new().unwrap();
    tagger(&dir)
        .args(["--event", "published", "--tag", "release-42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("semantically versioned"))
        .stdout(predicate::str::contains("Actions-R-Us/actions-tagger/issues"));
}

#[test]
fn non_release_event_is_soft_exit() {
    let dir = TempDir::new().unwrap();
    tagger(&dir)
        .args(["--event", "push"])
        .assert()
        .success()
        .stdout(predicate::str::contains("release context"));
}

#[test]
fn quiet_soft_exit_prints_nothing() {
    let dir = TempDir::new().unwrap();
    tagger(&dir)
        .args(["--quiet", "--event", "push"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn draft_from_actions_payload_is_soft_exit() {
    let dir = TempDir::new().unwrap();
    let payload = dir.path().join("event.json");
    std::fs::write(
        &payload,
        r#"{"action":"published","release":{"tag_name":"v1.0.0","draft":true}}"#,
    )
    .unwrap();

    tagger(&dir)
        .env("GITHUB_EVENT_NAME", "release")
        .env("GITHUB_EVENT_PATH", &payload)
        .env("GITHUB_SHA", SHA)
        .assert()
        .success()
        .stdout(predicate::str::contains("Draft releases are not tagged"));
}

#[test]
fn missing_event_fails() {
    let dir = TempDir::new().unwrap();
    tagger(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no event supplied"));
}

#[test]
fn missing_token_fails() {
    let dir = TempDir::new().unwrap();
    tagger(&dir)
        .args(["--tag", "v1.0.0", "--repository", "octo/widgets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API token"));
}

#[test]
fn invalid_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tagger.toml");
    std::fs::write(&config, "publish_latest = true\n").unwrap();

    tagger(&dir)
        .args(["--tag", "v1.0.0", "--token", "t", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn errors_are_annotations_inside_actions() {
    let dir = TempDir::new().unwrap();
    tagger(&dir)
        .env("GITHUB_ACTIONS", "true")
        .args(["--tag", "v1.0.0", "--repository", "octo/widgets"])
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("::error::"));
}

#[tokio::test(flavor = "multi_thread")]
async fn full_run_writes_step_outputs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"tag_name": "v2.0.0", "draft": false, "prerelease": false, "target_commitish": "main"},
            {"tag_name": "v1.4.0", "draft": false, "prerelease": false, "target_commitish": "main"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/git/ref/tags/v2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/git/ref/tags/latest"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/widgets/git/refs"))
        .respond_with(|req: &wiremock::Request| {
            let body: serde_json::Value = req.body_json().unwrap();
            ResponseTemplate::new(201).set_body_json(json!({
                "ref": body["ref"],
                "object": {"sha": body["sha"], "type": "commit"}
            }))
        })
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let outputs = dir.path().join("outputs");
    let uri = server.uri();

    let assert = tokio::task::spawn_blocking({
        let dir_path = dir.path().to_path_buf();
        let outputs = outputs.clone();
        move || {
            let mut cmd = Command::cargo_bin("release-tagger").unwrap();
            for var in AMBIENT {
                cmd.env_remove(var);
            }
            cmd.current_dir(dir_path)
                .env("GITHUB_OUTPUT", &outputs)
                .env("INPUT_TOKEN", "t0ken")
                .env("INPUT_PUBLISH_LATEST_TAG", "true")
                .args(["--tag", "v2.0.0", "--sha", SHA, "--repository", "octo/widgets"])
                .args(["--api-url", uri.as_str()])
                .assert()
        }
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("ref_name=v2"))
        .stdout(predicate::str::contains("latest=true"));

    let written = std::fs::read_to_string(&outputs).unwrap();
    assert_eq!(written, "ref_name=v2\nlatest=true\n");
}
