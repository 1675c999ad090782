//! Integration tests for the GitHub REST forge.
//!
//! These tests run `GitHubForge` against a local wiremock server and check
//! request shapes, pagination and error mapping.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use release_tagger::core::config::{Config, Token};
use release_tagger::core::event::{EventKind, ReleaseEvent};
use release_tagger::core::types::{Oid, RefName, Repository};
use release_tagger::engine::{self, Context, RunOutcome};
use release_tagger::forge::github::GitHubForge;
use release_tagger::forge::{Forge, ForgeError, RefTarget, ReleaseState};

const SHA: &str = "abc123def4567890abc123def4567890abc12345";
const OLD_SHA: &str = "0000000000111111111122222222223333333333";

fn forge(server: &MockServer) -> GitHubForge {
    GitHubForge::with_api_base(
        Token::new("t0ken"),
        Repository::parse("octo/widgets").unwrap(),
        server.uri(),
    )
}

fn ref_json(name: &str, sha: &str, kind: &str) -> serde_json::Value {
    json!({
        "ref": name,
        "node_id": "REF_kwDO",
        "url": "https://api.github.com/repos/octo/widgets/git/refs/x",
        "object": {"sha": sha, "type": kind, "url": "https://api.github.com/x"}
    })
}

fn release_json(tag: &str, draft: bool, prerelease: bool) -> serde_json::Value {
    json!({
        "id": 1,
        "tag_name": tag,
        "target_commitish": "main",
        "name": tag,
        "draft": draft,
        "prerelease": prerelease
    })
}

// =============================================================================
// Release listing
// =============================================================================

mod releases {
    use super::*;

    #[tokio::test]
    async fn follows_link_header() {
        let server = MockServer::start().await;
        let next = format!("{}/repos/octo/widgets/releases?per_page=100&page=2", server.uri());

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/releases"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([release_json("v1.0.0", false, false)])),
            )
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/releases"))
            .and(query_param("per_page", "100"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", format!(r#"<{}>; rel="next", <{}>; rel="last""#, next, next))
                    .set_body_json(json!([
                        release_json("v2.0.0", false, false),
                        release_json("v2.1.0-rc.1", false, true),
                        release_json("v3.0.0", true, false)
                    ])),
            )
            .mount(&server)
            .await;

        let forge = forge(&server);

        let first = forge.list_releases(None).await.unwrap();
        assert_eq!(first.releases.len(), 3);
        assert_eq!(first.releases[1].state, ReleaseState::Prerelease);
        assert_eq!(first.releases[2].state, ReleaseState::Draft);
        assert_eq!(first.next.as_deref(), Some(next.as_str()));

        let second = forge.list_releases(first.next.as_deref()).await.unwrap();
        assert_eq!(second.releases[0].tag_name, "v1.0.0");
        assert!(second.next.is_none());
    }

    #[tokio::test]
    async fn sends_auth_and_api_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/releases"))
            .and(header("authorization", "Bearer t0ken"))
            .and(header("accept", "application/vnd.github+json"))
            .and(header("x-github-api-version", "2022-11-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let page = forge(&server).list_releases(None).await.unwrap();
        assert!(page.releases.is_empty());
    }

    #[tokio::test]
    async fn bad_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/releases"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
            )
            .mount(&server)
            .await;

        let err = forge(&server).list_releases(None).await.unwrap_err();
        assert!(matches!(err, ForgeError::AuthFailed(_)));
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn exhausted_quota_is_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/releases"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .set_body_json(json!({"message": "API rate limit exceeded"})),
            )
            .mount(&server)
            .await;

        let err = forge(&server).list_releases(None).await.unwrap_err();
        assert_eq!(err, ForgeError::RateLimited);
    }

    #[tokio::test]
    async fn server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/releases"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({"message": "Bad Gateway"})))
            .mount(&server)
            .await;

        let err = forge(&server).list_releases(None).await.unwrap_err();
        assert!(matches!(err, ForgeError::ApiError { status: 502, .. }));
    }
}

// =============================================================================
// Refs
// =============================================================================

mod refs {
    use super::*;

    #[tokio::test]
    async fn get_existing_ref() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/git/ref/tags/v1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(ref_json("refs/tags/v1", SHA, "commit")),
            )
            .mount(&server)
            .await;

        let found = forge(&server)
            .get_ref(&RefName::new("refs/tags/v1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.sha.as_str(), SHA);
        assert_eq!(found.target, RefTarget::Commit);
    }

    #[tokio::test]
    async fn get_annotated_tag_ref() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/git/ref/tags/v1.0.0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(ref_json("refs/tags/v1.0.0", SHA, "tag")),
            )
            .mount(&server)
            .await;

        let found = forge(&server)
            .get_ref(&RefName::for_tag("v1.0.0").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.target, RefTarget::Tag);
    }

    #[tokio::test]
    async fn missing_ref_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octo/widgets/git/ref/heads/v2"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let found = forge(&server)
            .get_ref(&RefName::new("refs/heads/v2").unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn create_ref_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/octo/widgets/git/refs"))
            .and(body_json(json!({"ref": "refs/tags/v1", "sha": SHA})))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(ref_json("refs/tags/v1", SHA, "commit")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = forge(&server)
            .create_ref(&RefName::new("refs/tags/v1").unwrap(), &Oid::new(SHA).unwrap())
            .await
            .unwrap();
        assert_eq!(created.name.as_str(), "refs/tags/v1");
    }

    #[tokio::test]
    async fn create_existing_ref_conflicts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/octo/widgets/git/refs"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"message": "Reference already exists"})),
            )
            .mount(&server)
            .await;

        let err = forge(&server)
            .create_ref(&RefName::new("refs/tags/v1").unwrap(), &Oid::new(SHA).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::Conflict(_)));
    }

    #[tokio::test]
    async fn other_unprocessable_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/repos/octo/widgets/git/refs"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "Object does not exist"})),
            )
            .mount(&server)
            .await;

        let err = forge(&server)
            .create_ref(&RefName::new("refs/tags/v1").unwrap(), &Oid::new(SHA).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::ApiError { status: 422, .. }));
    }

    #[tokio::test]
    async fn update_ref_body() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/repos/octo/widgets/git/refs/tags/latest"))
            .and(body_json(json!({"sha": SHA, "force": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ref_json("refs/tags/latest", SHA, "commit")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let updated = forge(&server)
            .update_ref(
                &RefName::new("refs/tags/latest").unwrap(),
                &Oid::new(SHA).unwrap(),
                true,
            )
            .await
            .unwrap();
        assert_eq!(updated.sha.as_str(), SHA);
    }

    #[tokio::test]
    async fn update_conflict() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/repos/octo/widgets/git/refs/tags/v1"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "Conflict"})))
            .mount(&server)
            .await;

        let err = forge(&server)
            .update_ref(&RefName::new("refs/tags/v1").unwrap(), &Oid::new(SHA).unwrap(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::Conflict(_)));
    }
}

// =============================================================================
// Full run against the REST client
// =============================================================================

#[tokio::test]
async fn run_creates_major_and_moves_latest() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            release_json("v1.2.0", false, false),
            release_json("v1.1.0", false, false),
            release_json("v0.9.0", false, false)
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/git/ref/tags/v1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/git/ref/tags/latest"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ref_json("refs/tags/latest", OLD_SHA, "commit")),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/widgets/git/refs"))
        .and(body_json(json!({"ref": "refs/tags/v1", "sha": SHA})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(ref_json("refs/tags/v1", SHA, "commit")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/repos/octo/widgets/git/refs/tags/latest"))
        .and(body_json(json!({"sha": SHA, "force": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(ref_json("refs/tags/latest", SHA, "commit")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::new(Token::new("t0ken"), Repository::parse("octo/widgets").unwrap());
    config.publish_latest_tag = true;
    let event = ReleaseEvent {
        kind: EventKind::Published,
        tag: Some("v1.2.0".to_string()),
        draft: false,
        prerelease: false,
        sha: Some(Oid::new(SHA).unwrap()),
    };

    let outcome = engine::run(&forge(&server), &config, &event, &Context::default())
        .await
        .unwrap();

    match outcome {
        RunOutcome::Tagged(result) => {
            assert_eq!(result.ref_name, "v1");
            assert!(result.latest_updated);
            assert_eq!(result.writes(), 2);
        }
        other => panic!("expected tagged, got {:?}", other),
    }
}
