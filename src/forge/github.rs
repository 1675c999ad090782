//! forge::github
//!
//! GitHub forge implementation using the REST API.
//!
//! # Design
//!
//! This module implements the `Forge` trait for GitHub:
//! - `GET /repos/{owner}/{repo}/releases` for the release listing, paged by
//!   following the `Link: <...>; rel="next"` header
//! - `GET /repos/{owner}/{repo}/git/ref/{ref}` to read a ref
//! - `POST /repos/{owner}/{repo}/git/refs` to create a ref
//! - `PATCH /repos/{owner}/{repo}/git/refs/{ref}` to move a ref
//!
//! # Conflicts
//!
//! GitHub reports a lost ref race as `409 Conflict`, and a create of an
//! existing ref as `422 Reference already exists`. Both map to
//! `ForgeError::Conflict`.
//!
//! # Rate Limiting
//!
//! Returns `ForgeError::RateLimited` when limits are hit. No automatic
//! retry is attempted.
//!
//! # Example
//!
//! ```ignore
//! use release_tagger::core::config::Token;
//! use release_tagger::core::types::Repository;
//! use release_tagger::forge::github::GitHubForge;
//!
//! let repo = Repository::parse("octocat/hello-world")?;
//! let forge = GitHubForge::new(Token::new("ghs_xxx"), repo);
//! let page = forge.list_releases(None).await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{Forge, ForgeError, GitRef, RefTarget, Release, ReleasePage, ReleaseState};
use crate::core::config::{Token, DEFAULT_API_BASE};
use crate::core::types::{Oid, RefName, Repository};

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "release-tagger";

/// Releases requested per page (GitHub's maximum).
const RELEASES_PER_PAGE: u32 = 100;

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// API token
    token: Token,
    /// Repository whose releases and refs are used
    repository: Repository,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("repository", &self.repository)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create a GitHub forge against `api.github.com`.
    pub fn new(token: Token, repository: Repository) -> Self {
        Self::with_api_base(token, repository, DEFAULT_API_BASE)
    }

    /// Create a GitHub forge with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (`https://github.example.com/api/v3`)
    /// and for tests against a local mock server.
    pub fn with_api_base(
        token: Token,
        repository: Repository,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token,
            repository,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token.expose()))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base,
            self.repository.owner(),
            self.repository.name(),
            path
        )
    }

    /// Send a request with the common headers.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ForgeError> {
        request
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Err(self.error_from_response(response, status).await)
        }
    }

    /// Map an error response from the API.
    async fn error_from_response(&self, response: Response, status: StatusCode) -> ForgeError {
        // Rate limiting is reported as 403 with an exhausted quota header
        let quota_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0");

        // Try to get error message from body
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if quota_exhausted => ForgeError::RateLimited,
            StatusCode::FORBIDDEN => ForgeError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::CONFLICT => ForgeError::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY if message.contains("already exists") => {
                ForgeError::Conflict(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list_releases(&self, cursor: Option<&str>) -> Result<ReleasePage, ForgeError> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => self.repo_url(&format!("releases?per_page={}", RELEASES_PER_PAGE)),
        };

        let response = self.send(self.client.get(&url)).await?;
        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_link);

        let releases: Vec<GitHubRelease> = self.handle_response(response).await?;

        Ok(ReleasePage {
            releases: releases.into_iter().map(Into::into).collect(),
            next,
        })
    }

    async fn get_ref(&self, name: &RefName) -> Result<Option<GitRef>, ForgeError> {
        let url = self.repo_url(&format!("git/ref/{}", name.api_path()));
        let response = self.send(self.client.get(&url)).await?;

        match self.handle_response::<GitHubRef>(response).await {
            Ok(found) => found.into_git_ref().map(Some),
            Err(ForgeError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_ref(&self, name: &RefName, sha: &Oid) -> Result<GitRef, ForgeError> {
        let url = self.repo_url("git/refs");
        let body = CreateRefBody {
            ref_name: name.as_str(),
            sha: sha.as_str(),
        };

        let response = self.send(self.client.post(&url).json(&body)).await?;
        let created: GitHubRef = self.handle_response(response).await?;
        created.into_git_ref()
    }

    async fn update_ref(
        &self,
        name: &RefName,
        sha: &Oid,
        force: bool,
    ) -> Result<GitRef, ForgeError> {
        let url = self.repo_url(&format!("git/refs/{}", name.api_path()));
        let body = UpdateRefBody {
            sha: sha.as_str(),
            force,
        };

        let response = self.send(self.client.patch(&url).json(&body)).await?;
        let updated: GitHubRef = self.handle_response(response).await?;
        updated.into_git_ref()
    }
}

/// Extract the `rel="next"` URL from a `Link` header.
///
/// # Example
///
/// ```
/// use release_tagger::forge::github::parse_next_link;
///
/// let header = r#"<https://api.github.com/repositories/1/releases?page=2>; rel="next", <https://api.github.com/repositories/1/releases?page=5>; rel="last""#;
/// assert_eq!(
///     parse_next_link(header).as_deref(),
///     Some("https://api.github.com/repositories/1/releases?page=2")
/// );
/// assert!(parse_next_link(r#"<https://x/?page=1>; rel="prev""#).is_none());
/// ```
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let url = pieces.next()?.trim();
        let is_next = pieces.any(|p| {
            let p = p.trim();
            p == r#"rel="next""# || p == "rel=next"
        });
        if !is_next {
            return None;
        }
        url.strip_prefix('<')
            .and_then(|u| u.strip_suffix('>'))
            .map(str::to_string)
    })
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a ref.
#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    ref_name: &'a str,
    sha: &'a str,
}

/// Request body for updating a ref.
#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
    force: bool,
}

/// Release as returned by the GitHub API.
#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    prerelease: bool,
    target_commitish: Option<String>,
}

impl From<GitHubRelease> for Release {
    fn from(r: GitHubRelease) -> Self {
        let state = if r.draft {
            ReleaseState::Draft
        } else if r.prerelease {
            ReleaseState::Prerelease
        } else {
            ReleaseState::Published
        };

        // target_commitish is usually a branch name; only a full SHA is a commit
        let target = r.target_commitish.and_then(|c| Oid::new(c).ok());

        Release {
            tag_name: r.tag_name,
            state,
            target,
        }
    }
}

/// Git ref as returned by the GitHub API.
#[derive(Debug, Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GitHubObject,
}

#[derive(Debug, Deserialize)]
struct GitHubObject {
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

impl GitHubRef {
    fn into_git_ref(self) -> Result<GitRef, ForgeError> {
        let invalid = |message: String| ForgeError::ApiError {
            status: 200,
            message,
        };

        let name = RefName::new(self.ref_name).map_err(|e| invalid(e.to_string()))?;
        let sha = Oid::new(self.object.sha).map_err(|e| invalid(e.to_string()))?;
        let target = match self.object.kind.as_str() {
            "commit" => RefTarget::Commit,
            "tag" => RefTarget::Tag,
            _ => RefTarget::Other,
        };

        Ok(GitRef { name, sha, target })
    }
}

/// GitHub API error response.
#[derive(Debug, Deserialize)]
struct GitHubErrorResponse {
    message: String,
}
