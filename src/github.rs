//! Minimal GitHub REST v3 client for the owner commands.
//!
//! Covers exactly what the bot needs: identifying the token's account,
//! creating and deleting repositories, and create-or-update of a single
//! file through the contents API.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "warden-bot";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors produced by the GitHub client
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Connectivity or timeout failure before a response arrived
    #[error("Network error: {0}")]
    Network(String),
    /// Non-success response from the API
    #[error("GitHub API error {status}: {message}")]
    Api {
        /// HTTP status code of the response
        status: u16,
        /// Message extracted from the error body
        message: String,
    },
    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Json(String),
}

/// A repository as returned by the create endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Repository name
    pub name: String,
    /// Browser URL
    pub html_url: String,
    /// Owning account
    pub owner: RepoOwner,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Owning account of a repository
#[derive(Debug, Clone, Deserialize)]
pub struct RepoOwner {
    /// Account login
    pub login: String,
}

#[derive(Debug, Deserialize)]
struct AuthenticatedUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct FileContent {
    sha: String,
}

/// Authenticated GitHub REST client
pub struct GitHubClient {
    http: Client,
    token: String,
}

impl GitHubClient {
    /// Create a client for the given personal access token
    #[must_use]
    pub fn new(token: String) -> Self {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, token }
    }

    fn prepare(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(StatusCode, String), GitHubError> {
        let response = self
            .prepare(builder)
            .send()
            .await
            .map_err(|e| GitHubError::Network(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok((status, body))
    }

    async fn send_expecting<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, GitHubError> {
        let (status, body) = self.send(builder).await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| GitHubError::Json(e.to_string()))
    }

    /// Login of the account the token belongs to
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the token is rejected.
    pub async fn authenticated_user(&self) -> Result<String, GitHubError> {
        let user: AuthenticatedUser = self
            .send_expecting(self.http.get(format!("{API_BASE}/user")))
            .await?;
        Ok(user.login)
    }

    /// Create a public, auto-initialised repository for the token's account
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails; HTTP 422 means a
    /// repository with that name already exists.
    pub async fn create_repo(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Repository, GitHubError> {
        let body = json!({
            "name": name,
            "description": description,
            "private": false,
            "auto_init": true,
        });
        self.send_expecting(self.http.post(format!("{API_BASE}/user/repos")).json(&body))
            .await
    }

    /// Permanently delete a repository
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails; HTTP 404 means the
    /// repository does not exist, HTTP 403 that the token lacks the
    /// `delete_repo` scope.
    pub async fn delete_repo(&self, owner: &str, repo: &str) -> Result<(), GitHubError> {
        let (status, body) = self
            .send(self.http.delete(format!("{API_BASE}/repos/{owner}/{repo}")))
            .await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(())
    }

    async fn file_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<Option<String>, GitHubError> {
        let url = format!("{API_BASE}/repos/{owner}/{repo}/contents/{path}");
        let (status, body) = self.send(self.http.get(url)).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        let content: FileContent =
            serde_json::from_str(&body).map_err(|e| GitHubError::Json(e.to_string()))?;
        Ok(Some(content.sha))
    }

    /// Create or update a single file through the contents API
    ///
    /// Looks up the current blob SHA first so an existing file is updated
    /// in place instead of rejected.
    ///
    /// # Errors
    ///
    /// Returns an error when either the lookup or the upload fails.
    pub async fn upload_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), GitHubError> {
        let sha = self.file_sha(owner, repo, path).await?;

        let mut body = json!({
            "message": message,
            "content": BASE64.encode(content),
        });
        if let (Some(sha), Some(map)) = (sha, body.as_object_mut()) {
            map.insert("sha".to_string(), Value::String(sha));
        }

        let url = format!("{API_BASE}/repos/{owner}/{repo}/contents/{path}");
        let (status, text) = self.send(self.http.put(url).json(&body)).await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }
        Ok(())
    }
}

/// Build an [`GitHubError::Api`] from a response body
///
/// GitHub error bodies carry a `message` field; anything else is passed
/// through truncated so proxy error pages cannot flood a chat message.
fn api_error(status: u16, body: &str) -> GitHubError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.len() > 200 {
                let cut: String = trimmed.chars().take(200).collect();
                format!("{cut}... (truncated)")
            } else {
                trimmed.to_string()
            }
        });
    GitHubError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_extracts_message_field() {
        let err = api_error(422, r#"{"message": "name already exists on this account"}"#);
        match err {
            GitHubError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "name already exists on this account");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_truncates_raw_bodies() {
        let long = "x".repeat(500);
        let err = api_error(502, &long);
        match err {
            GitHubError::Api { message, .. } => {
                assert!(message.len() < 300);
                assert!(message.ends_with("(truncated)"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = api_error(404, r#"{"message": "Not Found"}"#);
        assert_eq!(err.to_string(), "GitHub API error 404: Not Found");
    }
}
