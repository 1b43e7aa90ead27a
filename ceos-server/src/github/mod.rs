//! GitHub REST API client
//!
//! A single [`GitHubClient`] is built at startup from [`GitHubConfig`]. Requests made on a
//! caller's behalf use [`GitHubClient::with_credential`], which shares the connection pool
//! but carries only that caller's access token, so the shared client is never mutated.

pub mod models;

use crate::config::GitHubConfig;
use crate::github::models::{
    GitHubOrganization, GitHubRepository, GitHubUser, OrganizationMembership, SeatAssignments,
    SeatUsage, SeatsAdded, SeatsRemoved, SelectedUsers, UpstreamHealth, UpstreamHealthStatus,
};
use http::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use log::{debug, error, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const GITHUB_USER_AGENT: &str = concat!("ceos/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Errors that can occur when calling the GitHub API
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub responded with {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("GitHub is unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("Failed to decode GitHub response: {0}")]
    Decode(String),
    #[error("Invalid GitHub client configuration: {0}")]
    Config(String),
}

impl GitHubError {
    /// The upstream status code, if GitHub answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GitHubError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client bound to one GitHub REST API
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    access_token: Option<String>,
}

impl GitHubClient {
    /// Create a client with the fixed GitHub headers and the configured timeout
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let api_url = Url::parse(&config.api_url).map_err(|e| {
            GitHubError::Config(format!("invalid API URL '{}': {e}", config.api_url))
        })?;
        if api_url.cannot_be_a_base() {
            return Err(GitHubError::Config(format!(
                "API URL '{}' cannot be used as a base URL",
                config.api_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(GITHUB_USER_AGENT));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .default_headers(headers)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| GitHubError::Config(format!("failed to build HTTP client: {e}")))?;

        let access_token = config
            .access_token
            .clone()
            .filter(|token| !token.trim().is_empty());
        match access_token {
            Some(_) => debug!("GitHub client configured with an access token"),
            None => warn!("No GitHub access token configured for the server's own calls"),
        }

        Ok(Self {
            client,
            api_url,
            access_token,
        })
    }

    /// A client for the same API that authenticates with `access_token`
    pub fn with_credential(&self, access_token: &str) -> Self {
        Self {
            client: self.client.clone(),
            api_url: self.api_url.clone(),
            access_token: Some(access_token.to_string()),
        }
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Get the user the configured access token belongs to
    pub async fn get_authenticated_user(&self) -> Result<GitHubUser, GitHubError> {
        self.get(self.endpoint(&["user"])).await
    }

    /// Get the organizations of the user the configured access token belongs to
    pub async fn get_authenticated_user_organizations(
        &self,
    ) -> Result<Vec<GitHubOrganization>, GitHubError> {
        self.get(self.endpoint(&["user", "orgs"])).await
    }

    pub async fn get_organization(&self, org: &str) -> Result<GitHubOrganization, GitHubError> {
        self.get(self.endpoint(&["orgs", org])).await
    }

    pub async fn get_organization_members(
        &self,
        org: &str,
    ) -> Result<Vec<GitHubUser>, GitHubError> {
        self.get(self.endpoint(&["orgs", org, "members"])).await
    }

    /// List an organization's repositories, most recently updated first
    pub async fn get_organization_repositories(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubRepository>, GitHubError> {
        let mut url = self.endpoint(&["orgs", org, "repos"]);
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string())
            .append_pair("sort", "updated")
            .append_pair("direction", "desc");
        self.get(url).await
    }

    pub async fn get_organization_membership(
        &self,
        org: &str,
        login: &str,
    ) -> Result<OrganizationMembership, GitHubError> {
        self.get(self.endpoint(&["orgs", org, "memberships", login]))
            .await
    }

    pub async fn get_seat_usage(&self, org: &str) -> Result<Vec<SeatUsage>, GitHubError> {
        self.get(self.endpoint(&["orgs", org, "copilot", "usage"]))
            .await
    }

    pub async fn get_seat_assignments(&self, org: &str) -> Result<SeatAssignments, GitHubError> {
        self.get(self.endpoint(&["orgs", org, "copilot", "billing", "seats"]))
            .await
    }

    pub async fn add_seat(&self, org: &str, username: &str) -> Result<SeatsAdded, GitHubError> {
        let url = self.endpoint(&["orgs", org, "copilot", "billing", "selected_users"]);
        self.send(Method::POST, url, Some(&selected(username))).await
    }

    pub async fn remove_seat(
        &self,
        org: &str,
        username: &str,
    ) -> Result<SeatsRemoved, GitHubError> {
        let url = self.endpoint(&["orgs", org, "copilot", "billing", "selected_users"]);
        self.send(Method::DELETE, url, Some(&selected(username))).await
    }

    /// Probe the rate limit endpoint; failures are reported in the result, never returned
    pub async fn health_check(&self) -> UpstreamHealth {
        let api_url = self.api_url.to_string();
        let authenticated = self.is_authenticated();

        match self
            .get::<serde_json::Value>(self.endpoint(&["rate_limit"]))
            .await
        {
            Ok(rate_limit) => UpstreamHealth {
                status: UpstreamHealthStatus::Healthy,
                api_url,
                authenticated,
                rate_limit: Some(rate_limit),
                error: None,
            },
            Err(e) => UpstreamHealth {
                status: UpstreamHealthStatus::Unhealthy,
                api_url,
                authenticated,
                rate_limit: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Builds an API URL from percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // The base was checked in `new`, so the URL always has path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<R: DeserializeOwned>(&self, url: Url) -> Result<R, GitHubError> {
        self.send::<R, ()>(Method::GET, url, None).await
    }

    async fn send<R: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<R, GitHubError> {
        debug!("GitHub API request: {} {}", method, url);

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(token) = &self.access_token {
            let mut value = HeaderValue::from_str(&format!("token {token}")).map_err(|_| {
                GitHubError::Config("access token contains invalid header characters".to_string())
            })?;
            value.set_sensitive(true);
            request = request.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("GitHub API request {} {} failed: {}", method, url, e);
            GitHubError::Unreachable(e)
        })?;

        let status = response.status();
        debug!("GitHub API response: {} {} -> {}", method, url, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            if status.is_server_error() {
                error!("GitHub API error {} for {} {}: {}", status, method, url, message);
            } else {
                warn!("GitHub API error {} for {} {}: {}", status, method, url, message);
            }
            return Err(GitHubError::Status { status, message });
        }

        let body = response.bytes().await.map_err(GitHubError::Unreachable)?;
        serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to decode GitHub response for {} {}: {}", method, url, e);
            GitHubError::Decode(e.to_string())
        })
    }
}

fn selected(username: &str) -> SelectedUsers {
    SelectedUsers {
        selected_usernames: vec![username.to_string()],
    }
}

/// GitHub reports errors as `{"message": ...}`, fall back to the raw body or reason phrase
fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}
