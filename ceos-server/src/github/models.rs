//! GitHub REST API payloads

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A GitHub user as returned by `/user` and member listings
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct GitHubUser {
    pub id: u64,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct GitHubOrganization {
    pub id: u64,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct GitHubRepository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Role of a user within an organization
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    Admin,
    Member,
    BillingManager,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MembershipRole::Admin => "admin",
            MembershipRole::Member => "member",
            MembershipRole::BillingManager => "billing_manager",
            MembershipRole::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A user's membership in an organization (`/orgs/{org}/memberships/{login}`)
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct OrganizationMembership {
    /// "active" or "pending"
    #[serde(default)]
    pub state: String,
    pub role: MembershipRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<GitHubUser>,
}

/// Aggregated daily usage of the seat-based add-on
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SeatUsage {
    pub day: String,
    pub total_suggestions_count: u64,
    pub total_acceptances_count: u64,
    pub total_lines_suggested: u64,
    pub total_lines_accepted: u64,
    pub total_active_users: u64,
    pub breakdown: Vec<SeatUsageBreakdown>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SeatUsageBreakdown {
    pub language: String,
    pub editor: String,
    pub suggestions_count: u64,
    pub acceptances_count: u64,
    pub lines_suggested: u64,
    pub lines_accepted: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct SeatAssignments {
    pub total_seats: u64,
    #[serde(default)]
    pub seats: Vec<SeatAssignment>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct SeatAssignment {
    pub assignee: GitHubUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_cancellation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_editor: Option<String>,
}

/// Body of the seat add and remove calls
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct SelectedUsers {
    pub selected_usernames: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
pub struct SeatsAdded {
    pub seats_created: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
pub struct SeatsRemoved {
    pub seats_cancelled: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamHealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of probing the GitHub API
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct UpstreamHealth {
    pub status: UpstreamHealthStatus,
    pub api_url: String,
    /// Whether the probing client carried an access token
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
