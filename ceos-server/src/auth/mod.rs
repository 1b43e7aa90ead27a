//! Request authentication and organization authorization
//!
//! Every authenticated request runs the [`pipeline`]: the session token is extracted and
//! verified, the delegated GitHub token inside it is re-validated against GitHub, and an
//! [`IdentityContext`] is attached to the request. The [`checks`] then gate organization
//! scoped routes.

pub mod checks;
pub mod pipeline;

use crate::errors::ApiError;
use crate::github::models::{GitHubUser, MembershipRole};
use crate::session::{Role, SessionClaims, SessionError};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// Authenticated caller of the current request
#[derive(Clone, Serialize, ToSchema)]
pub struct IdentityContext {
    /// Internal user id
    id: String,
    login: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    avatar_url: String,
    role: Role,
    organizations: BTreeSet<String>,
    #[serde(skip)]
    access_token: String,
}

impl IdentityContext {
    /// Merge the freshly fetched GitHub profile with the verified session claims
    pub(crate) fn from_verified(claims: SessionClaims, user: GitHubUser) -> Self {
        let claims_email = Some(claims.email).filter(|email| !email.is_empty());
        Self {
            id: claims.sub,
            login: user.login,
            email: user.email.or(claims_email),
            name: user.name,
            avatar_url: user.avatar_url,
            role: claims.role,
            organizations: claims.orgs,
            access_token: claims.upstream_token,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn organizations(&self) -> &BTreeSet<String> {
        &self.organizations
    }

    /// Delegated GitHub token, for calls made on the caller's behalf
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for IdentityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityContext")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("avatar_url", &self.avatar_url)
            .field("role", &self.role)
            .field("organizations", &self.organizations)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Why a request was not allowed through
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    #[error("server configuration error: {0}")]
    Configuration(String),
    #[error("no bearer credential provided")]
    MissingCredential,
    #[error("session token is malformed")]
    Malformed,
    #[error("session token signature is invalid")]
    SignatureInvalid,
    #[error("session token expired")]
    Expired,
    #[error("GitHub no longer honours the delegated token: {0}")]
    UpstreamCredentialInvalid(String),
    #[error("organization '{0}' is not one of the caller's organizations")]
    OrganizationAccessDenied(String),
    #[error("caller is '{role}' in organization '{organization}', admin required")]
    NotOrganizationAdmin {
        organization: String,
        role: MembershipRole,
    },
    #[error("membership in organization '{organization}' could not be determined: {reason}")]
    OrganizationMembershipUnknown {
        organization: String,
        reason: String,
    },
}

impl AuthRejection {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthRejection::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthRejection::MissingCredential
            | AuthRejection::Malformed
            | AuthRejection::SignatureInvalid
            | AuthRejection::Expired
            | AuthRejection::UpstreamCredentialInvalid(_) => StatusCode::UNAUTHORIZED,
            AuthRejection::OrganizationAccessDenied(_)
            | AuthRejection::NotOrganizationAdmin { .. }
            | AuthRejection::OrganizationMembershipUnknown { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Caller facing message; verification internals collapse into one message
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthRejection::Configuration(_) => "Server configuration error",
            AuthRejection::MissingCredential
            | AuthRejection::Malformed
            | AuthRejection::SignatureInvalid => "Invalid or expired token",
            AuthRejection::Expired => "Token expired",
            AuthRejection::UpstreamCredentialInvalid(_) => "Invalid or expired GitHub token",
            AuthRejection::OrganizationAccessDenied(_) => "Organization access required",
            AuthRejection::NotOrganizationAdmin { .. } => "Admin access required",
            AuthRejection::OrganizationMembershipUnknown { .. } => {
                "Organization membership required"
            }
        }
    }

    /// Response error, with internal detail attached in development mode
    pub fn into_api_error(self, development: bool) -> ApiError {
        let detail = self.to_string();
        ApiError::from(self).with_internal_detail(detail, development)
    }
}

impl From<SessionError> for AuthRejection {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Configuration(reason) => AuthRejection::Configuration(reason),
            SessionError::Malformed => AuthRejection::Malformed,
            SessionError::SignatureInvalid => AuthRejection::SignatureInvalid,
            SessionError::Expired => AuthRejection::Expired,
        }
    }
}

impl From<AuthRejection> for ApiError {
    fn from(rejection: AuthRejection) -> Self {
        let error = ApiError::new(rejection.public_message(), rejection.status_code());
        match rejection {
            AuthRejection::OrganizationAccessDenied(organization)
            | AuthRejection::OrganizationMembershipUnknown { organization, .. } => {
                error.with_context("organization", organization)
            }
            AuthRejection::NotOrganizationAdmin { organization, role } => error
                .with_context("organization", organization)
                .with_context("current_role", role.to_string()),
            _ => error,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
