//! Organization checks evaluated after authentication
//!
//! Both checks read the [`IdentityContext`] attached by the authentication middleware and must
//! be layered after it.

use crate::auth::{AuthRejection, IdentityContext};
use crate::github::models::{MembershipRole, OrganizationMembership};
use crate::github::GitHubClient;
use crate::state::AppState;
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::{debug, error, warn};
use serde::Deserialize;

/// Path parameters shared by every organization scoped route
#[derive(Debug, Deserialize)]
pub(crate) struct OrganizationPath {
    pub org: String,
}

/// Passes when `org` is one of the organizations recorded in the caller's session
pub fn require_organization(
    identity: &IdentityContext,
    org: &str,
) -> Result<(), AuthRejection> {
    if identity.organizations().contains(org) {
        return Ok(());
    }
    warn!(
        "User '{}' denied access to organization '{}'",
        identity.login(),
        org
    );
    Err(AuthRejection::OrganizationAccessDenied(org.to_string()))
}

/// Passes when GitHub reports the caller as an admin of `org`
///
/// The lookup runs with the caller's own delegated token. A failed lookup is a denial, never a
/// server error, but it is logged separately from a successful lookup with the wrong role.
pub async fn require_organization_admin(
    github: &GitHubClient,
    identity: &IdentityContext,
    org: &str,
) -> Result<OrganizationMembership, AuthRejection> {
    let membership = github
        .with_credential(identity.access_token())
        .get_organization_membership(org, identity.login())
        .await
        .map_err(|e| {
            warn!(
                "Membership lookup for '{}' in organization '{}' failed: {}",
                identity.login(),
                org,
                e
            );
            AuthRejection::OrganizationMembershipUnknown {
                organization: org.to_string(),
                reason: e.to_string(),
            }
        })?;

    if membership.role != MembershipRole::Admin {
        warn!(
            "User '{}' is '{}' in organization '{}', admin required",
            identity.login(),
            membership.role,
            org
        );
        return Err(AuthRejection::NotOrganizationAdmin {
            organization: org.to_string(),
            role: membership.role,
        });
    }

    debug!("User '{}' is admin of '{}'", identity.login(), org);
    Ok(membership)
}

/// Identity attached by the authentication middleware, or a configuration error if the layers
/// were assembled in the wrong order
fn attached_identity(request: &Request) -> Result<&IdentityContext, AuthRejection> {
    request.extensions().get::<IdentityContext>().ok_or_else(|| {
        error!("Organization check ran without an authenticated identity");
        AuthRejection::Configuration("organization check layered before authentication".into())
    })
}

pub(crate) async fn organization_access_middleware(
    State(state): State<AppState>,
    Path(path): Path<OrganizationPath>,
    request: Request,
    next: Next,
) -> Response {
    let result =
        attached_identity(&request).and_then(|identity| require_organization(identity, &path.org));
    match result {
        Ok(()) => next.run(request).await,
        Err(rejection) => rejection
            .into_api_error(state.settings.development)
            .into_response(),
    }
}

pub(crate) async fn organization_admin_middleware(
    State(state): State<AppState>,
    Path(path): Path<OrganizationPath>,
    request: Request,
    next: Next,
) -> Response {
    let identity = match attached_identity(&request) {
        Ok(identity) => identity.clone(),
        Err(rejection) => {
            return rejection
                .into_api_error(state.settings.development)
                .into_response()
        }
    };

    match require_organization_admin(&state.github, &identity, &path.org).await {
        Ok(_) => next.run(request).await,
        Err(rejection) => rejection
            .into_api_error(state.settings.development)
            .into_response(),
    }
}
