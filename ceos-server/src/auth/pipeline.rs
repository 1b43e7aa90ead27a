//! Request-time authentication
//!
//! Stages run strictly in order and the first failure ends the request:
//! token extraction, claims verification, GitHub re-validation, identity construction.

use crate::auth::{AuthRejection, IdentityContext};
use crate::github::GitHubClient;
use crate::session::SessionCodec;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::header::AUTHORIZATION;
use http::HeaderMap;
use log::{debug, warn};

/// Authenticate a request from its headers
///
/// The delegated GitHub token is re-validated on every call, a valid session token alone is
/// never enough because the GitHub token can be revoked independently of the session.
pub async fn authenticate(
    sessions: &SessionCodec,
    github: &GitHubClient,
    headers: &HeaderMap,
) -> Result<IdentityContext, AuthRejection> {
    let token = extract_bearer(headers)?;

    let claims = sessions.parse_and_verify(token).map_err(|e| {
        warn!("Session token rejected: {}", e);
        AuthRejection::from(e)
    })?;

    // Scoped to this request only, the shared client keeps its own credential
    let user = github
        .with_credential(&claims.upstream_token)
        .get_authenticated_user()
        .await
        .map_err(|e| {
            warn!(
                "GitHub token validation failed for user '{}': {}",
                claims.sub, e
            );
            AuthRejection::UpstreamCredentialInvalid(e.to_string())
        })?;

    debug!(
        "Authenticated user '{}' ({}) with role '{}'",
        user.login, claims.sub, claims.role
    );
    Ok(IdentityContext::from_verified(claims, user))
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub(crate) fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        warn!("Missing Authorization header");
        return Err(AuthRejection::MissingCredential);
    };

    let value = value.to_str().map_err(|e| {
        warn!("Failed to parse Authorization header to string: {}", e);
        AuthRejection::Malformed
    })?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => {
            warn!("Invalid Authorization header format, expected a bearer token");
            Err(AuthRejection::MissingCredential)
        }
    }
}

/// Runs [`authenticate`] and attaches the resulting [`IdentityContext`] to the request
pub(crate) async fn authentication_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state.sessions, &state.github, request.headers()).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(rejection) => rejection
            .into_api_error(state.settings.development)
            .into_response(),
    }
}
