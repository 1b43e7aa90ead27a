use crate::api::auth::models::{LoginRequest, LoginResponse};
use crate::auth::{AuthRejection, IdentityContext};
use crate::errors::ApiError;
use crate::github::GitHubError;
use crate::headers::NoStore;
use crate::openapi::AUTH_TAG;
use crate::session::SessionSubject;
use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use http::StatusCode;
use log::{info, warn};
use std::collections::BTreeSet;

/// Exchange a GitHub access token for a session token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 400, description = "No access token in the request"),
        (status = 401, description = "GitHub rejected the access token"),
        (status = 503, description = "GitHub is unreachable")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Response {
    let access_token = request.access_token.trim();
    if access_token.is_empty() {
        return ApiError::bad_request("access_token is required").into_response();
    }

    let github = state.github.with_credential(access_token);
    let user = match github.get_authenticated_user().await {
        Ok(user) => user,
        Err(err) => return login_failure(err, state.settings.development),
    };

    // Sessions are still issued without organization data, org routes will deny
    let organizations: BTreeSet<String> = match github.get_authenticated_user_organizations().await
    {
        Ok(orgs) => orgs.into_iter().map(|org| org.login).collect(),
        Err(err) => {
            warn!(
                "Failed to list organizations for '{}', issuing session without them: {}",
                user.login, err
            );
            BTreeSet::new()
        }
    };

    let subject = SessionSubject {
        id: user.id.to_string(),
        login: user.login,
        email: user.email,
        role: None,
        organizations,
    };

    let lifetime = state.settings.session.lifetime();
    let now = Utc::now();
    let token = match state.sessions.issue_at(&subject, access_token, lifetime, now) {
        Ok(token) => token,
        Err(err) => {
            return AuthRejection::from(err)
                .into_api_error(state.settings.development)
                .into_response()
        }
    };

    info!(
        "Issued session for '{}' with {} organization(s)",
        subject.login,
        subject.organizations.len()
    );
    NoStore(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at: now.timestamp().saturating_add(lifetime.num_seconds()),
        expires_in: lifetime.num_seconds(),
        login: subject.login,
        role: subject.role.unwrap_or_default(),
        organizations: subject.organizations,
    }))
    .into_response()
}

fn login_failure(err: GitHubError, development: bool) -> Response {
    let rejected = matches!(err, GitHubError::Config(_))
        || matches!(
            err.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        );
    if rejected {
        AuthRejection::UpstreamCredentialInvalid(err.to_string())
            .into_api_error(development)
            .into_response()
    } else {
        ApiError::from(err).into_response()
    }
}

/// The authenticated caller's identity
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    tag = AUTH_TAG,
    responses(
        (status = 200, description = "Authenticated identity", body = IdentityContext),
        (status = 401, description = "Missing, invalid or expired credentials")
    )
)]
pub(crate) async fn profile(Extension(identity): Extension<IdentityContext>) -> impl IntoResponse {
    NoStore(Json(identity))
}
