use crate::api::orgs::models::{RepositoryQuery, SeatPath};
use crate::auth::IdentityContext;
use crate::errors::ApiError;
use crate::github::models::{
    GitHubOrganization, GitHubRepository, GitHubUser, SeatAssignments, SeatUsage, SeatsAdded,
    SeatsRemoved,
};
use crate::openapi::ORGANIZATIONS_TAG;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use http::StatusCode;
use log::info;

#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org}",
    tag = ORGANIZATIONS_TAG,
    params(("org" = String, Path, description = "Organization login")),
    responses(
        (status = 200, description = "Organization details", body = GitHubOrganization),
        (status = 401, description = "Missing, invalid or expired credentials"),
        (status = 403, description = "Organization not in the caller's session")
    )
)]
pub(crate) async fn get_organization(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(org): Path<String>,
) -> Result<Json<GitHubOrganization>, ApiError> {
    let organization = state
        .github
        .with_credential(identity.access_token())
        .get_organization(&org)
        .await?;
    Ok(Json(organization))
}

#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org}/members",
    tag = ORGANIZATIONS_TAG,
    params(("org" = String, Path, description = "Organization login")),
    responses(
        (status = 200, description = "Organization members", body = Vec<GitHubUser>),
        (status = 401, description = "Missing, invalid or expired credentials"),
        (status = 403, description = "Organization not in the caller's session")
    )
)]
pub(crate) async fn list_members(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(org): Path<String>,
) -> Result<Json<Vec<GitHubUser>>, ApiError> {
    let members = state
        .github
        .with_credential(identity.access_token())
        .get_organization_members(&org)
        .await?;
    Ok(Json(members))
}

/// Repositories of an organization, most recently updated first
#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org}/repos",
    tag = ORGANIZATIONS_TAG,
    params(("org" = String, Path, description = "Organization login"), RepositoryQuery),
    responses(
        (status = 200, description = "Organization repositories", body = Vec<GitHubRepository>),
        (status = 401, description = "Missing, invalid or expired credentials"),
        (status = 403, description = "Organization not in the caller's session")
    )
)]
pub(crate) async fn list_repositories(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(org): Path<String>,
    Query(query): Query<RepositoryQuery>,
) -> Result<Json<Vec<GitHubRepository>>, ApiError> {
    let repositories = state
        .github
        .with_credential(identity.access_token())
        .get_organization_repositories(&org, query.page(), query.per_page())
        .await?;
    Ok(Json(repositories))
}

#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org}/seats",
    tag = ORGANIZATIONS_TAG,
    params(("org" = String, Path, description = "Organization login")),
    responses(
        (status = 200, description = "Seat assignments", body = SeatAssignments),
        (status = 403, description = "Caller is not an organization admin")
    )
)]
pub(crate) async fn list_seats(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(org): Path<String>,
) -> Result<Json<SeatAssignments>, ApiError> {
    let seats = state
        .github
        .with_credential(identity.access_token())
        .get_seat_assignments(&org)
        .await?;
    Ok(Json(seats))
}

#[utoipa::path(
    get,
    path = "/api/v1/orgs/{org}/seat-usage",
    tag = ORGANIZATIONS_TAG,
    params(("org" = String, Path, description = "Organization login")),
    responses(
        (status = 200, description = "Daily seat usage", body = Vec<SeatUsage>),
        (status = 403, description = "Caller is not an organization admin")
    )
)]
pub(crate) async fn seat_usage(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(org): Path<String>,
) -> Result<Json<Vec<SeatUsage>>, ApiError> {
    let usage = state
        .github
        .with_credential(identity.access_token())
        .get_seat_usage(&org)
        .await?;
    Ok(Json(usage))
}

/// Assign a seat to `username`
#[utoipa::path(
    put,
    path = "/api/v1/orgs/{org}/seats/{username}",
    tag = ORGANIZATIONS_TAG,
    params(
        ("org" = String, Path, description = "Organization login"),
        ("username" = String, Path, description = "User to assign a seat to")
    ),
    responses(
        (status = 201, description = "Seat assigned", body = SeatsAdded),
        (status = 403, description = "Caller is not an organization admin")
    )
)]
pub(crate) async fn add_seat(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(path): Path<SeatPath>,
) -> Result<(StatusCode, Json<SeatsAdded>), ApiError> {
    let added = state
        .github
        .with_credential(identity.access_token())
        .add_seat(&path.org, &path.username)
        .await?;
    info!(
        "'{}' assigned a seat in '{}' to '{}'",
        identity.login(),
        path.org,
        path.username
    );
    Ok((StatusCode::CREATED, Json(added)))
}

/// Remove the seat of `username`
#[utoipa::path(
    delete,
    path = "/api/v1/orgs/{org}/seats/{username}",
    tag = ORGANIZATIONS_TAG,
    params(
        ("org" = String, Path, description = "Organization login"),
        ("username" = String, Path, description = "User whose seat is removed")
    ),
    responses(
        (status = 200, description = "Seat removed", body = SeatsRemoved),
        (status = 403, description = "Caller is not an organization admin")
    )
)]
pub(crate) async fn remove_seat(
    State(state): State<AppState>,
    Extension(identity): Extension<IdentityContext>,
    Path(path): Path<SeatPath>,
) -> Result<Json<SeatsRemoved>, ApiError> {
    let removed = state
        .github
        .with_credential(identity.access_token())
        .remove_seat(&path.org, &path.username)
        .await?;
    info!(
        "'{}' removed the seat of '{}' in '{}'",
        identity.login(),
        path.username,
        path.org
    );
    Ok(Json(removed))
}
