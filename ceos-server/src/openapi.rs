use crate::api::{auth, health, orgs};
use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const AUTH_TAG: &str = "Auth API";
pub(crate) const ORGANIZATIONS_TAG: &str = "Organizations API";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health_check,
        health::handlers::detailed_health_check,
        auth::handlers::login,
        auth::handlers::profile,
        orgs::handlers::get_organization,
        orgs::handlers::list_members,
        orgs::handlers::list_repositories,
        orgs::handlers::list_seats,
        orgs::handlers::seat_usage,
        orgs::handlers::add_seat,
        orgs::handlers::remove_seat,
    ),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = AUTH_TAG, description = "Session issuance and caller identity"),
        (name = ORGANIZATIONS_TAG, description = "GitHub organization access and seat management"),
    ),
    info(
        title = "Ceos API",
        description = "Authentication gateway in front of the GitHub API",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;
