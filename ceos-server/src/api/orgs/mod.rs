//! Organization routes
//!
//! Read routes require the organization to be in the caller's session. Seat management
//! additionally requires GitHub to report the caller as an organization admin.

pub mod handlers;
pub mod models;

use crate::auth::checks::{organization_access_middleware, organization_admin_middleware};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, put},
    Router,
};

/// Routes open to any member of the organization
pub(super) fn member_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/orgs/{org}", get(handlers::get_organization))
        .route("/api/v1/orgs/{org}/members", get(handlers::list_members))
        .route("/api/v1/orgs/{org}/repos", get(handlers::list_repositories))
        // route_layer so the path parameters are available to the check
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            organization_access_middleware,
        ))
}

/// Routes restricted to organization admins
pub(super) fn admin_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/orgs/{org}/seats", get(handlers::list_seats))
        .route("/api/v1/orgs/{org}/seat-usage", get(handlers::seat_usage))
        .route(
            "/api/v1/orgs/{org}/seats/{username}",
            put(handlers::add_seat).delete(handlers::remove_seat),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            organization_admin_middleware,
        ))
}
