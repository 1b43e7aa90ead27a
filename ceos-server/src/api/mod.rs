pub(crate) mod auth;
pub(crate) mod health;
pub(crate) mod orgs;

use crate::auth::pipeline::authentication_middleware;
use crate::state::AppState;
use axum::{middleware, Router};

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::public_router())
        .merge(protected_routes(state))
}

/// Creates a router for routes that require an authenticated session
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::protected_router())
        .merge(orgs::member_router(state))
        .merge(orgs::admin_router(state))
        // route_layer so unmatched paths still answer 404 rather than 401
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ))
}
