//! Session issuance and the caller's own profile
//!
//! `POST /api/v1/auth/login` exchanges a GitHub access token for a session token that embeds it.
//! Every other authenticated route re-validates that embedded token with GitHub.

pub mod handlers;
pub mod models;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Routes that issue credentials and need no session
pub(super) fn public_router() -> Router<AppState> {
    Router::new().route("/api/v1/auth/login", post(handlers::login))
}

/// Routes that require an authenticated session
pub(super) fn protected_router() -> Router<AppState> {
    Router::new().route("/api/v1/auth/profile", get(handlers::profile))
}
