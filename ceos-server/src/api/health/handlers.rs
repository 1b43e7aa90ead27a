use super::models::{ComponentHealth, DetailedHealthResponse, HealthResponse, HealthStatusType};
use crate::github::models::UpstreamHealthStatus;
use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use log::{debug, info};

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub(crate) async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Service health including GitHub reachability
#[utoipa::path(
    get,
    path = "/api/v1/health/detailed",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service and GitHub are healthy", body = DetailedHealthResponse),
        (status = 503, description = "GitHub is not healthy", body = DetailedHealthResponse)
    )
)]
pub(crate) async fn detailed_health_check(State(state): State<AppState>) -> DetailedHealthResponse {
    let github = state.github.health_check().await;

    let mut health = HealthResponse::ok();
    if github.status == UpstreamHealthStatus::Healthy {
        debug!("Health check passed for all components");
    } else {
        info!(
            "Health check failed: github: {}",
            github.error.as_deref().unwrap_or("unknown error")
        );
        health.status = HealthStatusType::Error;
    }

    DetailedHealthResponse {
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        health,
        components: ComponentHealth { github },
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/health", get(health_check))
        .route("/api/v1/health/detailed", get(detailed_health_check))
}
