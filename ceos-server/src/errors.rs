use crate::github::GitHubError;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use log::warn;
use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct ApiError {
    pub detail: String,
    pub status_code: StatusCode,
    /// Extra fields merged into the response body
    pub context: Map<String, Value>,
}

impl ApiError {
    /// Create a new ApiError with a detail message and status code
    pub fn new<S: ToString>(detail: S, status_code: StatusCode) -> Self {
        Self {
            detail: detail.to_string(),
            status_code,
            context: Map::new(),
        }
    }

    /// Create new Internal Server Error (500) with a detail message
    pub fn internal<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create new Bad Request Error (400) with a detail message
    pub fn bad_request<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_REQUEST)
    }

    /// Create new Bad Gateway (502) with a detail message
    pub fn bad_gateway<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_GATEWAY)
    }

    /// Create new Service Unavailable (503) with a detail message
    pub fn service_unavailable<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::SERVICE_UNAVAILABLE)
    }

    /// Add a field to the response body
    pub fn with_context<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    /// Attach internal error detail, only honoured in development mode
    pub fn with_internal_detail<S: ToString>(self, detail: S, development: bool) -> Self {
        if development {
            self.with_context("debug", detail.to_string())
        } else {
            self
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut body = self.context;
        body.insert("detail".to_string(), Value::String(self.detail));
        (self.status_code, Json(Value::Object(body))).into_response()
    }
}

impl From<GitHubError> for ApiError {
    fn from(err: GitHubError) -> Self {
        warn!("GitHub request failed: {}", err);
        match err {
            GitHubError::Status { status, .. } if status == StatusCode::NOT_FOUND => {
                ApiError::new("Resource not found on GitHub", StatusCode::NOT_FOUND)
            }
            GitHubError::Status { status, .. }
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                ApiError::new("GitHub denied access to this resource", StatusCode::FORBIDDEN)
            }
            GitHubError::Status { status, message } if status.is_client_error() => {
                ApiError::new(format!("GitHub rejected the request: {message}"), status)
            }
            GitHubError::Status { status, .. } => {
                ApiError::bad_gateway(format!("GitHub request failed with status: {status}"))
            }
            GitHubError::Unreachable(_) => ApiError::service_unavailable("GitHub is unreachable"),
            GitHubError::Decode(_) => ApiError::bad_gateway("Unexpected response from GitHub"),
            GitHubError::Config(_) => ApiError::internal("Internal Server Error"),
        }
    }
}
