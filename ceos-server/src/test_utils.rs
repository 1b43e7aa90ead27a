use crate::config::Settings;
use crate::create_app;
use crate::session::SessionSubject;
use crate::state::AppState;
use axum::body::Body;
use axum::Router;
use chrono::{Duration, Utc};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

/// Test fixture running the full router against a mocked GitHub API.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///     fixture
///         .mock_github_user(TestFixture::UPSTREAM_TOKEN, json!({ "id": 1, "login": "alice" }))
///         .await;
///
///     let token = fixture.session_token("alice", &["acme"]);
///     let response = fixture.get("/api/v1/auth/profile", Some(&token)).await;
///
///     response.assert_ok();
///     assert_eq!(response.json["login"], "alice");
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration settings
    pub settings: Settings,
    /// State shared with the router
    pub state: AppState,
    /// Mock server standing in for the GitHub API
    pub github_mock: MockServer,
}

impl TestFixture {
    /// GitHub token embedded in sessions from [`TestFixture::session_token`]
    pub const UPSTREAM_TOKEN: &'static str = "gho_test_token";

    pub async fn new() -> Self {
        Self::with_settings(|_| {}).await
    }

    /// Like [`TestFixture::new`], with the test settings adjusted by `configure`
    pub async fn with_settings(configure: impl FnOnce(&mut Settings)) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let github_mock = MockServer::start().await;
        let mut settings = Settings::for_test_with_mock(&github_mock);
        configure(&mut settings);
        let state = AppState::new(settings.clone()).expect("Failed to create test state");
        let app = create_app(state.clone()).await;

        Self {
            app,
            settings,
            state,
            github_mock,
        }
    }

    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    fn subject(login: &str, organizations: &[&str]) -> SessionSubject {
        SessionSubject {
            id: "1001".to_string(),
            login: login.to_string(),
            email: Some(format!("{login}@example.com")),
            role: None,
            organizations: organizations.iter().map(|org| org.to_string()).collect(),
        }
    }

    /// Issue a valid session for `login` carrying [`TestFixture::UPSTREAM_TOKEN`]
    pub fn session_token(&self, login: &str, organizations: &[&str]) -> String {
        self.state
            .sessions
            .issue(
                &Self::subject(login, organizations),
                Self::UPSTREAM_TOKEN,
                self.settings.session.lifetime(),
            )
            .expect("Failed to issue session token")
    }

    /// Issue a session that expired an hour ago
    pub fn expired_session_token(&self, login: &str) -> String {
        self.state
            .sessions
            .issue_at(
                &Self::subject(login, &[]),
                Self::UPSTREAM_TOKEN,
                Duration::hours(1),
                Utc::now() - Duration::hours(2),
            )
            .expect("Failed to issue session token")
    }

    /// Answer `GET /user` for requests authenticated with `access_token`
    pub async fn mock_github_user(&self, access_token: &str, user: impl Serialize) {
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/user"))
            .and(matchers::header(
                "authorization",
                format!("token {access_token}").as_str(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(user))
            .mount(&self.github_mock)
            .await;
    }

    /// Creates a request builder, with a bearer token when one is given
    pub fn request_builder(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        token: Option<&str>,
    ) -> http::request::Builder {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder
    }

    pub async fn get(&self, uri: impl AsRef<str>, token: Option<&str>) -> TestResponse {
        self.send_empty(Method::GET, uri, token).await
    }

    pub async fn put(&self, uri: impl AsRef<str>, token: Option<&str>) -> TestResponse {
        self.send_empty(Method::PUT, uri, token).await
    }

    pub async fn delete(&self, uri: impl AsRef<str>, token: Option<&str>) -> TestResponse {
        self.send_empty(Method::DELETE, uri, token).await
    }

    /// Sends a POST request with a JSON body
    pub async fn post<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
        token: Option<&str>,
    ) -> TestResponse {
        let json_body = serde_json::to_vec(body).expect("Failed to serialize body to JSON");
        let request = self
            .request_builder(Method::POST, uri, token)
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.send(request).await
    }

    async fn send_empty(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        token: Option<&str>,
    ) -> TestResponse {
        let request = self
            .request_builder(method, uri, token)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse {
            status,
            headers,
            json,
        }
    }
}

/// Response from a test request
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts the status code, printing the body on mismatch
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Converts the response body to the specified type.
    ///
    /// # Panics
    ///
    /// Panics if deserialization fails.
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let fixture = TestFixture::new().await;
        let response = fixture.get("/api/v1/does-not-exist", None).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_versioned_routes_live_under_api() {
        let fixture = TestFixture::new().await;
        fixture.get("/api/v1/health", None).await.assert_ok();
        fixture
            .get("/v1/health", None)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_scalar_is_served() {
        let fixture = TestFixture::new().await;
        let request = fixture
            .request_builder(Method::GET, "/scalar", None)
            .body(Body::empty())
            .unwrap();
        let response = fixture.send(request).await;
        response.assert_ok();
    }
}
