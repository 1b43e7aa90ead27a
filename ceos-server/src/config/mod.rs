pub(crate) use crate::config::github::GitHubConfig;
pub(crate) use crate::config::session::SessionConfig;
use confique::Config;
use http::HeaderValue;

pub mod github;
pub mod session;

/// Optional configuration file, environment variables take precedence
const CONFIG_FILE: &str = "ceos.toml";

/// Main configuration structure for the CEOS server
#[derive(Debug, Config, Clone)]
pub struct Settings {
    /// The port the server will listen to (default: 3000)
    #[config(env = "CEOS_PORT", default = 3000)]
    pub port: u16,

    /// Development mode, adds internal error detail to responses (default: false)
    #[config(env = "CEOS_DEVELOPMENT", default = false)]
    pub development: bool,

    /// Comma separated origins allowed to call the API from a browser
    #[config(env = "CEOS_CORS_ORIGIN", default = "http://localhost:3000")]
    pub cors_origin: String,

    /// Session token configuration
    #[config(nested)]
    pub session: SessionConfig,

    /// GitHub API configuration
    #[config(nested)]
    pub github: GitHubConfig,
}

impl Settings {
    /// Loads the configuration from the environment and the optional config file
    pub fn new() -> Result<Self, String> {
        let settings = Self::builder()
            .env()
            .file(CONFIG_FILE)
            .load()
            .map_err(|e| e.to_string())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values that load fine but leave the server unable to authenticate anyone
    pub fn validate(&self) -> Result<(), String> {
        if self.session.jwt_secret.trim().is_empty() {
            return Err("CEOS_JWT_SECRET must not be empty".to_string());
        }
        if self.session.token_ttl == 0 {
            return Err("CEOS_TOKEN_TTL must be greater than zero".to_string());
        }
        self.cors_origins()?;
        Ok(())
    }

    /// Parsed `cors_origin` entries
    pub fn cors_origins(&self) -> Result<Vec<HeaderValue>, String> {
        self.cors_origin
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|e| format!("invalid CEOS_CORS_ORIGIN entry '{origin}': {e}"))
            })
            .collect()
    }

    #[cfg(test)]
    pub fn for_test_with_mock(github_mock: &wiremock::MockServer) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            development: false,
            cors_origin: "http://localhost:3000".to_string(),
            session: SessionConfig {
                jwt_secret: "test_jwt_secret".to_string(),
                token_ttl: 3600,
            },
            github: GitHubConfig::for_test(github_mock.uri()),
        }
    }
}
