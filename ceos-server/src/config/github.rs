use confique::Config;
use std::fmt;

/// Configuration for the GitHub (Enterprise) REST API
#[derive(Config, Clone)]
pub struct GitHubConfig {
    /// GitHub web URL (default: https://github.com)
    #[config(env = "CEOS_GITHUB_BASE_URL", default = "https://github.com")]
    pub base_url: String,

    /// GitHub REST API URL (default: https://api.github.com)
    #[config(env = "CEOS_GITHUB_API_URL", default = "https://api.github.com")]
    pub api_url: String,

    /// GitHub GraphQL API URL (default: https://api.github.com/graphql)
    #[config(
        env = "CEOS_GITHUB_GRAPHQL_URL",
        default = "https://api.github.com/graphql"
    )]
    pub graphql_url: String,

    /// Personal access token used for the server's own calls (e.g. health checks)
    #[config(env = "CEOS_GITHUB_ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// GitHub App id
    #[config(env = "CEOS_GITHUB_APP_ID")]
    pub app_id: Option<String>,

    /// OAuth client id
    #[config(env = "CEOS_GITHUB_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[config(env = "CEOS_GITHUB_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Path to the GitHub App private key
    #[config(env = "CEOS_GITHUB_PRIVATE_KEY_PATH")]
    pub private_key_path: Option<String>,

    /// Timeout for GitHub API requests in seconds (default: 30)
    #[config(env = "CEOS_GITHUB_TIMEOUT", default = 30)]
    pub timeout: u64,
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("base_url", &self.base_url)
            .field("api_url", &self.api_url)
            .field("graphql_url", &self.graphql_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("app_id", &self.app_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("private_key_path", &self.private_key_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
impl GitHubConfig {
    /// Points every URL at a mock server and leaves all credentials unset
    pub fn for_test(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into();
        Self {
            base_url: api_url.clone(),
            graphql_url: format!("{api_url}/graphql"),
            api_url,
            access_token: None,
            app_id: None,
            client_id: None,
            client_secret: None,
            private_key_path: None,
            timeout: 5,
        }
    }
}
