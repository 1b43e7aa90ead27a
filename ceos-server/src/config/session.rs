use chrono::Duration;
use confique::Config;
use std::fmt;

/// Session token configuration
#[derive(Config, Clone)]
pub struct SessionConfig {
    /// HMAC secret used to sign session tokens (required)
    #[config(env = "CEOS_JWT_SECRET")]
    pub jwt_secret: String,

    /// Session token lifetime in seconds (default: 86400 = 24 hours)
    #[config(env = "CEOS_TOKEN_TTL", default = 86400)]
    pub token_ttl: u64,
}

impl SessionConfig {
    /// Session token lifetime as a duration
    pub fn lifetime(&self) -> Duration {
        i64::try_from(self.token_ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}
