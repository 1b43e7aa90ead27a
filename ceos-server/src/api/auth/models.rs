use crate::session::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

/// Login request carrying a GitHub access token
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// GitHub OAuth or personal access token
    pub access_token: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Issued session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Signed session token to send as `Authorization: Bearer <token>`
    pub token: String,
    pub token_type: String,
    /// Expiry as seconds since the Unix epoch
    pub expires_at: i64,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub login: String,
    pub role: Role,
    pub organizations: BTreeSet<String>,
}
