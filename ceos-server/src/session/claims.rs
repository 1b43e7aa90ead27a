//! Claims carried by session tokens

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use utoipa::ToSchema;

/// Role assigned to a session subject
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Developer,
    #[default]
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Developer => "developer",
            Role::Viewer => "viewer",
        };
        f.write_str(name)
    }
}

/// Identity a session token is issued for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSubject {
    /// Internal user id
    pub id: String,
    /// GitHub login
    pub login: String,
    pub email: Option<String>,
    /// Assigned role, viewer when unset
    pub role: Option<Role>,
    pub organizations: BTreeSet<String>,
}

/// Claims embedded in a signed session token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Internal user id
    pub sub: String,
    /// GitHub login at issue time
    pub login: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    /// Delegated GitHub access token
    pub upstream_token: String,
    /// Organizations the subject belongs to
    #[serde(default)]
    pub orgs: BTreeSet<String>,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

impl fmt::Debug for SessionClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClaims")
            .field("sub", &self.sub)
            .field("login", &self.login)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("upstream_token", &"<redacted>")
            .field("orgs", &self.orgs)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("admin"));
        assert_eq!(
            serde_json::from_value::<Role>(json!("developer")).unwrap(),
            Role::Developer
        );
        assert!(serde_json::from_value::<Role>(json!("owner")).is_err());
        assert_eq!(Role::default(), Role::Viewer);
        assert_eq!(Role::Manager.to_string(), "manager");
    }

    #[test]
    fn test_claims_default_role_and_orgs() {
        let claims: SessionClaims = serde_json::from_value(json!({
            "sub": "42",
            "login": "alice",
            "upstream_token": "gho_abc",
            "iat": 1,
            "exp": 2
        }))
        .unwrap();

        assert_eq!(claims.role, Role::Viewer);
        assert!(claims.orgs.is_empty());
        assert_eq!(claims.email, "");
    }

    #[test]
    fn test_claims_debug_redacts_token() {
        let claims = SessionClaims {
            sub: "42".to_string(),
            login: "alice".to_string(),
            email: String::new(),
            role: Role::Viewer,
            upstream_token: "gho_very_secret".to_string(),
            orgs: BTreeSet::new(),
            iat: 1,
            exp: 2,
        };
        assert!(!format!("{claims:?}").contains("gho_very_secret"));
    }
}
