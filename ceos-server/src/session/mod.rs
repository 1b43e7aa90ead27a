//! Session token issuing and verification
//!
//! Session tokens are HS256 JWTs signed with a process-wide secret. They carry the
//! subject's identity claims together with the delegated GitHub access token, which
//! is re-validated against GitHub on every authenticated request.

pub mod claims;

pub use crate::session::claims::{Role, SessionClaims, SessionSubject};
use crate::config::SessionConfig;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use thiserror::Error;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Errors that can occur while issuing or verifying a session token
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session configuration error: {0}")]
    Configuration(String),
    #[error("Session token is malformed")]
    Malformed,
    #[error("Session token signature is invalid")]
    SignatureInvalid,
    #[error("Session token expired")]
    Expired,
}

/// Signs and verifies session tokens
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionCodec {
    /// Create a codec for the given signing secret
    pub fn new(secret: &str) -> Result<Self, SessionError> {
        if secret.trim().is_empty() {
            return Err(SessionError::Configuration(
                "session signing secret is not configured".to_string(),
            ));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, SessionError> {
        Self::new(&config.jwt_secret)
    }

    /// Issue a token valid from now for `lifetime`
    pub fn issue(
        &self,
        subject: &SessionSubject,
        credential: &str,
        lifetime: Duration,
    ) -> Result<String, SessionError> {
        self.issue_at(subject, credential, lifetime, Utc::now())
    }

    /// Issue a token valid from `now` for `lifetime`
    pub fn issue_at(
        &self,
        subject: &SessionSubject,
        credential: &str,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let iat = now.timestamp();
        let claims = SessionClaims {
            sub: subject.id.clone(),
            login: subject.login.clone(),
            email: subject.email.clone().unwrap_or_default(),
            role: subject.role.unwrap_or_default(),
            upstream_token: credential.to_string(),
            orgs: subject.organizations.clone(),
            iat,
            exp: iat.saturating_add(lifetime.num_seconds()),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| SessionError::Configuration(format!("failed to sign session token: {e}")))?;

        debug!(
            "Issued session token for '{}' with role '{}', expires at {}",
            claims.login, claims.role, claims.exp
        );
        Ok(token)
    }

    /// Verify a token against the current wall clock
    pub fn parse_and_verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.parse_and_verify_at(token, Utc::now())
    }

    /// Verify signature and structure, then reject the token if `now` is at or after its expiry
    pub fn parse_and_verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, SessionError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    SessionError::SignatureInvalid
                }
                _ => SessionError::Malformed,
            })?;

        if now.timestamp() >= claims.exp {
            return Err(SessionError::Expired);
        }
        Ok(claims)
    }
}

/// Signature and structure only, expiry is evaluated against the caller's clock
fn validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::BTreeSet;

    const SECRET: &str = "test_secret_key_for_testing_purposes_only";

    fn codec() -> SessionCodec {
        SessionCodec::new(SECRET).unwrap()
    }

    fn subject() -> SessionSubject {
        SessionSubject {
            id: "1001".to_string(),
            login: "alice".to_string(),
            email: Some("a@x.com".to_string()),
            role: Some(Role::Developer),
            organizations: BTreeSet::from(["acme".to_string(), "beta".to_string()]),
        }
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let codec = codec();
        let token = codec
            .issue(&subject(), "gho_delegated", Duration::hours(24))
            .unwrap();

        let claims = codec.parse_and_verify(&token).unwrap();
        assert_eq!(claims.sub, "1001");
        assert_eq!(claims.login, "alice");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::Developer);
        assert_eq!(claims.upstream_token, "gho_delegated");
        assert_eq!(claims.orgs, subject().organizations);
        assert_eq!(claims.exp, claims.iat + 24 * 3600);
    }

    #[test]
    fn test_role_defaults_to_viewer() {
        let codec = codec();
        let subject = SessionSubject {
            role: None,
            email: None,
            ..subject()
        };
        let token = codec
            .issue(&subject, "gho_delegated", Duration::hours(1))
            .unwrap();

        let claims = codec.parse_and_verify(&token).unwrap();
        assert_eq!(claims.role, Role::Viewer);
        assert_eq!(claims.email, "");
    }

    #[test]
    fn test_valid_within_lifetime_and_expired_after() {
        let codec = codec();
        let issued = issued_at();
        let lifetime = Duration::hours(1);
        let token = codec
            .issue_at(&subject(), "gho_delegated", lifetime, issued)
            .unwrap();

        for offset in [0, 1, 1800, 3599] {
            let now = issued + Duration::seconds(offset);
            assert!(
                codec.parse_and_verify_at(&token, now).is_ok(),
                "token should be valid {offset}s after issue"
            );
        }

        for offset in [3600, 3601, 86400] {
            let now = issued + Duration::seconds(offset);
            assert_eq!(
                codec.parse_and_verify_at(&token, now).unwrap_err(),
                SessionError::Expired,
                "token should be expired {offset}s after issue"
            );
        }
    }

    #[test]
    fn test_altered_signature_is_signature_invalid() {
        let codec = codec();
        let token = codec
            .issue_at(&subject(), "gho_delegated", Duration::hours(1), issued_at())
            .unwrap();
        let (message, signature) = token.rsplit_once('.').unwrap();

        // The final character carries base64 padding bits, flip everything before it
        for index in 0..signature.len() - 1 {
            let mut altered: Vec<char> = signature.chars().collect();
            altered[index] = if altered[index] == 'A' { 'B' } else { 'A' };
            let altered: String = altered.into_iter().collect();
            let tampered = format!("{message}.{altered}");

            assert_eq!(
                codec
                    .parse_and_verify_at(&tampered, issued_at())
                    .unwrap_err(),
                SessionError::SignatureInvalid,
                "altering signature byte {index} must be reported as an invalid signature"
            );
        }
    }

    #[test]
    fn test_wrong_secret_is_signature_invalid() {
        let token = SessionCodec::new("secret-A")
            .unwrap()
            .issue(&subject(), "gho_delegated", Duration::hours(1))
            .unwrap();

        let result = SessionCodec::new("secret-B")
            .unwrap()
            .parse_and_verify(&token);
        assert_eq!(result.unwrap_err(), SessionError::SignatureInvalid);
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let token = SessionCodec::new("secret-A")
            .unwrap()
            .issue_at(&subject(), "gho_delegated", Duration::hours(1), issued_at())
            .unwrap();

        let late = issued_at() + Duration::days(2);
        let result = SessionCodec::new("secret-B")
            .unwrap()
            .parse_and_verify_at(&token, late);
        assert_eq!(result.unwrap_err(), SessionError::SignatureInvalid);
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = codec();
        for token in ["", "not-a-token", "a.b.c", "a.b", "....", "eyJhbGciOiJIUzI1NiJ9.e30"] {
            assert_eq!(
                codec.parse_and_verify(token).unwrap_err(),
                SessionError::Malformed,
                "'{token}' should be malformed"
            );
        }
    }

    #[test]
    fn test_correctly_signed_but_incomplete_claims_are_malformed() {
        let token = encode(
            &Header::new(ALGORITHM),
            &json!({ "sub": "1001", "exp": 4_000_000_000i64 }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            codec().parse_and_verify(&token).unwrap_err(),
            SessionError::Malformed
        );
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        let token = encode(
            &Header::new(ALGORITHM),
            &json!({
                "sub": "1001",
                "login": "alice",
                "role": "owner",
                "upstream_token": "gho_delegated",
                "iat": 0,
                "exp": 4_000_000_000i64
            }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            codec().parse_and_verify(&token).unwrap_err(),
            SessionError::Malformed
        );
    }

    #[test]
    fn test_empty_secret_is_configuration_error() {
        for secret in ["", "   "] {
            assert!(matches!(
                SessionCodec::new(secret),
                Err(SessionError::Configuration(_))
            ));
        }
    }
}
