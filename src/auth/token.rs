use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Claims carried by a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by a single-use email-verification token
#[derive(Debug, Serialize, Deserialize)]
pub struct VerificationClaims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token generation failed: {0}")]
    Generation(String),
}

/// Issues and validates the two token kinds the API uses: bearer session
/// tokens and email-verification tokens. Verification tokens travel
/// base64-wrapped so they survive being pasted into a URL query parameter.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_ttl: Duration,
    verification_ttl: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(security.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(security.jwt_secret.as_bytes()),
            validation: Validation::default(),
            session_ttl: Duration::hours(security.session_ttl_hours),
            verification_ttl: Duration::hours(security.verification_ttl_hours),
        }
    }

    /// Issue a bearer token for the given user, valid for the configured
    /// session window (24 hours by default).
    pub fn issue_session(&self, user_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = SessionClaims {
            id: user_id,
            iat: now.timestamp(),
            exp: (now + self.session_ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Validate a session token. Expired, tampered, or otherwise malformed
    /// tokens all come back as `None`.
    pub fn authenticate(&self, token: &str) -> Option<Uuid> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .ok()
            .map(|data| data.claims.id)
    }

    /// Issue an email-verification token encoding the address.
    pub fn issue_verification(&self, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = VerificationClaims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.verification_ttl).timestamp(),
        };
        let jwt = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))?;
        Ok(BASE64.encode(jwt))
    }

    /// Redeem a verification token, returning the encoded email address.
    /// Invalid base64, a bad signature, and expiry all collapse to the
    /// same `None` outcome; callers cannot distinguish them.
    pub fn redeem_verification(&self, token: &str) -> Option<String> {
        let jwt_bytes = BASE64.decode(token).ok()?;
        let jwt = String::from_utf8(jwt_bytes).ok()?;
        decode::<VerificationClaims>(&jwt, &self.decoding_key, &self.validation)
            .ok()
            .map(|data| data.claims.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecurityConfig {
            jwt_secret: "test-secret".into(),
            session_ttl_hours: 24,
            verification_ttl_hours: 24,
            hash_memory_kib: 19456,
            hash_iterations: 2,
        })
    }

    #[test]
    fn session_round_trip() {
        let service = service();
        let user_id = Uuid::new_v4();
        let token = service.issue_session(user_id).unwrap();
        assert_eq!(service.authenticate(&token), Some(user_id));
    }

    #[test]
    fn session_rejects_wrong_secret() {
        let issuer = service();
        let other = TokenService::new(&SecurityConfig {
            jwt_secret: "different-secret".into(),
            session_ttl_hours: 24,
            verification_ttl_hours: 24,
            hash_memory_kib: 19456,
            hash_iterations: 2,
        });
        let token = issuer.issue_session(Uuid::new_v4()).unwrap();
        assert_eq!(other.authenticate(&token), None);
    }

    #[test]
    fn verification_round_trip() {
        let service = service();
        let token = service.issue_verification("a@x.com").unwrap();
        assert_eq!(service.redeem_verification(&token).as_deref(), Some("a@x.com"));
    }

    #[test]
    fn verification_detects_tampering() {
        let service = service();
        let token = service.issue_verification("a@x.com").unwrap();

        // Flip one character anywhere in the token
        let mut bytes = token.into_bytes();
        let i = bytes.len() / 2;
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(service.redeem_verification(&tampered), None);
    }

    #[test]
    fn verification_rejects_garbage() {
        let service = service();
        assert_eq!(service.redeem_verification("This is invalid token"), None);
        assert_eq!(service.redeem_verification(""), None);
    }
}
