use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: u64,
    exp: u64,
}

/// Issues and verifies signed bearer tokens (HS256 with a server-held secret).
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.jwt_leeway.as_secs();

        Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            validation,
            ttl: config.token_ttl,
        }
    }

    /// Issue an access token for the given user id.
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a bearer token and return the subject user id.
    ///
    /// Expired, malformed and tampered tokens all collapse into the same
    /// error so callers cannot distinguish why verification failed.
    pub fn verify(&self, token: &str) -> Result<i64> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| Self::invalid_token())?;

        data.claims.sub.parse::<i64>().map_err(|_| Self::invalid_token())
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.as_secs() as i64
    }

    fn invalid_token() -> AppError {
        AppError::Auth("Invalid or expired token".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str) -> AuthConfig {
        AuthConfig {
            secret_key: secret.to_string(),
            token_ttl: Duration::from_secs(3600),
            jwt_leeway: Duration::from_secs(0),
        }
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let service = TokenService::new(&test_config("test-secret"));
        let token = service.issue(42).unwrap();
        assert_eq!(service.verify(&token).unwrap(), 42);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let service = TokenService::new(&test_config("secret-a"));
        let other = TokenService::new(&test_config("secret-b"));
        let token = other.issue(42).unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let service = TokenService::new(&test_config("test-secret"));
        let now = Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: "42".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let service = TokenService::new(&test_config("test-secret"));
        assert!(service.verify("").is_err());
        assert!(service.verify("not.a.jwt").is_err());
    }
}
