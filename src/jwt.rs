//! Session token service
//!
//! Signs and validates the JWT carried by the HTTP-only session cookie.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: i64,
    /// Login email, echoed for logging without a database round trip
    pub email: String,
    /// Role at issue time; authorization re-checks the user row per request
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// JWT service for generating and validating session tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    /// Create a JwtService from config
    ///
    /// An empty secret gets replaced by a random one, which invalidates all
    /// sessions on restart.
    pub fn from_config(config: &JwtConfig) -> Self {
        let secret = if config.secret.is_empty() {
            tracing::warn!("JWT secret not configured, generating a random one");
            uuid::Uuid::new_v4().to_string()
        } else {
            config.secret.clone()
        };

        Self::new(&secret, config.ttl_hours)
    }

    /// Generate a session token for a user
    pub fn generate(
        &self,
        user_id: i64,
        email: &str,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id,
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.ttl_hours)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a session token and return its claims
    pub fn validate(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test_secret_key_32_bytes_long!!", 12)
    }

    #[test]
    fn test_generate_and_validate() {
        let service = create_test_service();
        let token = service.generate(42, "jane@firm.example", "attorney").unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "jane@firm.example");
        assert_eq!(claims.role, "attorney");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();

        let result = service.validate("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = create_test_service();
        let service2 = JwtService::new("different_secret_key_32_bytes!!", 12);

        let token = service1.generate(1, "a@firm.example", "admin").unwrap();
        let result = service2.validate(&token);
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();

        // Claims that expired over an hour ago (past the default leeway)
        let now = Utc::now();
        let claims = SessionClaims {
            sub: 1,
            email: "a@firm.example".to_string(),
            role: "admin".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let encoding_key = EncodingKey::from_secret(b"test_secret_key_32_bytes_long!!");
        let token = encode(&Header::default(), &claims, &encoding_key).unwrap();

        let result = service.validate(&token);
        assert!(result.is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = create_test_service();
        let token = service.generate(1, "a@firm.example", "paralegal").unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(service.validate(&tampered).is_err());
    }
}
