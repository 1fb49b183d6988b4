//! HS256 bearer tokens.
//!
//! The subject claim carries the numeric user id; the display name travels
//! in `name` so the server can answer `/auth/me` without a lookup.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use postboard_core::ports::{AuthError, TokenClaims, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";
const DEFAULT_ISSUER: &str = "postboard-api";
const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// Signing configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expiration_hours: DEFAULT_EXPIRATION_HOURS,
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }
}

impl JwtConfig {
    /// Load from `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, signing tokens with the built-in secret");
                defaults.secret
            }
        };

        Self {
            secret,
            expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.expiration_hours),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    name: String,
    exp: i64,
    iat: i64,
    iss: String,
}

impl Claims {
    fn user_id(&self) -> Result<i32, AuthError> {
        match self.sub.parse::<i32>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(AuthError::InvalidToken(format!(
                "subject {:?} is not a user id",
                self.sub
            ))),
        }
    }
}

/// [`TokenService`] backed by `jsonwebtoken`.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }
}

impl TokenService for JwtTokenService {
    fn generate_token(&self, user_id: i32, username: &str) -> Result<String, AuthError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + TimeDelta::hours(self.config.expiration_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            name: username.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?
            .claims;

        Ok(TokenClaims {
            user_id: claims.user_id()?,
            username: claims.name,
            exp: claims.exp,
        })
    }

    fn expiration_seconds(&self) -> i64 {
        self.config.expiration_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with(configure: impl FnOnce(&mut JwtConfig)) -> JwtTokenService {
        let mut config = JwtConfig {
            secret: "jwt-unit-test".to_string(),
            expiration_hours: 1,
            issuer: "postboard-test".to_string(),
        };
        configure(&mut config);
        JwtTokenService::new(config)
    }

    #[test]
    fn test_issued_token_carries_user() {
        let service = service_with(|_| {});

        let token = service.generate_token(9, "alice").unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id, 9);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_garbage_is_invalid() {
        let service = service_with(|_| {});

        assert!(matches!(
            service.validate_token("not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_foreign_issuer_or_secret_is_rejected() {
        let service = service_with(|_| {});
        let other_issuer = service_with(|c| c.issuer = "someone-else".to_string());
        let other_secret = service_with(|c| c.secret = "another-secret".to_string());

        let token = other_issuer.generate_token(1, "bob").unwrap();
        assert!(service.validate_token(&token).is_err());

        let token = other_secret.generate_token(1, "bob").unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = service_with(|c| c.expiration_hours = -2);

        let token = service.generate_token(1, "bob").unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_anonymous_subject_is_rejected() {
        let service = service_with(|_| {});

        let token = service.generate_token(0, "nobody").unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expiration_seconds() {
        assert_eq!(service_with(|c| c.expiration_hours = 24).expiration_seconds(), 86_400);
    }
}
