//! JWT token service

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::models::{Actor, Role};
use std::ops::Deref;
use thiserror::Error;

/// JWT settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 key, at least 32 bytes in production
    pub secret: String,
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes: 1440,
            issuer: "civic-server".to_string(),
            audience: "civic-dashboard".to_string(),
        }
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Sign an access token for `actor`
    ///
    /// Login lives outside this service; this serves tools and tests.
    pub fn generate_token(&self, actor: &Actor) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: actor.id.clone(),
            name: actor.name.clone(),
            email: actor.email.clone(),
            phone: actor.phone.clone(),
            role: actor.role,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Verify and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Token part of an `Authorization` header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Authenticated caller of a request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Actor);

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self(Actor {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            phone: claims.phone,
            role: claims.role,
        })
    }
}

impl Deref for CurrentUser {
    type Target = Actor;

    fn deref(&self) -> &Actor {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig::new("test-secret-with-at-least-32-characters!"))
    }

    fn supervisor() -> Actor {
        Actor {
            id: "65f0c0ffee65f0c0ffee65f0".into(),
            name: "Meera".into(),
            email: Some("meera@city.gov.in".into()),
            phone: None,
            role: Role::HeadSupervisor,
        }
    }

    #[test]
    fn test_roundtrip_keeps_role() {
        let svc = service();
        let token = svc.generate_token(&supervisor()).unwrap();
        let user = CurrentUser::from(svc.validate_token(&token).unwrap());
        assert_eq!(user.0, supervisor());
        assert!(user.is_head_supervisor());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().generate_token(&supervisor()).unwrap();
        let other = JwtService::with_config(JwtConfig::new("another-secret-with-at-least-32-chars!!"));
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let svc = JwtService::with_config(JwtConfig {
            expiration_minutes: -10,
            ..JwtConfig::new("test-secret-with-at-least-32-characters!")
        });
        let token = svc.generate_token(&supervisor()).unwrap();
        assert!(matches!(svc.validate_token(&token), Err(JwtError::ExpiredToken)));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
    }
}
