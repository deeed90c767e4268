use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{Credentials, Role};
use crate::config;

/// Claim set carried by a bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error("token generation failed: {0}")]
    Encode(String),

    #[error("invalid token: {0}")]
    Decode(String),
}

/// Signs and verifies bearer tokens (HS256).
///
/// The rest of the system treats tokens as opaque strings; only the decoded
/// [`Credentials`] travel further.
#[derive(Clone)]
pub struct JwtCodec {
    secret: String,
    expiry_hours: i64,
}

impl JwtCodec {
    pub fn new(secret: impl Into<String>, expiry_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn from_config() -> Self {
        let security = &config::config().security;
        Self::new(security.jwt_secret.clone(), security.jwt_expiry_hours as i64)
    }

    pub fn encode(&self, credentials: &Credentials) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let now = Utc::now();
        let claims = Claims {
            sub: credentials.subject.clone(),
            role: credentials.role,
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Encode(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<Credentials, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| TokenError::Decode(e.to_string()))?;

        Ok(Credentials {
            subject: data.claims.sub,
            role: data.claims.role,
        })
    }
}
