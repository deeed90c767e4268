pub mod guard;
pub mod token;

pub use guard::Guard;
pub use token::{Claims, JwtCodec, TokenError};

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

/// Role ladder. Declaration order defines the total order used by
/// [`Guard::RoleAtLeast`]: `User < Moderator < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

/// A decoded bearer credential: who is calling and at what role.
///
/// Produced by the token codec and consumed by guards; the routing engine
/// never inspects it beyond the role comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub subject: String,
    pub role: Role,
}

/// Per-request authentication context handed into resolution.
///
/// Holds the decoded credential when a valid bearer token accompanied the
/// request, nothing otherwise. Guards only ever read it.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    credentials: Option<Credentials>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { credentials: None }
    }

    pub fn authenticated(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }

    /// Builds the context from request headers. No token yields an
    /// anonymous context; an undecodable token is logged and also treated
    /// as anonymous, so public routes stay reachable with a stale token and
    /// guarded routes still refuse the request.
    pub fn from_headers(headers: &HeaderMap, codec: &JwtCodec) -> Self {
        let Some(token) = bearer_token(headers) else {
            return Self::anonymous();
        };

        match codec.decode(token) {
            Ok(credentials) => Self::authenticated(credentials),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring undecodable bearer token");
                Self::anonymous()
            }
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
