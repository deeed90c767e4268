// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::TokenError;
use crate::routing::RoutingError;
use crate::store::StoreError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert module error types to ApiError
impl From<RoutingError> for ApiError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::InvalidVerb(_) => ApiError::bad_request(err.to_string()),
            RoutingError::NoRouteMatch { .. } => ApiError::not_found(err.to_string()),
            RoutingError::AmbiguousRoute { .. } => {
                // a registration defect, not a client problem
                tracing::error!("ambiguous route table: {}", err);
                ApiError::internal_server_error(err.to_string())
            }
            RoutingError::AccessDenied { .. } => ApiError::forbidden(err.to_string()),
            RoutingError::ParamExtraction { .. } => {
                tracing::error!("parameter extraction inconsistency: {}", err);
                ApiError::internal_server_error("An error occurred while routing the request")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::not_found(err.to_string()),
            StoreError::Conflict(_) => ApiError::conflict(err.to_string()),
            StoreError::MissingField(_) | StoreError::InvalidRecord(_) => {
                ApiError::bad_request(err.to_string())
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Decode(_) => ApiError::unauthorized(err.to_string()),
            TokenError::MissingSecret | TokenError::Encode(_) => {
                tracing::error!("token codec failure: {}", err);
                ApiError::internal_server_error("An error occurred while issuing the token")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Verb;

    #[test]
    fn routing_errors_map_to_expected_statuses() {
        let not_found: ApiError = RoutingError::NoRouteMatch {
            verb: Verb::Get,
            path: "nowhere".to_string(),
        }
        .into();
        assert_eq!(not_found.status_code(), 404);

        let denied: ApiError = RoutingError::AccessDenied {
            guard: "Authenticated".to_string(),
        }
        .into();
        assert_eq!(denied.status_code(), 403);
        assert!(denied.message().contains("Authenticated"));

        let ambiguous: ApiError = RoutingError::AmbiguousRoute {
            verb: Verb::Get,
            path: "a/b".to_string(),
        }
        .into();
        assert_eq!(ambiguous.status_code(), 500);

        let invalid: ApiError = RoutingError::InvalidVerb("PATCH".to_string()).into();
        assert_eq!(invalid.status_code(), 400);
    }
}
