//! Typed engine errors mapped to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use codegate_engine::EngineError;
use codegate_token::TokenError;
use serde_json::json;

// App-facing numeric error codes, stable across releases.
const CODE_INVALID: u32 = 1001;
const CODE_EXPIRED: u32 = 1002;
const CODE_DISABLED: u32 = 1003;
const CODE_QUOTA: u32 = 1004;

/// An error response: HTTP status plus a numeric `error_code` the end-user
/// app branches on (expired vs disabled vs quota-full are different UX).
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error_code: u32,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, error_code: u32, message: impl Into<String>) -> Self {
        Self {
            status,
            error_code,
            message: message.into(),
        }
    }

    /// 401 from the authorization gate.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, 401, message)
    }

    /// 400 for malformed input caught at the handler boundary.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, 400, message)
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, 400, message),
            EngineError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, CODE_INVALID, message),
            EngineError::DisabledCode => Self::new(StatusCode::FORBIDDEN, CODE_DISABLED, message),
            EngineError::ExpiredCode => Self::new(StatusCode::FORBIDDEN, CODE_EXPIRED, message),
            EngineError::QuotaExceeded => Self::new(StatusCode::BAD_REQUEST, CODE_QUOTA, message),
            EngineError::InvalidCredentials => Self::new(StatusCode::UNAUTHORIZED, 401, message),
            EngineError::Token(TokenError::Expired) => Self::unauthorized(message),
            EngineError::Token(TokenError::Invalid(_)) => Self::unauthorized(message),
            EngineError::DuplicateCode | EngineError::Persistence(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, 500, message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error_code": self.error_code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
