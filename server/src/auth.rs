//! Authorization gate: bearer-token extractors for the two token domains.
//!
//! Each extractor verifies the token against its own domain and injects the
//! resolved identity into the handler; a bad or missing token short-circuits
//! with 401 before the handler runs. Live code validity is deliberately NOT
//! checked here — that stays in the engine so "is this code still valid"
//! lives in one place.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

/// Identity of an authenticated administrator.
#[derive(Debug, Clone, Copy)]
pub struct AdminIdentity(pub i64);

/// Identity of an authenticated app: the activation-code id its token is
/// bound to.
#[derive(Debug, Clone, Copy)]
pub struct CodeIdentity(pub i64);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))
}

impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let admin_id = state.tokens.verify_admin(token).map_err(|e| {
            debug!(error = %e, "admin token rejected");
            ApiError::unauthorized("invalid admin token")
        })?;
        Ok(Self(admin_id))
    }
}

impl FromRequestParts<AppState> for CodeIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let code_id = state.tokens.verify_code(token).map_err(|e| {
            debug!(error = %e, "app token rejected");
            ApiError::unauthorized("invalid app token")
        })?;
        Ok(Self(code_id))
    }
}
