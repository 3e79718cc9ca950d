//! Error taxonomy for engine operations.

use codegate_store::StoreError;
use codegate_token::TokenError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine-level errors.
///
/// The engine never recovers these locally; each caller maps the most
/// specific kind to its own response. Callers distinguish disabled from
/// expired from quota-full, so these must stay separate variants.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or out-of-range input. Caller's fault, no retry.
    #[error("validation error: {0}")]
    Validation(String),

    /// Code or admin absent (or soft-deleted).
    #[error("not found: {0}")]
    NotFound(String),

    /// Code revoked by an administrator.
    #[error("activation code is disabled")]
    DisabledCode,

    /// Code past its expiry timestamp.
    #[error("activation code has expired")]
    ExpiredCode,

    /// Account cap for the code is reached.
    #[error("account quota exceeded")]
    QuotaExceeded,

    /// Admin username/password mismatch. Deliberately one kind for both.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token issuance or verification failure.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Freshly generated code string collided with an existing one. The
    /// caller should retry generation, not surface this to the end user.
    #[error("generated code collided, retry")]
    DuplicateCode,

    /// Store unavailable or transaction failure. Safe for the caller to retry.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::DuplicateCode => Self::DuplicateCode,
            StoreError::QuotaExceeded => Self::QuotaExceeded,
            StoreError::Database(e) => Self::Persistence(e.to_string()),
            StoreError::InvalidData(e) => Self::Persistence(e),
        }
    }
}
