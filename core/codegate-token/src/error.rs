//! Error types for the token service.

use thiserror::Error;

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

/// Token verification and issuance errors.
///
/// Everything structurally wrong with a token collapses into `Invalid`;
/// only a well-formed, correctly signed, correctly tagged token that is past
/// its expiry reports `Expired`. Callers rely on the distinction.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed structure, or wrong signing domain.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// Token is past its embedded expiry.
    #[error("token expired")]
    Expired,
}
