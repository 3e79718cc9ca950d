//! Two-domain token issuance and verification.
//!
//! Tokens use the format: `base64url(header).base64url(claims).base64url(signature)`
//!
//! The claims are a JSON object containing:
//! - `sub`: signing domain tag (`"admin"` or `"app"`)
//! - `boundId`: the admin or activation-code id the token is bound to
//! - `iat`: issued-at timestamp (seconds since epoch)
//! - `exp`: expiry timestamp (seconds since epoch)
//!
//! The two domains sign with distinct secrets, and verification additionally
//! requires the matching `sub` tag, so an admin token can never pass as a
//! code-scoped token even if both secrets were (mis)configured identically.
//!
//! Secrets are passed in explicitly via [`TokenKeys`] at construction; there
//! is no ambient key state, so tests can run with throwaway keys.

mod error;
mod service;

pub use error::{TokenError, TokenResult};
pub use service::{Claims, TokenKeys, TokenService, DEFAULT_TTL_SECS, SUBJECT_ADMIN, SUBJECT_APP};
