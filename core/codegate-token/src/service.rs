//! HS256 token codec and the two-domain service around it.

use crate::error::{TokenError, TokenResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Domain tag for administrator tokens.
pub const SUBJECT_ADMIN: &str = "admin";

/// Domain tag for code-scoped (app) tokens.
pub const SUBJECT_APP: &str = "app";

/// Default token validity window: 24 hours.
pub const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

impl Header {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// The signed claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Signing domain tag: [`SUBJECT_ADMIN`] or [`SUBJECT_APP`].
    pub sub: String,
    /// The admin id or activation-code id the token is bound to.
    pub bound_id: i64,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch), fixed at issuance.
    pub exp: i64,
}

/// Secret material and validity window for both signing domains.
///
/// Constructed once at startup from configuration and handed to
/// [`TokenService::new`].
#[derive(Debug, Clone)]
pub struct TokenKeys {
    admin_secret: Vec<u8>,
    app_secret: Vec<u8>,
    ttl_secs: i64,
}

impl TokenKeys {
    /// Creates key material with the default 24-hour validity window.
    pub fn new(admin_secret: impl Into<Vec<u8>>, app_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            admin_secret: admin_secret.into(),
            app_secret: app_secret.into(),
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    /// Overrides the validity window (seconds).
    #[must_use]
    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

/// Issues and verifies tokens for the two signing domains.
#[derive(Debug, Clone)]
pub struct TokenService {
    keys: TokenKeys,
}

impl TokenService {
    /// Creates a service from explicit key material.
    #[must_use]
    pub fn new(keys: TokenKeys) -> Self {
        Self { keys }
    }

    /// Issues an administrator token bound to `admin_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if claim serialization fails.
    pub fn issue_admin(&self, admin_id: i64) -> TokenResult<String> {
        self.issue(SUBJECT_ADMIN, admin_id, &self.keys.admin_secret)
    }

    /// Issues a code-scoped token bound to `code_id`.
    ///
    /// The validity window is fixed here and is independent of the code's own
    /// expiry; holders must still pass the live code-validity check on use.
    ///
    /// # Errors
    ///
    /// Returns an error if claim serialization fails.
    pub fn issue_code(&self, code_id: i64) -> TokenResult<String> {
        self.issue(SUBJECT_APP, code_id, &self.keys.app_secret)
    }

    /// Verifies an administrator token and returns the bound admin id.
    ///
    /// # Errors
    ///
    /// [`TokenError::Invalid`] on bad structure, bad signature, or a token
    /// from the app domain; [`TokenError::Expired`] past the embedded expiry.
    pub fn verify_admin(&self, token: &str) -> TokenResult<i64> {
        self.verify(token, SUBJECT_ADMIN, &self.keys.admin_secret)
    }

    /// Verifies a code-scoped token and returns the bound code id.
    ///
    /// # Errors
    ///
    /// [`TokenError::Invalid`] on bad structure, bad signature, or a token
    /// from the admin domain; [`TokenError::Expired`] past the embedded expiry.
    pub fn verify_code(&self, token: &str) -> TokenResult<i64> {
        self.verify(token, SUBJECT_APP, &self.keys.app_secret)
    }

    fn issue(&self, subject: &str, bound_id: i64, secret: &[u8]) -> TokenResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            bound_id,
            iat: now,
            exp: now + self.keys.ttl_secs,
        };

        let header_json = serde_json::to_vec(&Header::hs256())
            .map_err(|e| TokenError::Invalid(format!("header serialization: {e}")))?;
        let claims_json = serde_json::to_vec(&claims)
            .map_err(|e| TokenError::Invalid(format!("claims serialization: {e}")))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&header_json),
            URL_SAFE_NO_PAD.encode(&claims_json)
        );
        let signature = sign(secret, signing_input.as_bytes())?;

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn verify(&self, token: &str, subject: &str, secret: &[u8]) -> TokenResult<i64> {
        let token = token.trim();
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(TokenError::Invalid(
                "token must have exactly three parts".to_string(),
            ));
        }
        let (header_b64, claims_b64, sig_b64) = (parts[0], parts[1], parts[2]);

        let header_raw = b64_decode(header_b64)?;
        let header: Header = serde_json::from_slice(&header_raw)
            .map_err(|e| TokenError::Invalid(format!("header JSON: {e}")))?;
        if header.alg != "HS256" || !header.typ.eq_ignore_ascii_case("JWT") {
            return Err(TokenError::Invalid("unsupported token header".to_string()));
        }

        // Constant-time signature check before anything derived from claims.
        let signing_input = format!("{header_b64}.{claims_b64}");
        let sig = b64_decode(sig_b64)?;
        let mut mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| TokenError::Invalid(format!("HMAC key: {e}")))?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&sig)
            .map_err(|_| TokenError::Invalid("signature mismatch".to_string()))?;

        let claims_raw = b64_decode(claims_b64)?;
        let claims: Claims = serde_json::from_slice(&claims_raw)
            .map_err(|e| TokenError::Invalid(format!("claims JSON: {e}")))?;

        // Domain separation by tag, not only by key: a cross-domain token must
        // fail here even when both domains share secret material.
        if claims.sub != subject {
            return Err(TokenError::Invalid(format!(
                "wrong token domain: {}",
                claims.sub
            )));
        }

        if claims.exp < Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims.bound_id)
    }
}

fn sign(secret: &[u8], input: &[u8]) -> TokenResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| TokenError::Invalid(format!("HMAC key: {e}")))?;
    mac.update(input);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn b64_decode(s: &str) -> TokenResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s.as_bytes())
        .map_err(|e| TokenError::Invalid(format!("base64: {e}")))
}
