//! Activation code entity and its derived validity state.

use crate::Account;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a generated activation code string.
pub const CODE_LENGTH: usize = 18;

/// Alphabet for generated activation codes. Uppercase-only so a code survives
/// case-mangling channels (email clients, handwriting) without ambiguity.
pub const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Administrative status of an activation code.
///
/// This is the only mutable part of a code after creation. Expiry is never a
/// status value; it is derived from `expires_at` at every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeStatus {
    /// Code can be redeemed and used.
    Enabled,
    /// Code has been revoked by an administrator.
    Disabled,
}

impl CodeStatus {
    /// Returns the wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }

    /// Parses a status string, rejecting anything but the two known values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "enabled" => Some(Self::Enabled),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for CodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three-way validity classification of a code, computed live from the
/// stored status and the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeState {
    /// Revoked by an administrator. Takes precedence over expiry.
    Disabled,
    /// Past its `expires_at` timestamp.
    Expired,
    /// Enabled and not yet expired.
    Valid,
}

/// An activation code with its registered accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationCode {
    pub id: i64,
    /// Opaque code string, unique, `CODE_LENGTH` characters of `CODE_ALPHABET`.
    pub code: String,
    /// Absolute expiry, set once at creation.
    pub expires_at: DateTime<Utc>,
    /// Ceiling on the number of accounts registered under this code.
    pub max_accounts: u32,
    pub status: CodeStatus,
    pub created_at: DateTime<Utc>,
    /// Registered accounts, in registration order.
    pub accounts: Vec<Account>,
}

impl ActivationCode {
    /// Classifies the code at the given instant.
    ///
    /// Disabled wins over expired when both hold: disablement is the
    /// administrator's authoritative override.
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>) -> CodeState {
        if self.status == CodeStatus::Disabled {
            CodeState::Disabled
        } else if self.expires_at < now {
            CodeState::Expired
        } else {
            CodeState::Valid
        }
    }

    /// Classifies the code against the current wall clock.
    #[must_use]
    pub fn state(&self) -> CodeState {
        self.state_at(Utc::now())
    }
}

/// One page of activation codes plus paging metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedCodes {
    pub items: Vec<ActivationCode>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}
