//! Account entities registered under an activation code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials for one linked third-party account.
///
/// The credential fields are opaque secrets: this system stores and returns
/// them but never derives or validates anything from their contents.
/// Accounts are created only through the engine's registration path and are
/// never edited or deleted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    /// Back-reference to the owning activation code.
    pub activation_code_id: i64,
    pub email: String,
    pub email_password: String,
    pub service_password: String,
    pub access_token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a new account. Identity and ownership are assigned
/// by the store at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    pub email: String,
    pub email_password: String,
    pub service_password: String,
    pub access_token: String,
    pub refresh_token: String,
}
