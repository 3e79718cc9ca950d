//! Administrator entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// An administrator account. Only the subject of admin-token issuance; the
/// password verifier format is owned by the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: i64,
    pub username: String,
    /// Salted password verifier. Never serialized to clients.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
