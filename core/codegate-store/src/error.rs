//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
///
/// `NotFound`, `DuplicateCode`, and `QuotaExceeded` are contract signals the
/// engine maps to its own taxonomy; everything else surfaces as a
/// persistence failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Row absent or soft-deleted.
    #[error("not found: {0}")]
    NotFound(String),

    /// Unique constraint on the code column rejected an insert.
    #[error("duplicate activation code")]
    DuplicateCode,

    /// The transactional account insert found the quota already reached.
    #[error("account quota reached")]
    QuotaExceeded,

    /// A stored row failed to decode (corrupt status or timestamp).
    #[error("invalid row data: {0}")]
    InvalidData(String),
}
