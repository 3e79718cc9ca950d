//! SQLite persistence for the codegate activation service.
//!
//! One [`Store`] owns a single connection behind a mutex; every operation is
//! a bounded synchronous unit of work. The quota-gated account insert runs
//! its count and insert inside one IMMEDIATE transaction, which is what makes
//! the `accounts.len() <= max_accounts` invariant hold under concurrency.
//!
//! Rows carry a `deleted_at` column; soft-deleted rows are filtered by every
//! query and surface as `NotFound` at this boundary. The store itself never
//! deletes.

mod auth;
mod error;
mod store;

pub use auth::{hash_password, verify_password};
pub use error::{StoreError, StoreResult};
pub use store::Store;
