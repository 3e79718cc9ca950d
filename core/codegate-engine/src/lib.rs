//! Activation-code lifecycle and quota-enforcement engine.
//!
//! This crate owns the rules the rest of the system defers to:
//! - The validity state machine: disabled / expired / valid, computed live
//!   from stored status and the wall clock at every access. A scoped token
//!   is a capability, not a guarantee; disabling a code takes effect on the
//!   next use regardless of any outstanding token's own expiry.
//! - The quota invariant: registrations run through the store's transactional
//!   count-and-insert, so a code can never end up over `max_accounts`.
//! - Error specificity: disabled, expired, quota-full, and not-found are
//!   distinct kinds and are never collapsed.

mod codegen;
mod engine;
mod error;

pub use codegen::generate_code;
pub use engine::{
    CodeInfo, Engine, Redemption, DEFAULT_PAGE_SIZE, MAX_ACCOUNTS_LIMIT, MAX_PAGE_SIZE,
};
pub use error::{EngineError, EngineResult};
