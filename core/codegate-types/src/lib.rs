//! Shared entity types for the codegate activation service.
//!
//! Activation codes gate access to a pool of registered accounts. A code is
//! created by an administrator with a fixed expiry and an account quota, and
//! is redeemed by the end-user app for a scoped token. Everything here is a
//! plain data type; lifecycle rules live in the engine crate.

mod account;
mod admin;
mod code;

pub use account::{Account, AccountData};
pub use admin::Admin;
pub use code::{
    ActivationCode, CodeState, CodeStatus, PagedCodes, CODE_ALPHABET, CODE_LENGTH,
};
