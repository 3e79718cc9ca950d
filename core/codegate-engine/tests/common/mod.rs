//! Shared test helpers for engine tests.

#![allow(dead_code)]

use codegate_engine::Engine;
use codegate_store::Store;
use codegate_token::{TokenKeys, TokenService};
use codegate_types::AccountData;
use std::sync::Arc;

/// Builds an engine over an in-memory store, returning the store handle too
/// so tests can seed rows the engine's own API won't produce (expired codes).
pub fn test_engine() -> (Engine, Arc<Store>) {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let tokens = TokenService::new(TokenKeys::new("test-admin-key", "test-app-key"));
    (Engine::new(Arc::clone(&store), tokens), store)
}

pub fn account_data(n: u32) -> AccountData {
    AccountData {
        email: format!("user{n}@example.com"),
        email_password: "mail-pw".to_string(),
        service_password: "svc-pw".to_string(),
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
    }
}
