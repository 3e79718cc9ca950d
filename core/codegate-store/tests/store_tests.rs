use chrono::{Duration, Utc};
use codegate_store::{Store, StoreError};
use codegate_types::{AccountData, CodeStatus};
use std::sync::Arc;
use tempfile::TempDir;

fn open_store() -> (Store, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Store::open(&dir.path().join("codegate.db")).unwrap();
    (store, dir)
}

fn account_data(n: u32) -> AccountData {
    AccountData {
        email: format!("user{n}@example.com"),
        email_password: "mail-pw".to_string(),
        service_password: "svc-pw".to_string(),
        access_token: "at".to_string(),
        refresh_token: "rt".to_string(),
    }
}

// ── Code CRUD ────────────────────────────────────────────────────

#[test]
fn create_and_find_by_id() {
    let (store, _dir) = open_store();
    let expires = Utc::now() + Duration::days(7);
    let created = store.create_code("AAAAAAAAAAAAAAAAAA", expires, 3).unwrap();

    let found = store.find_by_id(created.id).unwrap();
    assert_eq!(found.code, "AAAAAAAAAAAAAAAAAA");
    assert_eq!(found.max_accounts, 3);
    assert_eq!(found.status, CodeStatus::Enabled);
    assert!(found.accounts.is_empty());
}

#[test]
fn find_by_code_is_exact_match() {
    let (store, _dir) = open_store();
    store
        .create_code("AAAAAAAAAAAAAAAAAA", Utc::now() + Duration::days(1), 1)
        .unwrap();

    assert!(store.find_by_code("AAAAAAAAAAAAAAAAAA").is_ok());
    assert!(matches!(
        store.find_by_code("aaaaaaaaaaaaaaaaaa"),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn duplicate_code_rejected_by_unique_constraint() {
    let (store, _dir) = open_store();
    let expires = Utc::now() + Duration::days(1);
    store.create_code("DUPDUPDUPDUPDUPDUP", expires, 1).unwrap();
    assert!(matches!(
        store.create_code("DUPDUPDUPDUPDUPDUP", expires, 1),
        Err(StoreError::DuplicateCode)
    ));
}

#[test]
fn missing_id_is_not_found() {
    let (store, _dir) = open_store();
    assert!(matches!(
        store.find_by_id(999),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn expires_at_round_trips() {
    let (store, _dir) = open_store();
    let expires = Utc::now() + Duration::days(30);
    let created = store.create_code("RTRTRTRTRTRTRTRTRT", expires, 1).unwrap();
    let found = store.find_by_id(created.id).unwrap();
    assert!((found.expires_at - expires).num_seconds().abs() < 1);
}

// ── Status updates ───────────────────────────────────────────────

#[test]
fn update_status_and_idempotence() {
    let (store, _dir) = open_store();
    let code = store
        .create_code("STSTSTSTSTSTSTSTST", Utc::now() + Duration::days(1), 1)
        .unwrap();

    store.update_status(code.id, CodeStatus::Disabled).unwrap();
    assert_eq!(
        store.find_by_id(code.id).unwrap().status,
        CodeStatus::Disabled
    );

    // Second identical update is a no-op success.
    store.update_status(code.id, CodeStatus::Disabled).unwrap();
    assert_eq!(
        store.find_by_id(code.id).unwrap().status,
        CodeStatus::Disabled
    );
}

#[test]
fn update_status_missing_code_is_not_found() {
    let (store, _dir) = open_store();
    assert!(matches!(
        store.update_status(42, CodeStatus::Enabled),
        Err(StoreError::NotFound(_))
    ));
}

// ── Accounts and quota ───────────────────────────────────────────

#[test]
fn insert_accounts_up_to_quota() {
    let (store, _dir) = open_store();
    let code = store
        .create_code("QQQQQQQQQQQQQQQQQQ", Utc::now() + Duration::days(1), 2)
        .unwrap();

    store
        .insert_account_if_under_quota(code.id, &account_data(1), 2)
        .unwrap();
    store
        .insert_account_if_under_quota(code.id, &account_data(2), 2)
        .unwrap();
    assert!(matches!(
        store.insert_account_if_under_quota(code.id, &account_data(3), 2),
        Err(StoreError::QuotaExceeded)
    ));

    assert_eq!(store.count_accounts(code.id).unwrap(), 2);
}

#[test]
fn accounts_load_in_registration_order() {
    let (store, _dir) = open_store();
    let code = store
        .create_code("OOOOOOOOOOOOOOOOOO", Utc::now() + Duration::days(1), 5)
        .unwrap();
    for n in 1..=3 {
        store
            .insert_account_if_under_quota(code.id, &account_data(n), 5)
            .unwrap();
    }

    let found = store.find_by_id(code.id).unwrap();
    let emails: Vec<&str> = found.accounts.iter().map(|a| a.email.as_str()).collect();
    assert_eq!(
        emails,
        vec![
            "user1@example.com",
            "user2@example.com",
            "user3@example.com"
        ]
    );
}

#[test]
fn concurrent_registrations_fill_exactly_one_slot() {
    let (store, _dir) = open_store();
    let store = Arc::new(store);
    let code = store
        .create_code("CCCCCCCCCCCCCCCCCC", Utc::now() + Duration::days(1), 1)
        .unwrap();

    let mut handles = Vec::new();
    for n in 0..50 {
        let store = Arc::clone(&store);
        let code_id = code.id;
        handles.push(std::thread::spawn(move || {
            store.insert_account_if_under_quota(code_id, &account_data(n), 1)
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let quota_errors = results
        .iter()
        .filter(|r| matches!(r, Err(StoreError::QuotaExceeded)))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(quota_errors, 49);
    assert_eq!(store.count_accounts(code.id).unwrap(), 1);
}

// ── Listing ──────────────────────────────────────────────────────

#[test]
fn list_paged_returns_total_and_newest_first() {
    let (store, _dir) = open_store();
    for n in 0..25 {
        store
            .create_code(
                &format!("LIST{n:02}LISTLISTLIST"),
                Utc::now() + Duration::days(1),
                1,
            )
            .unwrap();
    }

    let (page1, total) = store.list_paged(0, 10).unwrap();
    assert_eq!(total, 25);
    assert_eq!(page1.len(), 10);
    // Newest row (highest id) first.
    assert!(page1[0].id > page1[9].id);

    let (page3, _) = store.list_paged(20, 10).unwrap();
    assert_eq!(page3.len(), 5);

    let (beyond, _) = store.list_paged(30, 10).unwrap();
    assert!(beyond.is_empty());
}

// ── Soft deletes ─────────────────────────────────────────────────
//
// The store never deletes; the deleting layer sets `deleted_at` out of band.
// Emulate that with a second connection to the same database file.

#[test]
fn soft_deleted_code_surfaces_as_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codegate.db");
    let store = Store::open(&path).unwrap();
    let code = store
        .create_code("SOFTDELSOFTDELSOFT", Utc::now() + Duration::days(1), 1)
        .unwrap();
    let (_, total_before) = store.list_paged(0, 10).unwrap();
    assert_eq!(total_before, 1);

    let raw = rusqlite::Connection::open(&path).unwrap();
    raw.execute(
        "UPDATE activation_codes SET deleted_at = ?1 WHERE id = ?2",
        rusqlite::params![Utc::now(), code.id],
    )
    .unwrap();

    assert!(matches!(
        store.find_by_id(code.id),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.find_by_code("SOFTDELSOFTDELSOFT"),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        store.update_status(code.id, CodeStatus::Disabled),
        Err(StoreError::NotFound(_))
    ));

    let (items, total) = store.list_paged(0, 10).unwrap();
    assert!(items.is_empty());
    assert_eq!(total, 0);
}

#[test]
fn soft_deleted_account_leaves_the_quota() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codegate.db");
    let store = Store::open(&path).unwrap();
    let code = store
        .create_code("SDELACCTSDELACCTSD", Utc::now() + Duration::days(1), 2)
        .unwrap();
    let first = store
        .insert_account_if_under_quota(code.id, &account_data(1), 2)
        .unwrap();
    store
        .insert_account_if_under_quota(code.id, &account_data(2), 2)
        .unwrap();
    assert_eq!(store.count_accounts(code.id).unwrap(), 2);

    let raw = rusqlite::Connection::open(&path).unwrap();
    raw.execute(
        "UPDATE accounts SET deleted_at = ?1 WHERE id = ?2",
        rusqlite::params![Utc::now(), first.id],
    )
    .unwrap();

    // The deleted account no longer counts, no longer loads, and its slot
    // is free again.
    assert_eq!(store.count_accounts(code.id).unwrap(), 1);
    let found = store.find_by_id(code.id).unwrap();
    assert_eq!(found.accounts.len(), 1);
    assert_eq!(found.accounts[0].email, "user2@example.com");
    assert!(store
        .insert_account_if_under_quota(code.id, &account_data(3), 2)
        .is_ok());
}

// ── Admins ───────────────────────────────────────────────────────

#[test]
fn admin_create_find_verify() {
    let (store, _dir) = open_store();
    let created = store.create_admin("root", "s3cret").unwrap();
    let found = store.find_admin_by_username("root").unwrap();
    assert_eq!(found.id, created.id);
    assert!(codegate_store::verify_password(
        &found.password_hash,
        "s3cret"
    ));
    assert!(!codegate_store::verify_password(
        &found.password_hash,
        "wrong"
    ));
}

#[test]
fn missing_admin_is_not_found() {
    let (store, _dir) = open_store();
    assert!(matches!(
        store.find_admin_by_username("ghost"),
        Err(StoreError::NotFound(_))
    ));
}
