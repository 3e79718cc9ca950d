//! The SQLite-backed store.

use crate::auth::hash_password;
use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Utc};
use codegate_types::{Account, AccountData, ActivationCode, Admin, CodeStatus};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS activation_codes (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    code         TEXT NOT NULL UNIQUE,
    expires_at   TEXT NOT NULL,
    max_accounts INTEGER NOT NULL,
    status       TEXT NOT NULL DEFAULT 'enabled',
    created_at   TEXT NOT NULL,
    deleted_at   TEXT
);

CREATE TABLE IF NOT EXISTS accounts (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    activation_code_id INTEGER NOT NULL REFERENCES activation_codes(id),
    email              TEXT NOT NULL,
    email_password     TEXT NOT NULL,
    service_password   TEXT NOT NULL,
    access_token       TEXT NOT NULL,
    refresh_token      TEXT NOT NULL,
    created_at         TEXT NOT NULL,
    deleted_at         TEXT
);
CREATE INDEX IF NOT EXISTS idx_accounts_code ON accounts(activation_code_id);

CREATE TABLE IF NOT EXISTS admins (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    deleted_at    TEXT
);
";

/// Durable store for activation codes, their accounts, and admins.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens (or creates) the database at `path` and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or schema setup fails.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Opens an in-memory database. Intended for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if schema setup fails.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // A poisoned mutex means another request panicked mid-operation; the
    // connection itself is still consistent (transactions roll back on drop),
    // so recover the guard rather than wedging every later request.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Activation codes ─────────────────────────────────────────

    /// Inserts a new enabled activation code.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateCode`] if the code string already exists.
    pub fn create_code(
        &self,
        code: &str,
        expires_at: DateTime<Utc>,
        max_accounts: u32,
    ) -> StoreResult<ActivationCode> {
        let conn = self.conn();
        let created_at = Utc::now();
        let result = conn.execute(
            "INSERT INTO activation_codes (code, expires_at, max_accounts, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                code,
                expires_at,
                max_accounts,
                CodeStatus::Enabled.as_str(),
                created_at
            ],
        );
        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                return Err(StoreError::DuplicateCode);
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        debug!(id, "activation code row inserted");
        Ok(ActivationCode {
            id,
            code: code.to_string(),
            expires_at,
            max_accounts,
            status: CodeStatus::Enabled,
            created_at,
            accounts: Vec::new(),
        })
    }

    /// Looks up a non-deleted code by id, with its accounts loaded.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if absent or soft-deleted.
    pub fn find_by_id(&self, id: i64) -> StoreResult<ActivationCode> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT id, code, expires_at, max_accounts, status, created_at
                 FROM activation_codes WHERE id = ?1 AND deleted_at IS NULL",
                [id],
                code_row,
            )
            .optional()?;
        let raw = row.ok_or_else(|| StoreError::NotFound(format!("activation code id {id}")))?;
        let mut code = decode_code_row(raw)?;
        code.accounts = load_accounts(&conn, code.id)?;
        Ok(code)
    }

    /// Looks up a non-deleted code by exact code string, with its accounts.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if absent or soft-deleted.
    pub fn find_by_code(&self, code_str: &str) -> StoreResult<ActivationCode> {
        let conn = self.conn();
        let row = conn
            .query_row(
                "SELECT id, code, expires_at, max_accounts, status, created_at
                 FROM activation_codes WHERE code = ?1 AND deleted_at IS NULL",
                [code_str],
                code_row,
            )
            .optional()?;
        let raw = row.ok_or_else(|| StoreError::NotFound("activation code".to_string()))?;
        let mut code = decode_code_row(raw)?;
        code.accounts = load_accounts(&conn, code.id)?;
        Ok(code)
    }

    /// Returns one page of codes (newest first) plus the total row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn list_paged(&self, offset: u64, limit: u32) -> StoreResult<(Vec<ActivationCode>, u64)> {
        let conn = self.conn();
        let total: u64 = conn.query_row(
            "SELECT COUNT(*) FROM activation_codes WHERE deleted_at IS NULL",
            [],
            |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, code, expires_at, max_accounts, status, created_at
             FROM activation_codes WHERE deleted_at IS NULL
             ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let raw_rows = stmt
            .query_map(params![limit, offset as i64], code_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut codes = Vec::with_capacity(raw_rows.len());
        for raw in raw_rows {
            let mut code = decode_code_row(raw)?;
            code.accounts = load_accounts(&conn, code.id)?;
            codes.push(code);
        }
        Ok((codes, total))
    }

    /// Sets the status of a code. Idempotent: re-setting the current status
    /// succeeds without effect.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the code is absent or soft-deleted.
    pub fn update_status(&self, id: i64, status: CodeStatus) -> StoreResult<()> {
        let affected = self.conn().execute(
            "UPDATE activation_codes SET status = ?1 WHERE id = ?2 AND deleted_at IS NULL",
            params![status.as_str(), id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("activation code id {id}")));
        }
        Ok(())
    }

    // ── Accounts ─────────────────────────────────────────────────

    /// Counts non-deleted accounts registered under a code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_accounts(&self, code_id: i64) -> StoreResult<u32> {
        Ok(self.conn().query_row(
            "SELECT COUNT(*) FROM accounts WHERE activation_code_id = ?1 AND deleted_at IS NULL",
            [code_id],
            |r| r.get(0),
        )?)
    }

    /// Inserts an account only if the code is still under its quota.
    ///
    /// Count and insert run inside one IMMEDIATE transaction, so concurrent
    /// registrations against the last free slot serialize: exactly one wins.
    ///
    /// # Errors
    ///
    /// [`StoreError::QuotaExceeded`] when the quota is already reached.
    pub fn insert_account_if_under_quota(
        &self,
        code_id: i64,
        data: &AccountData,
        max_accounts: u32,
    ) -> StoreResult<Account> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let count: u32 = tx.query_row(
            "SELECT COUNT(*) FROM accounts WHERE activation_code_id = ?1 AND deleted_at IS NULL",
            [code_id],
            |r| r.get(0),
        )?;
        if count >= max_accounts {
            // Transaction rolls back on drop.
            return Err(StoreError::QuotaExceeded);
        }

        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO accounts
                 (activation_code_id, email, email_password, service_password,
                  access_token, refresh_token, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                code_id,
                data.email,
                data.email_password,
                data.service_password,
                data.access_token,
                data.refresh_token,
                created_at
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(id, code_id, "account row inserted");
        Ok(Account {
            id,
            activation_code_id: code_id,
            email: data.email.clone(),
            email_password: data.email_password.clone(),
            service_password: data.service_password.clone(),
            access_token: data.access_token.clone(),
            refresh_token: data.refresh_token.clone(),
            created_at,
        })
    }

    // ── Admins ───────────────────────────────────────────────────

    /// Looks up a non-deleted admin by username.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if absent or soft-deleted.
    pub fn find_admin_by_username(&self, username: &str) -> StoreResult<Admin> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, username, password_hash, created_at
                 FROM admins WHERE username = ?1 AND deleted_at IS NULL",
                [username],
                |r| {
                    Ok(Admin {
                        id: r.get(0)?,
                        username: r.get(1)?,
                        password_hash: r.get(2)?,
                        created_at: r.get(3)?,
                    })
                },
            )
            .optional()?;
        row.ok_or_else(|| StoreError::NotFound(format!("admin {username}")))
    }

    /// Creates an admin with a freshly salted password verifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including a duplicate username).
    pub fn create_admin(&self, username: &str, password: &str) -> StoreResult<Admin> {
        let conn = self.conn();
        let created_at = Utc::now();
        let password_hash = hash_password(password);
        conn.execute(
            "INSERT INTO admins (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![username, password_hash, created_at],
        )?;
        Ok(Admin {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash,
            created_at,
        })
    }
}

// Raw code row before status decoding.
type CodeRow = (i64, String, DateTime<Utc>, u32, String, DateTime<Utc>);

fn code_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<CodeRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
    ))
}

fn decode_code_row(raw: CodeRow) -> StoreResult<ActivationCode> {
    let (id, code, expires_at, max_accounts, status, created_at) = raw;
    let status = CodeStatus::parse(&status)
        .ok_or_else(|| StoreError::InvalidData(format!("unknown status '{status}'")))?;
    Ok(ActivationCode {
        id,
        code,
        expires_at,
        max_accounts,
        status,
        created_at,
        accounts: Vec::new(),
    })
}

fn load_accounts(conn: &Connection, code_id: i64) -> StoreResult<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, activation_code_id, email, email_password, service_password,
                access_token, refresh_token, created_at
         FROM accounts WHERE activation_code_id = ?1 AND deleted_at IS NULL
         ORDER BY id",
    )?;
    let accounts = stmt
        .query_map([code_id], |r| {
            Ok(Account {
                id: r.get(0)?,
                activation_code_id: r.get(1)?,
                email: r.get(2)?,
                email_password: r.get(3)?,
                service_password: r.get(4)?,
                access_token: r.get(5)?,
                refresh_token: r.get(6)?,
                created_at: r.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(accounts)
}
