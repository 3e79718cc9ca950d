//! The activation engine.

use crate::codegen::generate_code;
use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Duration, Utc};
use codegate_store::{verify_password, Store, StoreError};
use codegate_token::TokenService;
use codegate_types::{Account, AccountData, ActivationCode, CodeState, CodeStatus, PagedCodes};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Upper bound on `max_accounts` at code creation.
pub const MAX_ACCOUNTS_LIMIT: u32 = 100;

/// Page size used when the caller passes zero.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper clamp on requested page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Result of redeeming an activation code.
#[derive(Debug, Clone)]
pub struct Redemption {
    /// Code-scoped bearer token.
    pub token: String,
    /// The redeemed code's own expiry (not the token's).
    pub code_expires_at: DateTime<Utc>,
}

/// Summary of a code as seen by the app holding a scoped token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeInfo {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub max_accounts: u32,
    pub used_accounts: u32,
    pub status: CodeStatus,
}

/// Orchestrates code creation, redemption, validity gating, and quota-checked
/// account registration.
#[derive(Clone)]
pub struct Engine {
    store: Arc<Store>,
    tokens: TokenService,
}

impl Engine {
    /// Creates an engine over the given store and token service.
    #[must_use]
    pub fn new(store: Arc<Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    // ── Admin operations ─────────────────────────────────────────

    /// Creates a new enabled activation code expiring `duration_days` from now.
    ///
    /// # Errors
    ///
    /// `Validation` on out-of-range input, `DuplicateCode` on a generator
    /// collision, `Persistence` on store failure.
    pub fn create_code(
        &self,
        duration_days: u32,
        max_accounts: u32,
    ) -> EngineResult<ActivationCode> {
        if duration_days < 1 {
            return Err(EngineError::Validation(
                "duration must be at least 1 day".to_string(),
            ));
        }
        if !(1..=MAX_ACCOUNTS_LIMIT).contains(&max_accounts) {
            return Err(EngineError::Validation(format!(
                "maxAccounts must be between 1 and {MAX_ACCOUNTS_LIMIT}"
            )));
        }

        let expires_at = Utc::now() + Duration::days(i64::from(duration_days));
        let code = self
            .store
            .create_code(&generate_code(), expires_at, max_accounts)?;
        info!(id = code.id, max_accounts, "activation code created");
        Ok(code)
    }

    /// Fetches a code by id with its accounts, no validity gating.
    ///
    /// # Errors
    ///
    /// `NotFound` if absent or soft-deleted.
    pub fn get_code(&self, id: i64) -> EngineResult<ActivationCode> {
        Ok(self.store.find_by_id(id)?)
    }

    /// Lists codes newest-first with normalized paging.
    ///
    /// `page < 1` becomes 1, `page_size < 1` becomes [`DEFAULT_PAGE_SIZE`],
    /// and page sizes are clamped to [`MAX_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// `Persistence` on store failure.
    pub fn list_codes(&self, page: u32, page_size: u32) -> EngineResult<PagedCodes> {
        let page = page.max(1);
        let page_size = if page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };

        let offset = u64::from(page - 1) * u64::from(page_size);
        let (items, total) = self.store.list_paged(offset, page_size)?;
        let total_pages = u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX);

        Ok(PagedCodes {
            items,
            total,
            page,
            page_size,
            total_pages,
        })
    }

    /// Sets a code's status. Idempotent.
    ///
    /// # Errors
    ///
    /// `NotFound` if the code is absent.
    pub fn update_status(&self, id: i64, status: CodeStatus) -> EngineResult<()> {
        self.store.update_status(id, status)?;
        info!(id, %status, "activation code status updated");
        Ok(())
    }

    /// Authenticates an admin and issues an admin token.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` covers both an unknown username and a wrong
    /// password, so responses don't leak which usernames exist.
    pub fn login(&self, username: &str, password: &str) -> EngineResult<String> {
        let admin = match self.store.find_admin_by_username(username) {
            Ok(admin) => admin,
            Err(StoreError::NotFound(_)) => {
                warn!(username, "login attempt for unknown admin");
                return Err(EngineError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };
        if !verify_password(&admin.password_hash, password) {
            warn!(username, "login attempt with wrong password");
            return Err(EngineError::InvalidCredentials);
        }
        Ok(self.tokens.issue_admin(admin.id)?)
    }

    /// Creates the bootstrap admin if the username doesn't exist yet.
    ///
    /// # Errors
    ///
    /// `Persistence` on store failure.
    pub fn ensure_default_admin(&self, username: &str, password: &str) -> EngineResult<()> {
        match self.store.find_admin_by_username(username) {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound(_)) => {
                self.store.create_admin(username, password)?;
                info!(username, "default admin created");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    // ── App operations ───────────────────────────────────────────

    /// Redeems a code string for a code-scoped token.
    ///
    /// The token's validity window is fixed at issuance and independent of
    /// the code's expiry; every later use re-checks the live code.
    ///
    /// # Errors
    ///
    /// `NotFound` if the string matches no code; `DisabledCode` /
    /// `ExpiredCode` per the validity state machine.
    pub fn redeem(&self, code_str: &str) -> EngineResult<Redemption> {
        let code = self.store.find_by_code(code_str)?;
        require_valid(&code)?;
        let token = self.tokens.issue_code(code.id)?;
        info!(id = code.id, "activation code redeemed");
        Ok(Redemption {
            token,
            code_expires_at: code.expires_at,
        })
    }

    /// Registers an account under a code, enforcing the quota atomically.
    ///
    /// The code is re-resolved and re-classified here — a caller-held
    /// snapshot or a still-unexpired token proves nothing about the code's
    /// current state.
    ///
    /// # Errors
    ///
    /// `DisabledCode` / `ExpiredCode` per the state machine (disabled wins
    /// when both hold), then `QuotaExceeded` once the cap is reached.
    pub fn register_account(&self, code_id: i64, data: AccountData) -> EngineResult<Account> {
        let code = self.store.find_by_id(code_id)?;
        require_valid(&code)?;

        let account = self
            .store
            .insert_account_if_under_quota(code.id, &data, code.max_accounts)?;
        info!(
            code_id = code.id,
            account_id = account.id,
            "account registered"
        );
        Ok(account)
    }

    /// Returns the accounts registered under a code, gated on live validity.
    ///
    /// # Errors
    ///
    /// `NotFound`, `DisabledCode`, or `ExpiredCode`.
    pub fn accounts_for_code(&self, code_id: i64) -> EngineResult<Vec<Account>> {
        let code = self.store.find_by_id(code_id)?;
        require_valid(&code)?;
        Ok(code.accounts)
    }

    /// Returns a summary of a code, gated on live validity.
    ///
    /// # Errors
    ///
    /// `NotFound`, `DisabledCode`, or `ExpiredCode`.
    pub fn code_info(&self, code_id: i64) -> EngineResult<CodeInfo> {
        let code = self.store.find_by_id(code_id)?;
        require_valid(&code)?;
        Ok(CodeInfo {
            used_accounts: code.accounts.len() as u32,
            code: code.code,
            expires_at: code.expires_at,
            max_accounts: code.max_accounts,
            status: code.status,
        })
    }
}

fn require_valid(code: &ActivationCode) -> EngineResult<()> {
    match code.state() {
        CodeState::Disabled => Err(EngineError::DisabledCode),
        CodeState::Expired => Err(EngineError::ExpiredCode),
        CodeState::Valid => Ok(()),
    }
}
