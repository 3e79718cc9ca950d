//! Request handlers and their wire DTOs.

use crate::auth::{AdminIdentity, CodeIdentity};
use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use codegate_engine::CodeInfo;
use codegate_types::{Account, AccountData, ActivationCode, CodeStatus, PagedCodes};
use serde::{Deserialize, Serialize};

// ── Admin auth ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = state.engine.login(&req.username, &req.password)?;
    Ok(Json(LoginResponse { token }))
}

// ── Admin code management ────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCodeRequest {
    /// Validity in days from now.
    pub duration: u32,
    pub max_accounts: u32,
}

pub async fn create_code(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Json(req): Json<CreateCodeRequest>,
) -> Result<Json<ActivationCode>, ApiError> {
    let code = state.engine.create_code(req.duration, req.max_accounts)?;
    Ok(Json(code))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

pub async fn list_codes(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Query(query): Query<ListQuery>,
) -> Result<Json<PagedCodes>, ApiError> {
    let paged = state
        .engine
        .list_codes(query.page.unwrap_or(1), query.page_size.unwrap_or(10))?;
    Ok(Json(paged))
}

pub async fn get_code(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i64>,
) -> Result<Json<ActivationCode>, ApiError> {
    Ok(Json(state.engine.get_code(id)?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = CodeStatus::parse(&req.status)
        .ok_or_else(|| ApiError::bad_request("status must be 'enabled' or 'disabled'"))?;
    state.engine.update_status(id, status)?;
    Ok(Json(serde_json::json!({ "message": "status updated" })))
}

// ── App routes ───────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivateRequest {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivateResponse {
    pub token: String,
    /// The code's own expiry, RFC 3339. The token's expiry is embedded in
    /// the token itself and is independent of this.
    pub expires_at: String,
}

pub async fn activate(
    State(state): State<AppState>,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>, ApiError> {
    let redemption = state.engine.redeem(&req.code)?;
    Ok(Json(ActivateResponse {
        token: redemption.token,
        expires_at: redemption.code_expires_at.to_rfc3339(),
    }))
}

pub async fn get_accounts(
    State(state): State<AppState>,
    CodeIdentity(code_id): CodeIdentity,
) -> Result<Json<serde_json::Value>, ApiError> {
    let accounts: Vec<Account> = state.engine.accounts_for_code(code_id)?;
    Ok(Json(serde_json::json!({ "accounts": accounts })))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub email: String,
    pub email_password: String,
    pub service_password: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn create_account(
    State(state): State<AppState>,
    CodeIdentity(code_id): CodeIdentity,
    Json(req): Json<CreateAccountRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.email.is_empty() {
        return Err(ApiError::bad_request("email must not be empty"));
    }
    let data = AccountData {
        email: req.email,
        email_password: req.email_password,
        service_password: req.service_password,
        access_token: req.access_token,
        refresh_token: req.refresh_token,
    };
    let account = state.engine.register_account(code_id, data)?;
    Ok(Json(serde_json::json!({
        "message": "account registered",
        "account": account,
    })))
}

pub async fn code_info(
    State(state): State<AppState>,
    CodeIdentity(code_id): CodeIdentity,
) -> Result<Json<CodeInfo>, ApiError> {
    Ok(Json(state.engine.code_info(code_id)?))
}
