//! HTTP API for the codegate activation service.
//!
//! Route map (admin routes require an admin bearer token, app routes a
//! code-scoped one):
//!
//! - `POST /api/login` — admin login, returns an admin token
//! - `POST /api/activation-codes` — create a code (admin)
//! - `GET  /api/activation-codes` — paged listing (admin)
//! - `GET  /api/activation-codes/{id}` — one code with accounts (admin)
//! - `PUT  /api/activation-codes/{id}/status` — enable/disable (admin)
//! - `POST /api/app/activate` — redeem a code string for a scoped token
//! - `GET  /api/app/account` — accounts under the token's code (app)
//! - `POST /api/app/account` — register an account (app)
//! - `GET  /api/app/code-info` — code summary (app)

mod auth;
mod error;
mod handlers;

pub use auth::{AdminIdentity, CodeIdentity};
pub use error::ApiError;
pub use handlers::{
    ActivateRequest, ActivateResponse, CreateAccountRequest, CreateCodeRequest, ListQuery,
    LoginRequest, LoginResponse, UpdateStatusRequest,
};

use axum::routing::{get, post, put};
use axum::Router;
use codegate_engine::Engine;
use codegate_token::TokenService;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub tokens: TokenService,
}

/// Builds the API router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(handlers::login))
        .route(
            "/api/activation-codes",
            post(handlers::create_code).get(handlers::list_codes),
        )
        .route("/api/activation-codes/{id}", get(handlers::get_code))
        .route(
            "/api/activation-codes/{id}/status",
            put(handlers::update_status),
        )
        .route("/api/app/activate", post(handlers::activate))
        .route(
            "/api/app/account",
            get(handlers::get_accounts).post(handlers::create_account),
        )
        .route("/api/app/code-info", get(handlers::code_info))
        .with_state(state)
}
