//! Codegate activation service.
//!
//! Issues time-limited activation codes, redeems them for scoped tokens, and
//! stores account credentials under each code's quota.
//!
//! Usage:
//!   codegate-server --port 8080 --database codegate.db
//!
//! Signing secrets come from `CODEGATE_ADMIN_SECRET` / `CODEGATE_APP_SECRET`;
//! the bootstrap admin from `CODEGATE_ADMIN_USER` / `CODEGATE_ADMIN_PASSWORD`.

use anyhow::{Context, Result};
use clap::Parser;
use codegate_engine::Engine;
use codegate_server::{build_router, AppState};
use codegate_store::Store;
use codegate_token::{TokenKeys, TokenService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "codegate-server")]
#[command(about = "Activation-code service for pooled account access")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Path to the SQLite database file
    #[arg(short, long, default_value = "codegate.db")]
    database: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => {
            warn!("{key} not set, using built-in default");
            default.to_string()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("codegate server starting...");

    let admin_secret = env_or("CODEGATE_ADMIN_SECRET", "admin-secret-key");
    let app_secret = env_or("CODEGATE_APP_SECRET", "app-secret-key");
    let admin_user = env_or("CODEGATE_ADMIN_USER", "admin");
    let admin_password = env_or("CODEGATE_ADMIN_PASSWORD", "admin123");

    let store = Arc::new(Store::open(&args.database).context("failed to open database")?);
    let tokens = TokenService::new(TokenKeys::new(admin_secret, app_secret));
    let engine = Engine::new(store, tokens.clone());

    engine
        .ensure_default_admin(&admin_user, &admin_password)
        .context("failed to create default admin")?;

    let app = build_router(AppState { engine, tokens });

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {addr}");
    axum::serve(listener, app).await.context("server failed")?;

    Ok(())
}
