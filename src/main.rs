//! STN Accounts - HTTP service entry point
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌────────────┐    ┌──────────┐
//! │  Config  │───▶│ Storage  │───▶│  Services  │───▶│ Gateway  │
//! │  (YAML)  │    │(PG / mem)│    │(acct, xfer)│    │  (axum)  │
//! └──────────┘    └──────────┘    └────────────┘    └──────────┘
//! ```
//!
//! Usage: `stn_accounts [--env dev] [--port 3000]`

use std::sync::Arc;

use anyhow::Context;

use stn_accounts::config::{AppConfig, StorageBackend};
use stn_accounts::db::{Database, MemoryDb};
use stn_accounts::gateway::{self, state::AppState};
use stn_accounts::user_auth::{Argon2Hasher, TokenService};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config =
        AppConfig::load(&env).with_context(|| format!("loading configuration for env '{}'", env))?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = stn_accounts::logging::init_logging(&app_config);

    tracing::info!(
        env = %env,
        backend = ?app_config.storage.backend,
        version = env!("GIT_HASH"),
        "Starting STN Accounts"
    );

    let tokens = Arc::new(TokenService::new(
        &app_config.auth.jwt_secret,
        chrono::Duration::minutes(app_config.auth.jwt_exp_minutes),
    ));
    let hasher = Arc::new(Argon2Hasher::default());
    let tx_timeout = app_config.storage.tx_timeout();

    let state = match app_config.storage.backend {
        StorageBackend::Postgres => {
            let url = app_config
                .storage
                .database_url
                .as_deref()
                .context("database url is not configured")?;
            let db = Database::connect(url, app_config.storage.max_connections)
                .await
                .context("connecting to PostgreSQL")?;
            db.init_schema().await.context("initializing schema")?;
            AppState::postgres(db, tokens, hasher, tx_timeout)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on exit");
            AppState::memory(MemoryDb::new(), tokens, hasher, tx_timeout)
        }
    };

    gateway::run_server(&app_config.gateway, Arc::new(state))
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}
