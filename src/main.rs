//! Boost Wallets service
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌───────────────┐    ┌──────────────┐
//! │  Config  │───▶│  Store   │───▶│ WalletService │───▶│ HTTP Gateway │
//! │  (YAML)  │    │(PG / RAM)│    │(engine + FSM) │    │   (axum)     │
//! └──────────┘    └──────────┘    └───────────────┘    └──────────────┘
//! ```
//!
//! Usage: `boost_wallets [--env|-e <name>] [--port <n>]`

use std::sync::Arc;

use boost_wallets::config::AppConfig;
use boost_wallets::db::Database;
use boost_wallets::gateway::{self, state::AppState};
use boost_wallets::{InMemoryStore, PgStore, WalletService, WalletStore};

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
    let app_config = AppConfig::load(&env)?;
    let _log_guard = boost_wallets::logging::init_logging(&app_config);

    tracing::info!(
        "Starting Boost Wallets ({}) in {} mode",
        env!("GIT_HASH"),
        env
    );

    let (store, pg_db): (Arc<dyn WalletStore>, Option<Arc<Database>>) =
        match app_config.postgres_url.as_deref() {
            Some(url) => {
                let db = Database::connect(url).await?;
                let pg_store = PgStore::new(db.pool().clone());
                pg_store.init_schema().await?;
                let store: Arc<dyn WalletStore> = Arc::new(pg_store);
                (store, Some(Arc::new(db)))
            }
            None => {
                tracing::warn!("No postgres_url configured, using in-memory store");
                let store: Arc<dyn WalletStore> = Arc::new(InMemoryStore::new());
                (store, None)
            }
        };

    let service = Arc::new(WalletService::from_config(store, &app_config.settlement));
    tracing::info!(
        store = service.store_name(),
        denied_is_terminal = app_config.settlement.denied_is_terminal,
        "Wallet service ready"
    );

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    let state = Arc::new(AppState::new(service, pg_db));
    gateway::run_server(&app_config.gateway.host, port, state).await
}
