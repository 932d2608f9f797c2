//! HTTP Gateway
//!
//! JSON over axum. Every response uses the `{code, msg, data}` envelope.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | POST | /wallets | create wallet |
//! | GET | /wallets/{wallet_id} | get wallet |
//! | GET | /wallets/users/{user_id} | wallets of a user |
//! | PATCH | /wallets/funds/{wallet_id} | adjust balance |
//! | POST | /wallets/transfers | request transfer |
//! | GET | /wallets/transfers/reconciliation | transfers needing reconciliation |
//! | GET | /wallets/transfers/{transfer_id} | get transfer |
//! | PATCH | /wallets/transfers/{transfer_id} | admin status update |
//! | GET | /health | health check |

pub mod handlers;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use state::AppState;

/// Build the router with all wallet routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/wallets", post(handlers::create_wallet))
        .route("/wallets/{wallet_id}", get(handlers::get_wallet))
        .route("/wallets/users/{user_id}", get(handlers::get_user_wallets))
        .route("/wallets/funds/{wallet_id}", patch(handlers::adjust_balance))
        .route("/wallets/transfers", post(handlers::create_transfer))
        .route(
            "/wallets/transfers/reconciliation",
            get(handlers::get_reconciliation_backlog),
        )
        .route(
            "/wallets/transfers/{transfer_id}",
            get(handlers::get_transfer).patch(handlers::update_transfer_status),
        )
        .with_state(state)
}

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("Gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
