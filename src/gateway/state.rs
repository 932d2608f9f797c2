use std::sync::Arc;

use crate::db::Database;
use crate::service::WalletService;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WalletService>,
    /// PostgreSQL pool handle for health checks (None on the in-memory store)
    pub pg_db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(service: Arc<WalletService>, pg_db: Option<Arc<Database>>) -> Self {
        Self { service, pg_db }
    }
}
