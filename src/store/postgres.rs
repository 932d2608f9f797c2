//! PostgreSQL Wallet Store
//!
//! `wallets_tb` and `transfers_tb`. Replaces are atomic CAS updates keyed on
//! `(id, version)`, so a concurrent writer can never be silently overwritten.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::core_types::UserId;
use crate::transfer::{TransferId, TransferRecord, TransferStatus};
use crate::wallet::{Wallet, WalletId};

use super::records::{TransferRow, WalletRow, to_db_int};
use super::{StoreError, WalletStore, decode_owned_wallets};

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS wallets_tb (
        wallet_id      TEXT PRIMARY KEY,
        user_id        BIGINT NOT NULL,
        wallet_type    TEXT NOT NULL,
        total_balance  NUMERIC(38, 8) NOT NULL DEFAULT 0,
        contents       TEXT NOT NULL,
        created_at     BIGINT NOT NULL,
        updated_at     BIGINT NOT NULL,
        version        BIGINT NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_wallets_user_id ON wallets_tb (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS transfers_tb (
        transfer_id       TEXT PRIMARY KEY,
        initiator_user    BIGINT NOT NULL,
        source_wallet_id  TEXT NOT NULL,
        target_wallet_id  TEXT NOT NULL,
        amount            NUMERIC(38, 8) NOT NULL,
        status            TEXT NOT NULL,
        submitted_at      BIGINT NOT NULL,
        updated_at        BIGINT NOT NULL,
        version           BIGINT NOT NULL DEFAULT 0,
        last_error        TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_transfers_status ON transfers_tb (status)",
];

const WALLET_COLUMNS: &str = "wallet_id, user_id, wallet_type, total_balance, contents, \
                              created_at, updated_at, version";

const TRANSFER_COLUMNS: &str = "transfer_id, initiator_user, source_wallet_id, target_wallet_id, \
                                amount, status, submitted_at, updated_at, version, last_error";

/// PostgreSQL-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Wallet store schema ready");
        Ok(())
    }

    async fn fetch_wallet_row(&self, id: &str) -> Result<Option<WalletRow>, StoreError> {
        let sql = format!("SELECT {} FROM wallets_tb WHERE wallet_id = $1", WALLET_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(wallet_row).transpose()
    }

    async fn fetch_transfer_row(&self, id: &str) -> Result<Option<TransferRow>, StoreError> {
        let sql = format!(
            "SELECT {} FROM transfers_tb WHERE transfer_id = $1",
            TRANSFER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(transfer_row).transpose()
    }
}

fn wallet_row(row: &PgRow) -> Result<WalletRow, StoreError> {
    Ok(WalletRow {
        wallet_id: row.try_get("wallet_id")?,
        user_id: row.try_get("user_id")?,
        wallet_type: row.try_get("wallet_type")?,
        total_balance: row.try_get("total_balance")?,
        contents: row.try_get("contents")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        version: row.try_get("version")?,
    })
}

fn transfer_row(row: &PgRow) -> Result<TransferRow, StoreError> {
    Ok(TransferRow {
        transfer_id: row.try_get("transfer_id")?,
        initiator_user: row.try_get("initiator_user")?,
        source_wallet_id: row.try_get("source_wallet_id")?,
        target_wallet_id: row.try_get("target_wallet_id")?,
        amount: row.try_get("amount")?,
        status: row.try_get("status")?,
        submitted_at: row.try_get("submitted_at")?,
        updated_at: row.try_get("updated_at")?,
        version: row.try_get("version")?,
        last_error: row.try_get("last_error")?,
    })
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl WalletStore for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn get_wallet(&self, id: WalletId) -> Result<Option<Wallet>, StoreError> {
        self.fetch_wallet_row(&id.to_string())
            .await?
            .map(WalletRow::into_wallet)
            .transpose()
    }

    async fn get_wallets_by_owner(&self, user_id: UserId) -> Result<Vec<Wallet>, StoreError> {
        let sql = format!(
            "SELECT {} FROM wallets_tb WHERE user_id = $1 ORDER BY created_at, wallet_id",
            WALLET_COLUMNS
        );
        let Ok(owner) = to_db_int("user_id", user_id) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        let rows = rows.iter().map(wallet_row).collect::<Result<Vec<_>, _>>()?;
        decode_owned_wallets(user_id, rows)
    }

    async fn create_wallet(&self, wallet: &Wallet) -> Result<Wallet, StoreError> {
        let row = WalletRow::from_wallet(wallet)?;
        let result = sqlx::query(
            r#"
            INSERT INTO wallets_tb
                (wallet_id, user_id, wallet_type, total_balance, contents, created_at, updated_at, version)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&row.wallet_id)
        .bind(row.user_id)
        .bind(&row.wallet_type)
        .bind(row.total_balance)
        .bind(&row.contents)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(row.version)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Duplicate {
                    entity: "wallet",
                    id: row.wallet_id,
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.fetch_wallet_row(&row.wallet_id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("wallet {} vanished after insert", row.wallet_id)))?
            .into_wallet()
    }

    async fn replace_wallet(&self, wallet: &Wallet) -> Result<Wallet, StoreError> {
        let row = WalletRow::from_wallet(wallet)?;
        let updated = sqlx::query(
            r#"
            UPDATE wallets_tb
            SET user_id = $1, wallet_type = $2, total_balance = $3, contents = $4,
                created_at = $5, updated_at = $6, version = version + 1
            WHERE wallet_id = $7 AND version = $8
            "#,
        )
        .bind(row.user_id)
        .bind(&row.wallet_type)
        .bind(row.total_balance)
        .bind(&row.contents)
        .bind(row.created_at)
        .bind(row.updated_at)
        .bind(&row.wallet_id)
        .bind(row.version)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::Conflict {
                entity: "wallet",
                id: row.wallet_id,
            });
        }

        self.fetch_wallet_row(&row.wallet_id)
            .await?
            .ok_or_else(|| StoreError::Conflict {
                entity: "wallet",
                id: row.wallet_id.clone(),
            })?
            .into_wallet()
    }

    async fn create_transfer(
        &self,
        transfer: &TransferRecord,
    ) -> Result<TransferRecord, StoreError> {
        let row = TransferRow::from_record(transfer)?;
        let result = sqlx::query(
            r#"
            INSERT INTO transfers_tb
                (transfer_id, initiator_user, source_wallet_id, target_wallet_id, amount,
                 status, submitted_at, updated_at, version, last_error)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&row.transfer_id)
        .bind(row.initiator_user)
        .bind(&row.source_wallet_id)
        .bind(&row.target_wallet_id)
        .bind(row.amount)
        .bind(&row.status)
        .bind(row.submitted_at)
        .bind(row.updated_at)
        .bind(row.version)
        .bind(&row.last_error)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Duplicate {
                    entity: "transfer",
                    id: row.transfer_id,
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.fetch_transfer_row(&row.transfer_id)
            .await?
            .ok_or_else(|| {
                StoreError::Corrupt(format!("transfer {} vanished after insert", row.transfer_id))
            })?
            .into_record()
    }

    async fn get_transfer(&self, id: TransferId) -> Result<Option<TransferRecord>, StoreError> {
        self.fetch_transfer_row(&id.to_string())
            .await?
            .map(TransferRow::into_record)
            .transpose()
    }

    async fn replace_transfer(
        &self,
        transfer: &TransferRecord,
    ) -> Result<TransferRecord, StoreError> {
        let row = TransferRow::from_record(transfer)?;
        let updated = sqlx::query(
            r#"
            UPDATE transfers_tb
            SET initiator_user = $1, source_wallet_id = $2, target_wallet_id = $3, amount = $4,
                status = $5, submitted_at = $6, updated_at = $7, last_error = $8,
                version = version + 1
            WHERE transfer_id = $9 AND version = $10
            "#,
        )
        .bind(row.initiator_user)
        .bind(&row.source_wallet_id)
        .bind(&row.target_wallet_id)
        .bind(row.amount)
        .bind(&row.status)
        .bind(row.submitted_at)
        .bind(row.updated_at)
        .bind(&row.last_error)
        .bind(&row.transfer_id)
        .bind(row.version)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::Conflict {
                entity: "transfer",
                id: row.transfer_id,
            });
        }

        self.fetch_transfer_row(&row.transfer_id)
            .await?
            .ok_or_else(|| StoreError::Conflict {
                entity: "transfer",
                id: row.transfer_id.clone(),
            })?
            .into_record()
    }

    async fn list_transfers_by_status(
        &self,
        status: TransferStatus,
    ) -> Result<Vec<TransferRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM transfers_tb WHERE status = $1 ORDER BY submitted_at, transfer_id",
            TRANSFER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| transfer_row(row)?.into_record())
            .collect()
    }
}
