//! Transfer persistence port and its PostgreSQL implementation

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;

use super::models::{NewTransfer, Transfer};
use crate::db::PgTx;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait TransferStore<Tx: Send + 'static>: Send + Sync {
    /// Transfers sent by `origin`, oldest first.
    async fn fetch_by_origin(&self, tx: &mut Tx, origin: i64) -> AppResult<Vec<Transfer>>;

    async fn create(&self, tx: &mut Tx, transfer: NewTransfer) -> AppResult<Transfer>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PgTransferStore;

fn transfer_from_row(r: &PgRow) -> Result<Transfer, sqlx::Error> {
    Ok(Transfer {
        id: r.try_get("id")?,
        origin: r.try_get("account_origin_id")?,
        destination: r.try_get("account_destination_id")?,
        amount: r.try_get("amount")?,
        created_at: r.try_get("created_at")?,
    })
}

#[async_trait]
impl TransferStore<PgTx> for PgTransferStore {
    async fn fetch_by_origin(&self, tx: &mut PgTx, origin: i64) -> AppResult<Vec<Transfer>> {
        let rows = sqlx::query(
            r#"SELECT id, account_origin_id, account_destination_id, amount, created_at
               FROM transfer WHERE account_origin_id = $1 ORDER BY id"#,
        )
        .bind(origin)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::select_stmt("unable to fetch transfers", e))?;

        rows.iter()
            .map(transfer_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::select_stmt("unable to read transfer row", e))
    }

    async fn create(&self, tx: &mut PgTx, transfer: NewTransfer) -> AppResult<Transfer> {
        let row = sqlx::query(
            r#"INSERT INTO transfer (account_origin_id, account_destination_id, amount, created_at)
               VALUES ($1, $2, $3, $4)
               RETURNING id, account_origin_id, account_destination_id, amount, created_at"#,
        )
        .bind(transfer.origin)
        .bind(transfer.destination)
        .bind(transfer.amount)
        .bind(transfer.created_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::insert_stmt("unable to insert transfer", e))?;

        transfer_from_row(&row).map_err(|e| AppError::insert_stmt("unable to read transfer row", e))
    }
}
