//! Account persistence port and its PostgreSQL implementation

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;

use super::models::{Account, NewAccount};
use crate::db::PgTx;
use crate::error::{AppError, AppResult};
use crate::money::Currency;

/// Account storage operations, all executed inside the caller's transaction.
#[async_trait]
pub trait AccountStore<Tx: Send + 'static>: Send + Sync {
    async fn fetch_all(&self, tx: &mut Tx) -> AppResult<Vec<Account>>;

    /// Insert and return the stored row. A duplicate cpf is a conflict.
    async fn create(&self, tx: &mut Tx, account: NewAccount) -> AppResult<Account>;

    /// Plain read. Empty-result if the account does not exist.
    async fn get_balance(&self, tx: &mut Tx, id: i64) -> AppResult<Currency>;

    /// Read that also locks the row until the transaction ends.
    async fn lock_balance(&self, tx: &mut Tx, id: i64) -> AppResult<Currency>;

    async fn find_by_cpf(&self, tx: &mut Tx, cpf: &str) -> AppResult<Account>;

    /// No-row-affected if the account does not exist.
    async fn update_balance(&self, tx: &mut Tx, id: i64, balance: Currency) -> AppResult<()>;

    async fn exists(&self, tx: &mut Tx, id: i64) -> AppResult<bool>;
}

// ============================================================================
// PostgreSQL
// ============================================================================

const ACCOUNT_COLUMNS: &str = "id, name, cpf, secret, balance, created_at";

#[derive(Debug, Clone, Copy, Default)]
pub struct PgAccountStore;

fn account_from_row(r: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: r.try_get("id")?,
        name: r.try_get("name")?,
        cpf: r.try_get("cpf")?,
        secret: r.try_get("secret")?,
        balance: r.try_get("balance")?,
        created_at: r.try_get("created_at")?,
    })
}

#[async_trait]
impl AccountStore<PgTx> for PgAccountStore {
    async fn fetch_all(&self, tx: &mut PgTx) -> AppResult<Vec<Account>> {
        let rows = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM account ORDER BY id"))
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| AppError::select_stmt("unable to fetch accounts", e))?;

        rows.iter()
            .map(account_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::select_stmt("unable to read account row", e))
    }

    async fn create(&self, tx: &mut PgTx, account: NewAccount) -> AppResult<Account> {
        let row = sqlx::query(&format!(
            "INSERT INTO account (name, cpf, secret, balance, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&account.name)
        .bind(&account.cpf)
        .bind(&account.secret)
        .bind(account.balance)
        .bind(account.created_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            let duplicated = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicated {
                AppError::already_in_use("cpf", &account.cpf)
            } else {
                AppError::insert_stmt("unable to insert account", e)
            }
        })?;

        account_from_row(&row).map_err(|e| AppError::insert_stmt("unable to read account row", e))
    }

    async fn get_balance(&self, tx: &mut PgTx, id: i64) -> AppResult<Currency> {
        let row = sqlx::query("SELECT balance FROM account WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::select_stmt("unable to get the account balance", e))?
            .ok_or_else(|| AppError::empty_result("no result getting the account balance"))?;

        row.try_get("balance")
            .map_err(|e| AppError::select_stmt("unable to read the account balance", e))
    }

    async fn lock_balance(&self, tx: &mut PgTx, id: i64) -> AppResult<Currency> {
        let row = sqlx::query("SELECT balance FROM account WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::select_stmt("unable to lock the account balance", e))?
            .ok_or_else(|| AppError::empty_result("no result locking the account balance"))?;

        row.try_get("balance")
            .map_err(|e| AppError::select_stmt("unable to read the account balance", e))
    }

    async fn find_by_cpf(&self, tx: &mut PgTx, cpf: &str) -> AppResult<Account> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE cpf = $1"))
            .bind(cpf)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| AppError::select_stmt("unable to find account by cpf", e))?
            .ok_or_else(|| AppError::empty_result("no result finding account by cpf"))?;

        account_from_row(&row).map_err(|e| AppError::select_stmt("unable to read account row", e))
    }

    async fn update_balance(&self, tx: &mut PgTx, id: i64, balance: Currency) -> AppResult<()> {
        let result = sqlx::query("UPDATE account SET balance = $1 WHERE id = $2")
            .bind(balance)
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::update_stmt("unable to update the account balance", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::no_row_affected(
                "no rows affected by the update balance stmt",
            ));
        }
        Ok(())
    }

    async fn exists(&self, tx: &mut PgTx, id: i64) -> AppResult<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM account WHERE id = $1) AS found")
            .bind(id)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| AppError::select_stmt("unable to check account existence", e))?;

        row.try_get("found")
            .map_err(|e| AppError::select_stmt("unable to read account existence", e))
    }
}
