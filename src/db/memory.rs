//! In-process storage backend.
//!
//! One transaction runs at a time: `begin` takes an owned lock on the state and
//! stages a copy, `commit` writes the copy back, and dropping or rolling back
//! the handle discards it. This gives serializable isolation, which is what the
//! row locks provide for the balances on PostgreSQL.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::tx::Transactioner;
use crate::account::models::{Account, NewAccount};
use crate::account::repository::AccountStore;
use crate::error::{AppError, AppResult};
use crate::money::Currency;
use crate::transfer::models::{NewTransfer, Transfer};
use crate::transfer::repository::TransferStore;

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    accounts: BTreeMap<i64, Account>,
    transfers: Vec<Transfer>,
    last_account_id: i64,
    last_transfer_id: i64,
}

impl MemoryState {
    pub fn account(&self, id: i64) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn balance(&self, id: i64) -> Option<Currency> {
        self.accounts.get(&id).map(|a| a.balance)
    }
}

pub struct MemoryTx {
    committed: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl Transactioner<MemoryTx> for MemoryDb {
    async fn begin(&self) -> AppResult<MemoryTx> {
        let committed = self.state.clone().lock_owned().await;
        let staged = committed.clone();
        Ok(MemoryTx { committed, staged })
    }

    async fn commit(&self, tx: MemoryTx) -> AppResult<()> {
        let MemoryTx {
            mut committed,
            staged,
        } = tx;
        *committed = staged;
        Ok(())
    }

    async fn rollback(&self, tx: MemoryTx) -> AppResult<()> {
        drop(tx);
        Ok(())
    }
}

#[async_trait]
impl AccountStore<MemoryTx> for MemoryDb {
    async fn fetch_all(&self, tx: &mut MemoryTx) -> AppResult<Vec<Account>> {
        Ok(tx.staged.accounts.values().cloned().collect())
    }

    async fn create(&self, tx: &mut MemoryTx, account: NewAccount) -> AppResult<Account> {
        let state = &mut tx.staged;
        if state.accounts.values().any(|a| a.cpf == account.cpf) {
            return Err(AppError::already_in_use("cpf", &account.cpf));
        }
        if account.balance.is_negative() {
            return Err(AppError::insert_stmt(
                "unable to insert account",
                "balance violates check constraint",
            ));
        }

        state.last_account_id += 1;
        let stored = Account {
            id: state.last_account_id,
            name: account.name,
            cpf: account.cpf,
            secret: account.secret,
            balance: account.balance,
            created_at: account.created_at,
        };
        state.accounts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_balance(&self, tx: &mut MemoryTx, id: i64) -> AppResult<Currency> {
        tx.staged
            .balance(id)
            .ok_or_else(|| AppError::empty_result("no result getting the account balance"))
    }

    async fn lock_balance(&self, tx: &mut MemoryTx, id: i64) -> AppResult<Currency> {
        // The whole state is already held by this transaction.
        tx.staged
            .balance(id)
            .ok_or_else(|| AppError::empty_result("no result locking the account balance"))
    }

    async fn find_by_cpf(&self, tx: &mut MemoryTx, cpf: &str) -> AppResult<Account> {
        tx.staged
            .accounts
            .values()
            .find(|a| a.cpf == cpf)
            .cloned()
            .ok_or_else(|| AppError::empty_result("no result finding account by cpf"))
    }

    async fn update_balance(&self, tx: &mut MemoryTx, id: i64, balance: Currency) -> AppResult<()> {
        let account = tx.staged.accounts.get_mut(&id).ok_or_else(|| {
            AppError::no_row_affected("no rows affected by the update balance stmt")
        })?;
        if balance.is_negative() {
            return Err(AppError::update_stmt(
                "unable to update the account balance",
                "balance violates check constraint",
            ));
        }
        account.balance = balance;
        Ok(())
    }

    async fn exists(&self, tx: &mut MemoryTx, id: i64) -> AppResult<bool> {
        Ok(tx.staged.accounts.contains_key(&id))
    }
}

#[async_trait]
impl TransferStore<MemoryTx> for MemoryDb {
    async fn fetch_by_origin(&self, tx: &mut MemoryTx, origin: i64) -> AppResult<Vec<Transfer>> {
        Ok(tx
            .staged
            .transfers
            .iter()
            .filter(|t| t.origin == origin)
            .cloned()
            .collect())
    }

    async fn create(&self, tx: &mut MemoryTx, transfer: NewTransfer) -> AppResult<Transfer> {
        let state = &mut tx.staged;
        let known = state.accounts.contains_key(&transfer.origin)
            && state.accounts.contains_key(&transfer.destination);
        if !known || !transfer.amount.is_positive() || transfer.origin == transfer.destination {
            return Err(AppError::insert_stmt(
                "unable to insert transfer",
                "transfer violates table constraints",
            ));
        }

        state.last_transfer_id += 1;
        let stored = Transfer {
            id: state.last_transfer_id,
            origin: transfer.origin,
            destination: transfer.destination,
            amount: transfer.amount,
            created_at: transfer.created_at,
        };
        state.transfers.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::Utc;

    fn new_account(cpf: &str, balance: i64) -> NewAccount {
        NewAccount {
            name: "Jane Doe".to_string(),
            cpf: cpf.to_string(),
            secret: "hash".to_string(),
            balance: Currency::from_minor(balance),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_staged_writes() {
        let db = MemoryDb::new();
        let mut tx = db.begin().await.unwrap();
        let account = AccountStore::create(&db, &mut tx, new_account("52998224725", 100))
            .await
            .unwrap();
        assert_eq!(account.id, 1);
        db.commit(tx).await.unwrap();

        let state = db.snapshot().await;
        assert_eq!(state.balance(1), Some(Currency::from_minor(100)));
    }

    #[tokio::test]
    async fn test_rollback_discards_staged_writes() {
        let db = MemoryDb::new();
        let mut tx = db.begin().await.unwrap();
        AccountStore::create(&db, &mut tx, new_account("52998224725", 100))
            .await
            .unwrap();
        db.rollback(tx).await.unwrap();

        assert_eq!(db.snapshot().await.accounts().count(), 0);
    }

    #[tokio::test]
    async fn test_store_error_kinds() {
        let db = MemoryDb::new();
        let mut tx = db.begin().await.unwrap();
        AccountStore::create(&db, &mut tx, new_account("52998224725", 100))
            .await
            .unwrap();

        let dup = AccountStore::create(&db, &mut tx, new_account("52998224725", 0))
            .await
            .unwrap_err();
        assert_eq!(dup.kind(), ErrorKind::Conflict);

        let missing = db.get_balance(&mut tx, 42).await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::EmptyResult);

        let no_row = db
            .update_balance(&mut tx, 42, Currency::ZERO)
            .await
            .unwrap_err();
        assert_eq!(no_row.kind(), ErrorKind::NoRowAffected);

        assert!(db.exists(&mut tx, 1).await.unwrap());
        assert!(!db.exists(&mut tx, 2).await.unwrap());
    }
}
