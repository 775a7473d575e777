//! Transfer Orchestrator
//!
//! Executes a transfer as a single unit of work:
//!
//! ```text
//! validate ─► lock rows (ascending id) ─► re-check funds
//!          ─► debit origin ─► credit destination ─► insert transfer ─► commit
//! ```
//!
//! Any failure rolls back every write made so far. Rows are locked in
//! ascending account id order so that opposite transfers between the same
//! pair of accounts wait on each other instead of deadlocking.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::models::{NewTransfer, Transfer, TransferCreation, TransferView};
use super::repository::TransferStore;
use super::service::TransferService;
use super::validation::{TransferValidator, ValidatedTransfer, insufficient_funds};
use crate::account::repository::AccountStore;
use crate::db::TxCoordinator;
use crate::error::{AppError, AppResult, ErrorKind};
use crate::money::Currency;

pub struct TransferOrchestrator<Tx: Send + 'static> {
    coordinator: TxCoordinator<Tx>,
    accounts: Arc<dyn AccountStore<Tx>>,
    transfers: Arc<dyn TransferStore<Tx>>,
    validator: TransferValidator<Tx>,
}

impl<Tx: Send + 'static> Clone for TransferOrchestrator<Tx> {
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            accounts: self.accounts.clone(),
            transfers: self.transfers.clone(),
            validator: self.validator.clone(),
        }
    }
}

impl<Tx: Send + 'static> TransferOrchestrator<Tx> {
    pub fn new(
        coordinator: TxCoordinator<Tx>,
        accounts: Arc<dyn AccountStore<Tx>>,
        transfers: Arc<dyn TransferStore<Tx>>,
    ) -> Self {
        Self {
            coordinator,
            validator: TransferValidator::new(accounts.clone()),
            accounts,
            transfers,
        }
    }

    /// Create a transfer, joining `scope` when given.
    pub async fn create_in(
        &self,
        scope: Option<&mut Tx>,
        origin: i64,
        req: TransferCreation,
    ) -> AppResult<Transfer> {
        let this = self.clone();
        self.coordinator
            .run_in_transaction(scope, move |tx| {
                Box::pin(async move { this.execute(tx, origin, &req).await })
            })
            .await
    }

    async fn execute(&self, tx: &mut Tx, origin: i64, req: &TransferCreation) -> AppResult<Transfer> {
        let checked = self.validator.validate_creation(tx, origin, req).await?;
        let ValidatedTransfer {
            origin,
            destination,
            amount,
        } = checked;

        let (origin_balance, destination_balance) = self.lock_pair(tx, origin, destination).await?;

        // The balance may have moved between validation and locking.
        let new_origin = origin_balance
            .checked_sub(amount)
            .filter(|b| !b.is_negative())
            .ok_or_else(|| insufficient_funds(amount))?;
        let new_destination = destination_balance
            .checked_add(amount)
            .ok_or_else(|| AppError::internal_msg("destination balance overflow"))?;

        self.accounts.update_balance(tx, origin, new_origin).await?;
        self.accounts
            .update_balance(tx, destination, new_destination)
            .await?;

        self.transfers
            .create(
                tx,
                NewTransfer {
                    origin,
                    destination,
                    amount,
                    created_at: Utc::now(),
                },
            )
            .await
    }

    /// Lock both rows in ascending id order; returns (origin, destination).
    async fn lock_pair(
        &self,
        tx: &mut Tx,
        origin: i64,
        destination: i64,
    ) -> AppResult<(Currency, Currency)> {
        if origin < destination {
            let o = self.lock(tx, origin, "origin").await?;
            let d = self.lock(tx, destination, "destination").await?;
            Ok((o, d))
        } else {
            let d = self.lock(tx, destination, "destination").await?;
            let o = self.lock(tx, origin, "origin").await?;
            Ok((o, d))
        }
    }

    async fn lock(&self, tx: &mut Tx, id: i64, role: &str) -> AppResult<Currency> {
        self.accounts
            .lock_balance(tx, id)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::EmptyResult => AppError::not_found(role, id),
                _ => e,
            })
    }
}

#[async_trait]
impl<Tx: Send + 'static> TransferService for TransferOrchestrator<Tx> {
    async fn fetch(&self, origin: i64) -> AppResult<Vec<TransferView>> {
        let transfers = self.transfers.clone();
        let rows = self
            .coordinator
            .run_in_transaction(None, move |tx| {
                Box::pin(async move { transfers.fetch_by_origin(tx, origin).await })
            })
            .await?;
        Ok(rows.iter().map(TransferView::from).collect())
    }

    async fn create(&self, origin: i64, req: TransferCreation) -> AppResult<TransferView> {
        let destination = req.account_destination_id;
        match self.create_in(None, origin, req).await {
            Ok(transfer) => {
                tracing::info!(
                    transfer_id = transfer.id,
                    account_origin_id = origin,
                    account_destination_id = destination,
                    amount = %transfer.amount,
                    "transfer committed"
                );
                Ok(TransferView::from(&transfer))
            }
            Err(e) => {
                if e.kind().is_internal() {
                    tracing::error!(
                        account_origin_id = origin,
                        account_destination_id = destination,
                        code = %e.kind().code(),
                        error = ?e,
                        "transfer failed"
                    );
                } else {
                    tracing::debug!(
                        account_origin_id = origin,
                        account_destination_id = destination,
                        code = %e.kind().code(),
                        reason = %e,
                        "transfer rejected"
                    );
                }
                Err(e)
            }
        }
    }
}
