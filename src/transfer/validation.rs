//! Transfer creation rules
//!
//! Checks run in a fixed order and the first failure is returned:
//! 1. amount > 0
//! 2. destination present
//! 3. destination != origin
//! 4. origin exists
//! 5. origin balance covers the amount
//! 6. destination exists

use std::sync::Arc;

use super::models::TransferCreation;
use crate::account::repository::AccountStore;
use crate::error::{AppError, AppResult, ErrorKind};
use crate::money::Currency;

pub fn insufficient_funds(amount: Currency) -> AppError {
    AppError::validation(format!(
        "the origin must have a balance greater than or equal to {amount}"
    ))
}

/// Request that passed [`TransferValidator::validate_creation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub origin: i64,
    pub destination: i64,
    pub amount: Currency,
}

pub struct TransferValidator<Tx: Send + 'static> {
    accounts: Arc<dyn AccountStore<Tx>>,
}

impl<Tx: Send + 'static> Clone for TransferValidator<Tx> {
    fn clone(&self) -> Self {
        Self {
            accounts: self.accounts.clone(),
        }
    }
}

impl<Tx: Send + 'static> TransferValidator<Tx> {
    pub fn new(accounts: Arc<dyn AccountStore<Tx>>) -> Self {
        Self { accounts }
    }

    /// Validate a transfer from `origin` inside the caller's transaction.
    pub async fn validate_creation(
        &self,
        tx: &mut Tx,
        origin: i64,
        req: &TransferCreation,
    ) -> AppResult<ValidatedTransfer> {
        if req.amount.is_nan() || req.amount <= 0.0 {
            return Err(AppError::greater_than("amount", 0));
        }
        let amount =
            Currency::try_from_decimal(req.amount).ok_or_else(|| AppError::out_of_range("amount"))?;
        if !amount.is_positive() {
            return Err(AppError::greater_than("amount", 0));
        }
        if req.account_destination_id <= 0 {
            return Err(AppError::required("destination_id"));
        }
        let destination = req.account_destination_id;
        if destination == origin {
            return Err(AppError::same_field("origin id", "destination id"));
        }

        let origin_balance = self
            .accounts
            .get_balance(tx, origin)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::EmptyResult => AppError::not_found("origin", origin),
                _ => e,
            })?;

        match origin_balance.checked_sub(amount) {
            Some(rest) if !rest.is_negative() => {}
            _ => return Err(insufficient_funds(amount)),
        }

        if !self.accounts.exists(tx, destination).await? {
            return Err(AppError::not_found("destination", destination));
        }

        Ok(ValidatedTransfer {
            origin,
            destination,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::models::NewAccount;
    use crate::db::tx::Transactioner;
    use crate::db::{MemoryDb, MemoryTx};
    use chrono::Utc;

    async fn seeded(balances: &[i64]) -> (MemoryDb, MemoryTx) {
        let db = MemoryDb::new();
        let mut tx = db.begin().await.unwrap();
        for (i, balance) in balances.iter().enumerate() {
            AccountStore::create(
                &db,
                &mut tx,
                NewAccount {
                    name: format!("Account {i}"),
                    cpf: format!("{:011}", i),
                    secret: "hash".to_string(),
                    balance: Currency::from_minor(*balance),
                    created_at: Utc::now(),
                },
            )
            .await
            .unwrap();
        }
        (db, tx)
    }

    fn request(destination: i64, amount: f64) -> TransferCreation {
        TransferCreation {
            account_destination_id: destination,
            amount,
        }
    }

    #[tokio::test]
    async fn test_valid_transfer() {
        let (db, mut tx) = seeded(&[100_000, 0]).await;
        let validator = TransferValidator::<MemoryTx>::new(Arc::new(db));

        let ok = validator
            .validate_creation(&mut tx, 1, &request(2, 5.0))
            .await
            .unwrap();
        assert_eq!(
            ok,
            ValidatedTransfer {
                origin: 1,
                destination: 2,
                amount: Currency::from_minor(500),
            }
        );
    }

    #[tokio::test]
    async fn test_rule_order() {
        let (db, mut tx) = seeded(&[1_000, 0]).await;
        let validator = TransferValidator::<MemoryTx>::new(Arc::new(db));

        let cases = [
            // amount wins over a missing destination
            (1, request(0, 0.0), ErrorKind::Validation, "field 'amount' must be greater than 0".to_string()),
            (1, request(0, -3.0), ErrorKind::Validation, "field 'amount' must be greater than 0".to_string()),
            // sub-cent amounts truncate to zero
            (1, request(2, 0.004), ErrorKind::Validation, "field 'amount' must be greater than 0".to_string()),
            (1, request(2, 1e17), ErrorKind::Validation, "field 'amount' is out of range".to_string()),
            (1, request(0, 1.0), ErrorKind::Validation, "field 'destination_id' is required".to_string()),
            (5, request(5, 10.0), ErrorKind::Conflict, "fields 'origin id' and 'destination id' can't be the same".to_string()),
            (77, request(2, 1.0), ErrorKind::NotFound, "record with 'origin' equals '77' was not found".to_string()),
            (1, request(9999, 10.01), ErrorKind::Validation, "the origin must have a balance greater than or equal to 10.01".to_string()),
            (1, request(9999, 10.0), ErrorKind::NotFound, "record with 'destination' equals '9999' was not found".to_string()),
        ];

        for (origin, req, kind, message) in cases {
            let err = validator
                .validate_creation(&mut tx, origin, &req)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), kind, "{message}");
            assert_eq!(err.message(), message);
        }
    }
}
