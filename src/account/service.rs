//! Account operations: registration, login, balance and listing

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::models::{AccountCreation, AccountView, NewAccount};
use super::repository::AccountStore;
use super::validation::{validate_creation, validate_login};
use crate::db::TxCoordinator;
use crate::error::{AppError, AppResult, ErrorKind};
use crate::money::Currency;
use crate::user_auth::SecretHasher;

#[async_trait]
pub trait AccountService: Send + Sync {
    async fn fetch(&self) -> AppResult<Vec<AccountView>>;

    async fn create(&self, req: AccountCreation) -> AppResult<AccountView>;

    /// Check credentials; authentication error on unknown cpf or wrong secret.
    async fn login(&self, cpf: &str, secret: &str) -> AppResult<AccountView>;

    async fn get_balance(&self, id: i64) -> AppResult<Currency>;
}

pub struct AccountManager<Tx: Send + 'static> {
    coordinator: TxCoordinator<Tx>,
    accounts: Arc<dyn AccountStore<Tx>>,
    hasher: Arc<dyn SecretHasher>,
}

impl<Tx: Send + 'static> AccountManager<Tx> {
    pub fn new(
        coordinator: TxCoordinator<Tx>,
        accounts: Arc<dyn AccountStore<Tx>>,
        hasher: Arc<dyn SecretHasher>,
    ) -> Self {
        Self {
            coordinator,
            accounts,
            hasher,
        }
    }
}

#[async_trait]
impl<Tx: Send + 'static> AccountService for AccountManager<Tx> {
    async fn fetch(&self) -> AppResult<Vec<AccountView>> {
        let accounts = self.accounts.clone();
        let rows = self
            .coordinator
            .run_in_transaction(None, move |tx| {
                Box::pin(async move { accounts.fetch_all(tx).await })
            })
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "unable to fetch accounts"))?;

        Ok(rows.iter().map(AccountView::from).collect())
    }

    async fn create(&self, req: AccountCreation) -> AppResult<AccountView> {
        let valid = validate_creation(&req)?;
        // Hash before opening the scope; the row lock window stays short.
        let secret = self.hasher.hash(&valid.secret)?;

        let accounts = self.accounts.clone();
        let result = self
            .coordinator
            .run_in_transaction(None, move |tx| {
                Box::pin(async move {
                    match accounts.find_by_cpf(tx, valid.cpf.as_str()).await {
                        Ok(_) => return Err(AppError::already_in_use("cpf", &valid.cpf)),
                        Err(e) if e.kind() == ErrorKind::EmptyResult => {}
                        Err(e) => return Err(e),
                    }

                    accounts
                        .create(
                            tx,
                            NewAccount {
                                name: valid.name,
                                cpf: valid.cpf.into_inner(),
                                secret,
                                balance: valid.balance,
                                created_at: Utc::now(),
                            },
                        )
                        .await
                })
            })
            .await;

        match result {
            Ok(account) => {
                tracing::info!(account_id = account.id, "account created");
                Ok(AccountView::from(&account))
            }
            Err(e) => {
                tracing::info!(error = %e, cpf = %req.cpf, name = %req.name, "unable to create account");
                Err(e)
            }
        }
    }

    async fn login(&self, cpf: &str, secret: &str) -> AppResult<AccountView> {
        let cpf = validate_login(cpf, secret)?;

        let accounts = self.accounts.clone();
        let account = self
            .coordinator
            .run_in_transaction(None, move |tx| {
                Box::pin(async move { accounts.find_by_cpf(tx, cpf.as_str()).await })
            })
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::EmptyResult => {
                    AppError::authentication("account with the given cpf does not exist")
                }
                _ => e,
            })?;

        if !self.hasher.verify(secret, &account.secret)? {
            return Err(AppError::authentication(
                "the provided secret doesn't match the account's secret",
            ));
        }
        Ok(AccountView::from(&account))
    }

    async fn get_balance(&self, id: i64) -> AppResult<Currency> {
        let accounts = self.accounts.clone();
        self.coordinator
            .run_in_transaction(None, move |tx| {
                Box::pin(async move { accounts.get_balance(tx, id).await })
            })
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::EmptyResult => AppError::not_found("id", id),
                _ => e,
            })
            .inspect_err(|e| tracing::info!(error = %e, account_id = id, "unable to get account balance"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tx::DEFAULT_TX_TIMEOUT;
    use crate::db::{MemoryDb, MemoryTx};
    use crate::user_auth::Argon2Hasher;

    fn service(db: &MemoryDb) -> AccountManager<MemoryTx> {
        let coordinator = TxCoordinator::<MemoryTx>::new(Arc::new(db.clone()), DEFAULT_TX_TIMEOUT);
        AccountManager::new(
            coordinator,
            Arc::new(db.clone()),
            Arc::new(Argon2Hasher::fast().unwrap()),
        )
    }

    fn creation(cpf: &str, balance: f64) -> AccountCreation {
        AccountCreation {
            name: "Jane Doe".to_string(),
            cpf: cpf.to_string(),
            secret: "s3cr3t".to_string(),
            balance,
        }
    }

    #[tokio::test]
    async fn test_create_stores_hashed_secret() {
        let db = MemoryDb::new();
        let svc = service(&db);

        let view = svc.create(creation("52998224725", 1000.0)).await.unwrap();
        assert_eq!(view.id, 1);
        assert_eq!(view.balance, 1000.0);

        let state = db.snapshot().await;
        let stored = state.account(1).unwrap();
        assert_eq!(stored.balance, Currency::from_minor(100_000));
        assert_ne!(stored.secret, "s3cr3t");
        assert!(stored.secret.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_cpf() {
        let db = MemoryDb::new();
        let svc = service(&db);
        svc.create(creation("52998224725", 0.0)).await.unwrap();

        let err = svc.create(creation("52998224725", 10.0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err.message(),
            "field 'cpf' with value '52998224725' is already in use"
        );
        assert_eq!(db.snapshot().await.accounts().count(), 1);
    }

    #[tokio::test]
    async fn test_create_validates_fields() {
        let db = MemoryDb::new();
        let svc = service(&db);

        let err = svc.create(creation("12345678900", 0.0)).await.unwrap_err();
        assert_eq!(err.message(), "field 'cpf' has an invalid format");
        let err = svc.create(creation("52998224725", -1.0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(db.snapshot().await.accounts().count(), 0);
    }

    #[tokio::test]
    async fn test_login() {
        let db = MemoryDb::new();
        let svc = service(&db);
        svc.create(creation("52998224725", 0.0)).await.unwrap();

        let view = svc.login("52998224725", "s3cr3t").await.unwrap();
        assert_eq!(view.id, 1);

        let err = svc.login("52998224725", "wrong").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(
            err.message(),
            "the provided secret doesn't match the account's secret"
        );

        let err = svc.login("11144477735", "s3cr3t").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.message(), "account with the given cpf does not exist");

        let err = svc.login("52998224725", "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_balance_and_fetch() {
        let db = MemoryDb::new();
        let svc = service(&db);
        svc.create(creation("52998224725", 12.5)).await.unwrap();
        svc.create(creation("11144477735", 0.0)).await.unwrap();

        assert_eq!(svc.get_balance(1).await.unwrap(), Currency::from_minor(1250));
        let err = svc.get_balance(99).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let all = svc.fetch().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].cpf, "11144477735");
    }
}
