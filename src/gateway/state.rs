use std::sync::Arc;
use std::time::Duration;

use crate::account::{AccountManager, AccountService, AccountStore, PgAccountStore};
use crate::db::{Database, MemoryDb, MemoryTx, PgTx, TxCoordinator};
use crate::transfer::{PgTransferStore, TransferOrchestrator, TransferService, TransferStore};
use crate::user_auth::{SecretHasher, TokenService};

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Account registration, login and balance queries
    pub accounts: Arc<dyn AccountService>,
    /// Transfer creation and listing
    pub transfers: Arc<dyn TransferService>,
    /// Bearer token issuance and verification
    pub tokens: Arc<TokenService>,
    /// PostgreSQL pool for health checks (None on the memory backend)
    pub pg_db: Option<Database>,
}

impl AppState {
    pub fn new(
        accounts: Arc<dyn AccountService>,
        transfers: Arc<dyn TransferService>,
        tokens: Arc<TokenService>,
        pg_db: Option<Database>,
    ) -> Self {
        Self {
            accounts,
            transfers,
            tokens,
            pg_db,
        }
    }

    /// Services backed by PostgreSQL
    pub fn postgres(
        db: Database,
        tokens: Arc<TokenService>,
        hasher: Arc<dyn SecretHasher>,
        tx_timeout: Duration,
    ) -> Self {
        let coordinator = TxCoordinator::<PgTx>::new(Arc::new(db.clone()), tx_timeout);
        let accounts: Arc<dyn AccountStore<PgTx>> = Arc::new(PgAccountStore);
        let transfers: Arc<dyn TransferStore<PgTx>> = Arc::new(PgTransferStore);

        Self::new(
            Arc::new(AccountManager::new(
                coordinator.clone(),
                accounts.clone(),
                hasher,
            )),
            Arc::new(TransferOrchestrator::new(coordinator, accounts, transfers)),
            tokens,
            Some(db),
        )
    }

    /// Services backed by the in-process store
    pub fn memory(
        db: MemoryDb,
        tokens: Arc<TokenService>,
        hasher: Arc<dyn SecretHasher>,
        tx_timeout: Duration,
    ) -> Self {
        let coordinator = TxCoordinator::<MemoryTx>::new(Arc::new(db.clone()), tx_timeout);
        let accounts: Arc<dyn AccountStore<MemoryTx>> = Arc::new(db.clone());
        let transfers: Arc<dyn TransferStore<MemoryTx>> = Arc::new(db);

        Self::new(
            Arc::new(AccountManager::new(
                coordinator.clone(),
                accounts.clone(),
                hasher,
            )),
            Arc::new(TransferOrchestrator::new(coordinator, accounts, transfers)),
            tokens,
            None,
        )
    }
}
