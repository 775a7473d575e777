//! Transaction coordination
//!
//! A unit of work runs against one transaction handle `Tx`. The outermost
//! invocation of [`TxCoordinator::run_in_transaction`] owns the handle: it
//! begins it, commits it once on success and rolls it back on failure or
//! timeout. Nested invocations receive the caller's handle and never commit.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::{AppError, AppResult};

/// Default bound on a single unit of work.
pub const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage-side transaction lifecycle.
#[async_trait]
pub trait Transactioner<Tx: Send + 'static>: Send + Sync {
    async fn begin(&self) -> AppResult<Tx>;
    async fn commit(&self, tx: Tx) -> AppResult<()>;
    async fn rollback(&self, tx: Tx) -> AppResult<()>;
}

pub struct TxCoordinator<Tx: Send + 'static> {
    transactioner: Arc<dyn Transactioner<Tx>>,
    timeout: Duration,
}

impl<Tx: Send + 'static> Clone for TxCoordinator<Tx> {
    fn clone(&self) -> Self {
        Self {
            transactioner: self.transactioner.clone(),
            timeout: self.timeout,
        }
    }
}

impl<Tx: Send + 'static> TxCoordinator<Tx> {
    pub fn new(transactioner: Arc<dyn Transactioner<Tx>>, timeout: Duration) -> Self {
        Self {
            transactioner,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `work` inside a transaction scope.
    ///
    /// With `scope = Some(tx)` the work joins the caller's scope and the
    /// caller decides the outcome. With `None` a new scope is opened here and
    /// committed only if `work` succeeds within the timeout.
    ///
    /// Dropping the returned future before completion drops the open handle
    /// uncommitted.
    pub async fn run_in_transaction<T, F>(&self, scope: Option<&mut Tx>, work: F) -> AppResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut Tx) -> BoxFuture<'c, AppResult<T>> + Send,
    {
        if let Some(tx) = scope {
            return work(tx).await;
        }

        let mut tx = self.transactioner.begin().await?;
        let outcome = tokio::time::timeout(self.timeout, work(&mut tx)).await;

        match outcome {
            Ok(Ok(value)) => {
                self.transactioner.commit(tx).await?;
                Ok(value)
            }
            Ok(Err(err)) => {
                self.rollback_logged(tx, &err).await;
                Err(err)
            }
            Err(_) => {
                let err = AppError::internal_msg("transaction timed out");
                tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "unit of work exceeded its deadline");
                self.rollback_logged(tx, &err).await;
                Err(err)
            }
        }
    }

    async fn rollback_logged(&self, tx: Tx, cause: &AppError) {
        if let Err(e) = self.transactioner.rollback(tx).await {
            tracing::error!(
                error = %e,
                cause = %cause,
                "failed to rollback transaction"
            );
        }
    }
}
