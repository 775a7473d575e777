use async_trait::async_trait;

use super::models::{TransferCreation, TransferView};
use crate::error::AppResult;

/// Transfer operations exposed to the HTTP layer.
#[async_trait]
pub trait TransferService: Send + Sync {
    /// Transfers sent by the authenticated account.
    async fn fetch(&self, origin: i64) -> AppResult<Vec<TransferView>>;

    /// Move `req.amount` from `origin` to `req.account_destination_id`.
    async fn create(&self, origin: i64, req: TransferCreation) -> AppResult<TransferView>;
}
