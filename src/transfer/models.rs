//! Transfer records and API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::money::Currency;

/// Append-only ledger entry moving `amount` from origin to destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub id: i64,
    pub origin: i64,
    pub destination: i64,
    pub amount: Currency,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub origin: i64,
    pub destination: i64,
    pub amount: Currency,
    pub created_at: DateTime<Utc>,
}

/// Transfer request; the origin is the authenticated account.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct TransferCreation {
    #[schema(example = 2)]
    pub account_destination_id: i64,
    /// Amount in major units
    #[schema(example = 5.0)]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransferView {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 2)]
    pub account_destination_id: i64,
    #[schema(example = 5.0)]
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

impl From<&Transfer> for TransferView {
    fn from(transfer: &Transfer) -> Self {
        Self {
            id: transfer.id,
            account_destination_id: transfer.destination,
            amount: transfer.amount.to_decimal(),
            created_at: transfer.created_at,
        }
    }
}
