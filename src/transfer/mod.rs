//! Transfers between accounts
//!
//! A transfer debits the authenticated origin account and credits a
//! destination account. Validation, both balance updates and the transfer
//! record all run inside one transaction scope; see [`orchestrator`].

pub mod models;
pub mod orchestrator;
pub mod repository;
pub mod service;
pub mod validation;

pub use models::{NewTransfer, Transfer, TransferCreation, TransferView};
pub use orchestrator::TransferOrchestrator;
pub use repository::{PgTransferStore, TransferStore};
pub use service::TransferService;
pub use validation::{TransferValidator, ValidatedTransfer};
