//! STN Accounts - accounts and transfers over REST
//!
//! # Modules
//!
//! - [`money`] - Fixed-point currency (integer cents)
//! - [`error`] - Error taxonomy with wire codes and HTTP statuses
//! - [`db`] - PostgreSQL pool, in-memory backend, transaction coordination
//! - [`account`] - Registration, login, balance queries
//! - [`transfer`] - Validated, atomic transfers between accounts
//! - [`user_auth`] - Secret hashing and bearer tokens
//! - [`gateway`] - axum router, handlers, OpenAPI
//! - [`config`] / [`logging`] - Process setup

pub mod account;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod money;
pub mod transfer;
pub mod user_auth;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorKind};
pub use gateway::{build_router, state::AppState};
pub use money::Currency;
