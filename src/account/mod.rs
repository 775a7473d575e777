//! Account management module
//!
//! - [`models`]: stored record and API DTOs
//! - [`validation`]: field rules (name, cpf, secret, balance)
//! - [`repository`]: storage port and PostgreSQL implementation
//! - [`service`]: registration, login, balance and listing

pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

pub use models::{Account, AccountCreation, AccountView, LoginRequest, NewAccount};
pub use repository::{AccountStore, PgAccountStore};
pub use service::{AccountManager, AccountService};
pub use validation::Cpf;
