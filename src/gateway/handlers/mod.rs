pub mod account;
pub mod health;
pub mod login;
pub mod transfer;

pub use account::{create_account, get_accounts, get_balance};
pub use health::{HealthResponse, health_check};
pub use login::login;
pub use transfer::{create_transfer, get_transfers};

use axum::extract::{OriginalUri, rejection::JsonRejection};

use super::types::ApiError;
use crate::error::AppError;

/// Malformed or non-JSON request bodies are client errors.
pub(crate) fn body_error(rejection: &JsonRejection) -> AppError {
    AppError::validation(format!(
        "unable to decode the request body: {}",
        rejection.body_text()
    ))
}

/// Fallback for unmatched routes
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::new(AppError::not_found_msg("Unable to match any Request-URI"), &uri)
}
