//! Account handlers: list, register, balance

use std::sync::Arc;

use axum::{
    Json,
    extract::{OriginalUri, Path, State, rejection::JsonRejection, rejection::PathRejection},
    response::Response,
};

use super::super::state::AppState;
use super::super::types::{ApiError, ErrorBody, created, ok};
use super::body_error;
use crate::account::{AccountCreation, AccountView};
use crate::error::AppError;

/// List all accounts
#[utoipa::path(
    get,
    path = "/accounts",
    responses(
        (status = 200, description = "Registered accounts", body = Vec<AccountView>),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Accounts"
)]
pub async fn get_accounts(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, ApiError> {
    let views = state
        .accounts
        .fetch()
        .await
        .map_err(|e| ApiError::new(e, &uri))?;
    Ok(ok(views))
}

/// Register a new account
///
/// The secret is stored hashed; the response never includes it.
#[utoipa::path(
    post,
    path = "/accounts",
    request_body = AccountCreation,
    responses(
        (status = 201, description = "Account created", body = AccountView,
            headers(("Location" = String, description = "URI of the new account"))),
        (status = 400, description = "Invalid field", body = ErrorBody),
        (status = 409, description = "cpf already in use", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<AccountCreation>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(|r| ApiError::new(body_error(&r), &uri))?;

    let view = state
        .accounts
        .create(req)
        .await
        .map_err(|e| ApiError::new(e, &uri))?;
    Ok(created(&uri, view.id, view))
}

/// Current balance of an account
#[utoipa::path(
    get,
    path = "/accounts/{id}/balance",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Balance in major units", body = f64, example = json!(995.0)),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody)
    ),
    tag = "Accounts"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::new(AppError::invalid_format("id"), &uri))?;

    let balance = state
        .accounts
        .get_balance(id)
        .await
        .map_err(|e| ApiError::new(e, &uri))?;
    Ok(ok(balance.to_decimal()))
}
