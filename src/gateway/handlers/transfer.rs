//! Transfer handlers (bearer token required)
//!
//! The origin account is always the authenticated one.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{OriginalUri, State, rejection::JsonRejection},
    response::Response,
};

use super::super::state::AppState;
use super::super::types::{ApiError, ErrorBody, created, ok};
use super::body_error;
use crate::transfer::{TransferCreation, TransferView};
use crate::user_auth::AuthenticatedAccount;

/// Transfers sent by the authenticated account
#[utoipa::path(
    get,
    path = "/transfers",
    responses(
        (status = 200, description = "Sent transfers", body = Vec<TransferView>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn get_transfers(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<AuthenticatedAccount>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, ApiError> {
    let views = state
        .transfers
        .fetch(account.account_id)
        .await
        .map_err(|e| ApiError::new(e, &uri))?;
    Ok(ok(views))
}

/// Transfer an amount to another account
#[utoipa::path(
    post,
    path = "/transfers",
    request_body = TransferCreation,
    responses(
        (status = 201, description = "Transfer committed", body = TransferView,
            headers(("Location" = String, description = "URI of the new transfer"))),
        (status = 400, description = "Invalid amount or insufficient balance", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Origin or destination not found", body = ErrorBody),
        (status = 409, description = "Origin and destination are the same", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<AuthenticatedAccount>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<TransferCreation>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(|r| ApiError::new(body_error(&r), &uri))?;

    let view = state
        .transfers
        .create(account.account_id, req)
        .await
        .map_err(|e| ApiError::new(e, &uri))?;
    Ok(created(&uri, view.id, view))
}
