use std::sync::Arc;

use axum::{
    Json,
    extract::{OriginalUri, State, rejection::JsonRejection},
    response::Response,
};

use super::super::state::AppState;
use super::super::types::{ApiError, ErrorBody, ok};
use super::body_error;
use crate::account::LoginRequest;
use crate::user_auth::TokenResponse;

/// Exchange cpf and secret for a bearer token
///
/// POST /login
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Malformed cpf or missing secret", body = ErrorBody),
        (status = 401, description = "Unknown cpf or wrong secret", body = ErrorBody)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(|r| ApiError::new(body_error(&r), &uri))?;

    let view = state
        .accounts
        .login(&req.cpf, &req.secret)
        .await
        .map_err(|e| ApiError::new(e, &uri))?;

    let token = state.tokens.issue(view.id).map_err(|e| ApiError::new(e, &uri))?;
    tracing::info!(account_id = view.id, "token issued");
    Ok(ok(token))
}
