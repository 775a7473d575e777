use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::gateway::{state::AppState, types::ApiError};

/// Authenticated account injected into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: i64,
}

/// Extract the token from `Bearer <token>`; the scheme is case-insensitive.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let reject = |e: AppError| ApiError::new(e, &uri);

    // 1. Extract Authorization header
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(parse_bearer)
        .ok_or_else(|| {
            reject(AppError::authentication(
                "authorization header is missing or has an invalid format",
            ))
        })?;

    // 2. Verify Token
    let claims = state.tokens.verify(token).map_err(reject)?;
    let account_id = claims.account_id().ok_or_else(|| {
        reject(AppError::authentication("unable to parse the token subject"))
    })?;

    // 3. Inject account id
    request
        .extensions_mut()
        .insert(AuthenticatedAccount { account_id });
    Ok(next.run(request).await)
}
