//! API response envelopes
//!
//! - [`ErrorBody`]: JSON body of every error response
//! - [`ApiError`]: `AppError` bound to the request path, renders as `ErrorBody`
//! - [`created`], [`ok`]: success responses

use std::fmt::Display;

use axum::{
    Json,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

pub const APPLICATION_JSON: &str = "application/json";
pub const CHARSET_UTF8: &str = "utf-8";

/// Headers attached to every response.
pub fn default_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON)),
        (header::ACCEPT, HeaderValue::from_static(APPLICATION_JSON)),
        (header::ACCEPT_CHARSET, HeaderValue::from_static(CHARSET_UTF8)),
    ]
}

// ============================================================================
// Errors
// ============================================================================

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// HTTP reason phrase
    #[schema(example = "Bad Request")]
    pub name: String,
    /// Four digit application error code
    #[schema(example = "0060")]
    pub code: String,
    #[schema(example = "field 'amount' must be greater than 0")]
    pub message: String,
    /// Request URI that produced the error
    #[schema(example = "/transfers")]
    pub path: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    path: String,
}

impl ApiError {
    pub fn new(error: AppError, uri: &Uri) -> Self {
        let path = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());
        Self { error, path }
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }

    pub fn body(&self) -> ErrorBody {
        let kind = self.error.kind();
        let status = kind.http_status();
        // 5xx kinds are reported as unclassified
        let code = if kind.is_internal() {
            crate::error::ErrorKind::Internal.code()
        } else {
            kind.code()
        };

        ErrorBody {
            name: status.canonical_reason().unwrap_or_default().to_string(),
            code,
            message: self.error.message().to_string(),
            path: self.path.clone(),
            time: Utc::now(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.kind().http_status();
        if status.is_server_error() {
            tracing::error!(path = %self.path, error = ?self.error, "request failed");
        }
        (status, default_headers(), Json(self.body())).into_response()
    }
}

// ============================================================================
// Success
// ============================================================================

/// 201 with `Location: {request path}/{id}`
pub fn created<T: Serialize>(uri: &Uri, id: impl Display, body: T) -> Response {
    let location = format!("{}/{}", uri.path().trim_end_matches('/'), id);
    let mut headers = HeaderMap::new();
    headers.extend(default_headers());
    if let Ok(value) = HeaderValue::from_str(&location) {
        headers.insert(header::LOCATION, value);
    }
    (StatusCode::CREATED, headers, Json(body)).into_response()
}

/// 200 with a JSON body
pub fn ok<T: Serialize>(body: T) -> Response {
    (StatusCode::OK, default_headers(), Json(body)).into_response()
}
