//! Application error taxonomy.
//!
//! Every failure surfaced by stores, validators, services and the HTTP layer is
//! an [`AppError`]. Each variant maps to a stable four digit code and an HTTP
//! status through [`ErrorKind`].
//!
//! | Kind            | Code | HTTP |
//! |-----------------|------|------|
//! | Internal        | 0000 | 500  |
//! | EmptyResult     | 0010 | 404  |
//! | SelectStmt      | 0020 | 500  |
//! | InsertStmt      | 0030 | 500  |
//! | UpdateStmt      | 0040 | 500  |
//! | NoRowAffected   | 0050 | 500  |
//! | Validation      | 0060 | 400  |
//! | NotFound        | 0070 | 404  |
//! | Authentication  | 0080 | 401  |
//! | Conflict        | 0090 | 409  |

use std::error::Error as StdError;
use std::fmt::Display;

use axum::http::StatusCode;
use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub type AppResult<T> = Result<T, AppError>;

/// Error kinds with their wire codes as discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorKind {
    Internal = 0,
    EmptyResult = 10,
    SelectStmt = 20,
    InsertStmt = 30,
    UpdateStmt = 40,
    NoRowAffected = 50,
    Validation = 60,
    NotFound = 70,
    Authentication = 80,
    Conflict = 90,
}

impl ErrorKind {
    /// Four digit code, zero padded ("0060").
    pub fn code(self) -> String {
        format!("{:04}", self as u16)
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Self::EmptyResult | Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal
            | Self::SelectStmt
            | Self::InsertStmt
            | Self::UpdateStmt
            | Self::NoRowAffected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the kind is reported to clients as an unclassified failure.
    pub fn is_internal(self) -> bool {
        self.http_status().is_server_error()
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{message}")]
    EmptyResult {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{message}")]
    SelectStmt {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{message}")]
    InsertStmt {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{message}")]
    UpdateStmt {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{message}")]
    NoRowAffected { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Authentication { message: String },

    #[error("{message}")]
    Conflict { message: String },
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Internal { .. } => ErrorKind::Internal,
            Self::EmptyResult { .. } => ErrorKind::EmptyResult,
            Self::SelectStmt { .. } => ErrorKind::SelectStmt,
            Self::InsertStmt { .. } => ErrorKind::InsertStmt,
            Self::UpdateStmt { .. } => ErrorKind::UpdateStmt,
            Self::NoRowAffected { .. } => ErrorKind::NoRowAffected,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Conflict { .. } => ErrorKind::Conflict,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Internal { message, .. }
            | Self::EmptyResult { message, .. }
            | Self::SelectStmt { message, .. }
            | Self::InsertStmt { message, .. }
            | Self::UpdateStmt { message, .. }
            | Self::NoRowAffected { message }
            | Self::Validation { message }
            | Self::NotFound { message }
            | Self::Authentication { message }
            | Self::Conflict { message } => message,
        }
    }

    // ------------------------------------------------------------------------
    // Store / infrastructure errors
    // ------------------------------------------------------------------------

    pub fn internal(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn internal_msg(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::EmptyResult {
            message: message.into(),
            source: None,
        }
    }

    pub fn select_stmt(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::SelectStmt {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn insert_stmt(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::InsertStmt {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn update_stmt(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::UpdateStmt {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn no_row_affected(message: impl Into<String>) -> Self {
        Self::NoRowAffected {
            message: message.into(),
        }
    }

    // ------------------------------------------------------------------------
    // Domain errors
    // ------------------------------------------------------------------------

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::validation(format!("field '{field}' is required"))
    }

    pub fn greater_than(field: &str, value: impl Display) -> Self {
        Self::validation(format!("field '{field}' must be greater than {value}"))
    }

    pub fn greater_or_equal(field: &str, value: impl Display) -> Self {
        Self::validation(format!(
            "field '{field}' must be greater than or equal to {value}"
        ))
    }

    pub fn max_size(field: &str, size: usize) -> Self {
        Self::validation(format!("field '{field}' must have at most {size} characters"))
    }

    pub fn out_of_range(field: &str) -> Self {
        Self::validation(format!("field '{field}' is out of range"))
    }

    pub fn trailing_whitespace(field: &str) -> Self {
        Self::validation(format!("field '{field}' can't have trailing whitespace"))
    }

    pub fn invalid_format(field: &str) -> Self {
        Self::validation(format!("field '{field}' has an invalid format"))
    }

    pub fn already_in_use(field: &str, value: impl Display) -> Self {
        Self::conflict(format!("field '{field}' with value '{value}' is already in use"))
    }

    pub fn same_field(first: &str, second: &str) -> Self {
        Self::conflict(format!("fields '{first}' and '{second}' can't be the same"))
    }

    pub fn not_found_msg(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn not_found(field: &str, value: impl Display) -> Self {
        Self::NotFound {
            message: format!("record with '{field}' equals '{value}' was not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorKind::Internal.code(), "0000");
        assert_eq!(ErrorKind::EmptyResult.code(), "0010");
        assert_eq!(ErrorKind::NoRowAffected.code(), "0050");
        assert_eq!(ErrorKind::Validation.code(), "0060");
        assert_eq!(ErrorKind::Conflict.code(), "0090");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorKind::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::EmptyResult.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Validation.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::Authentication.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorKind::Conflict.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorKind::UpdateStmt.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(ErrorKind::NoRowAffected.is_internal());
        assert!(!ErrorKind::Conflict.is_internal());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AppError::required("destination_id").message(),
            "field 'destination_id' is required"
        );
        assert_eq!(
            AppError::same_field("origin id", "destination id").message(),
            "fields 'origin id' and 'destination id' can't be the same"
        );
        assert_eq!(
            AppError::not_found("destination", 9999).to_string(),
            "record with 'destination' equals '9999' was not found"
        );
        assert_eq!(
            AppError::already_in_use("cpf", "52998224725").kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_source_is_kept() {
        let io = std::io::Error::other("connection reset");
        let err = AppError::select_stmt("fetching balance", io);
        assert_eq!(err.kind(), ErrorKind::SelectStmt);
        assert!(StdError::source(&err).is_some());
    }
}
