//! Error types for Libris server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Stable error codes reported to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 2,
    NoSuchData = 3,
    Duplicate = 4,
    AlreadyBorrowed = 5,
    MaxBorrowsReached = 6,
    BookNotAvailable = 7,
    BookIsOver = 8,
    MemberHasBooks = 9,
    BadValue = 10,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Member already has this book")]
    AlreadyBorrowed,

    #[error("Limit of books is {limit}")]
    LimitReached { limit: u32 },

    #[error("Book not available")]
    BookUnavailable,

    #[error("This book amount is over")]
    BookIsOver,

    #[error("Member has books")]
    HasBooks,

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::BookUnavailable => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_)
            | AppError::AlreadyBorrowed
            | AppError::LimitReached { .. }
            | AppError::BookIsOver
            | AppError::HasBooks
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NoSuchData,
            AppError::AlreadyExists(_) => ErrorCode::Duplicate,
            AppError::AlreadyBorrowed => ErrorCode::AlreadyBorrowed,
            AppError::LimitReached { .. } => ErrorCode::MaxBorrowsReached,
            AppError::BookUnavailable => ErrorCode::BookNotAvailable,
            AppError::BookIsOver => ErrorCode::BookIsOver,
            AppError::HasBooks => ErrorCode::MemberHasBooks,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }
}

/// Collects every violation message, ordered by field name.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();

        AppError::Validation(messages)
    }
}

/// Malformed or wrongly shaped request bodies are validation failures
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error".to_string(), Vec::new())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), Vec::new())
            }
            AppError::Validation(messages) => ("Validation failed".to_string(), messages),
            other => (other.to_string(), Vec::new()),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
