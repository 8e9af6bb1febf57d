//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while compiling or executing recipe queries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Programmer error, e.g. a query without a household scope.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Backend or network failure on a facet, page, or count fetch.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// A referenced record does not exist in the household.
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl From<sqlx::Error> for QueryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => QueryError::NotFound("row"),
            other => QueryError::DataUnavailable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::DataUnavailable(format!("malformed row: {err}"))
    }
}

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("service unavailable")]
    Unavailable(String),
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvariantViolation(msg) => {
                AppError::Internal(anyhow::anyhow!("invariant violation: {msg}"))
            }
            QueryError::DataUnavailable(msg) => AppError::Unavailable(msg),
            QueryError::NotFound(_) => AppError::NotFound,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        // Internal details stay in the logs
        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            AppError::Unavailable(reason) => {
                tracing::warn!(reason = %reason, "backend unavailable");
                self.to_string()
            }
            AppError::NotFound => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
