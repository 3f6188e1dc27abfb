//! Error responses.
//!
//! Every domain error is rendered as
//! `{ "error": <category>, "code": <specific code>, "message": <text>, "retryable": bool }`
//! with the HTTP status of its category.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use closebook_core::close::CloseError;
use closebook_core::ledger::LedgerError;
use closebook_core::period::PeriodError;
use closebook_shared::ErrorCategory;

/// Wire format of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Category code, e.g. `STATE_ERROR`.
    pub error: &'static str,
    /// Specific code, e.g. `PERIOD_CLOSED`.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// True if the same request may be retried unchanged.
    pub retryable: bool,
}

/// An error returned by a handler.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(category: ErrorCategory, code: &'static str, message: String) -> Self {
        Self {
            status: StatusCode::from_u16(category.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: ErrorBody {
                error: category.code(),
                code,
                message,
                retryable: category.is_retryable(),
            },
        }
    }

    /// A malformed request.
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Validation, code, message.into())
    }

    /// Missing, malformed or expired bearer token.
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorCategory::Validation, code, message.into());
        err.status = StatusCode::UNAUTHORIZED;
        err.body.error = "UNAUTHORIZED";
        err
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the body.
    #[must_use]
    pub const fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        if err.category() == ErrorCategory::Internal {
            tracing::error!(error = %err, "Ledger operation failed");
        }
        Self::new(err.category(), err.error_code(), err.to_string())
    }
}

impl From<PeriodError> for ApiError {
    fn from(err: PeriodError) -> Self {
        Self::new(err.category(), err.error_code(), err.to_string())
    }
}

impl From<CloseError> for ApiError {
    fn from(err: CloseError) -> Self {
        if err.category() == ErrorCategory::Internal {
            tracing::error!(error = %err, "Close workflow failed");
        }
        Self::new(err.category(), err.error_code(), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation("INVALID_BODY", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation("INVALID_QUERY", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
