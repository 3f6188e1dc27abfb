//! Error taxonomy.
//!
//! Every domain error in the workspace reports an [`ErrorCategory`], which is the
//! contract callers use to tell retryable conflicts apart from input problems.

use serde::Serialize;

/// Coarse error taxonomy shared by all ledger operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Structurally invalid request.
    Validation,
    /// Operation not valid in the current lifecycle state.
    State,
    /// Unknown book, period, account, journal or run.
    NotFound,
    /// Concurrent mutation on the same key; safe to retry.
    Conflict,
    /// Unexpected failure (database outage, broken invariant).
    Internal,
}

impl ErrorCategory {
    /// Returns the wire code for this category.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::State => "STATE_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this category.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::State => 422,
            Self::Internal => 500,
        }
    }

    /// Returns true if the caller may retry the same request unchanged.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Conflict)
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
