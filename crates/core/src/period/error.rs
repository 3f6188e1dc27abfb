//! Period status errors.

use closebook_shared::ErrorCategory;
use thiserror::Error;

use super::status::PeriodStatus;

/// Errors raised by the period status state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// The requested status change is not an edge of the state machine.
    #[error("Invalid period status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: PeriodStatus,
        /// Requested status.
        to: PeriodStatus,
    },

    /// Posting into a closed period outside the close workflow.
    #[error("Period is {status}, posting not allowed")]
    PostingNotAllowed {
        /// Current status.
        status: PeriodStatus,
    },

    /// Stored status string is not recognized.
    #[error("Unknown period status: {0}")]
    UnknownStatus(String),
}

impl PeriodError {
    /// Returns the taxonomy bucket for this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTransition { .. } | Self::PostingNotAllowed { .. } => ErrorCategory::State,
            Self::UnknownStatus(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the specific error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::PostingNotAllowed { .. } => "PERIOD_CLOSED",
            Self::UnknownStatus(_) => "UNKNOWN_PERIOD_STATUS",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        self.category().status_code()
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posting_not_allowed_is_state_error() {
        let err = PeriodError::PostingNotAllowed {
            status: PeriodStatus::SoftClosed,
        };
        assert_eq!(err.error_code(), "PERIOD_CLOSED");
        assert_eq!(err.category(), ErrorCategory::State);
        assert_eq!(err.http_status_code(), 422);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Period is SOFT_CLOSED, posting not allowed");
    }

    #[test]
    fn test_unknown_status_is_internal() {
        let err = PeriodError::UnknownStatus("LOCKED".into());
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
