//! Close and reopen workflow errors.

use closebook_shared::ErrorCategory;
use closebook_shared::types::{AccountId, BookId, CloseRunId, FiscalPeriodId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::period::PeriodError;

/// Errors that can occur while closing or reopening a period.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloseError {
    /// Retained earnings account is unknown in the book's organization.
    #[error("Retained earnings account not found: {0}")]
    RetainedEarningsNotFound(AccountId),

    /// Retained earnings account is not an equity account.
    #[error("Retained earnings account {0} is not an EQUITY account")]
    RetainedEarningsNotEquity(AccountId),

    /// Retained earnings account is a header account.
    #[error("Retained earnings account {0} does not allow posting")]
    RetainedEarningsNotPostable(AccountId),

    /// Reopen requires a reason.
    #[error("Reopen reason cannot be empty")]
    ReopenReasonRequired,

    /// No completed run exists to reopen.
    #[error("No completed close run for book {book_id} period {fiscal_period_id}")]
    NoCompletedRun {
        /// The book.
        book_id: BookId,
        /// The period.
        fiscal_period_id: FiscalPeriodId,
    },

    /// Latest run is already reopened.
    #[error("Close run {0} is already reopened")]
    AlreadyReopened(CloseRunId),

    /// A generated journal failed to balance.
    #[error("Generated {journal} journal is not balanced: difference {difference}")]
    GeneratedJournalUnbalanced {
        /// Which journal.
        journal: &'static str,
        /// Debit minus credit.
        difference: Decimal,
    },

    /// Another close or reopen of the same period is in flight.
    #[error("Concurrent close or reopen of book {book_id} period {fiscal_period_id}, please retry")]
    ConcurrentClose {
        /// The book.
        book_id: BookId,
        /// The period.
        fiscal_period_id: FiscalPeriodId,
    },

    /// Posting or lookup failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Status transition failure.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CloseError {
    /// Returns the taxonomy bucket for this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::RetainedEarningsNotFound(_)
            | Self::RetainedEarningsNotEquity(_)
            | Self::RetainedEarningsNotPostable(_)
            | Self::ReopenReasonRequired => ErrorCategory::Validation,
            Self::NoCompletedRun { .. } | Self::AlreadyReopened(_) => ErrorCategory::State,
            Self::ConcurrentClose { .. } => ErrorCategory::Conflict,
            Self::Ledger(e) => e.category(),
            Self::Period(e) => e.category(),
            Self::GeneratedJournalUnbalanced { .. } | Self::Database(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the specific error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::RetainedEarningsNotFound(_) => "RETAINED_EARNINGS_NOT_FOUND",
            Self::RetainedEarningsNotEquity(_) => "RETAINED_EARNINGS_NOT_EQUITY",
            Self::RetainedEarningsNotPostable(_) => "RETAINED_EARNINGS_NOT_POSTABLE",
            Self::ReopenReasonRequired => "REOPEN_REASON_REQUIRED",
            Self::NoCompletedRun { .. } => "NO_COMPLETED_RUN",
            Self::AlreadyReopened(_) => "ALREADY_REOPENED",
            Self::GeneratedJournalUnbalanced { .. } => "GENERATED_JOURNAL_UNBALANCED",
            Self::ConcurrentClose { .. } => "CONCURRENT_CLOSE",
            Self::Ledger(e) => e.error_code(),
            Self::Period(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
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
    use crate::period::PeriodStatus;
    use rstest::rstest;

    #[rstest]
    #[case(CloseError::RetainedEarningsNotEquity(AccountId::new()), ErrorCategory::Validation)]
    #[case(CloseError::ReopenReasonRequired, ErrorCategory::Validation)]
    #[case(CloseError::AlreadyReopened(CloseRunId::new()), ErrorCategory::State)]
    #[case(
        CloseError::ConcurrentClose {
            book_id: BookId::new(),
            fiscal_period_id: FiscalPeriodId::new(),
        },
        ErrorCategory::Conflict
    )]
    #[case(
        CloseError::Period(PeriodError::InvalidTransition {
            from: PeriodStatus::HardClosed,
            to: PeriodStatus::SoftClosed,
        }),
        ErrorCategory::State
    )]
    #[case(
        CloseError::Ledger(LedgerError::PeriodNotFound(FiscalPeriodId::new())),
        ErrorCategory::NotFound
    )]
    #[case(CloseError::Database("down".into()), ErrorCategory::Internal)]
    fn test_categories(#[case] err: CloseError, #[case] expected: ErrorCategory) {
        assert_eq!(err.category(), expected);
        assert_eq!(err.http_status_code(), expected.status_code());
        assert_eq!(err.is_retryable(), expected == ErrorCategory::Conflict);
    }

    #[test]
    fn test_wrapped_errors_keep_specific_codes() {
        let err: CloseError = LedgerError::UnbalancedJournal {
            debit: Decimal::ONE,
            credit: Decimal::ZERO,
        }
        .into();
        assert_eq!(err.error_code(), "UNBALANCED_JOURNAL");

        let err: CloseError = PeriodError::InvalidTransition {
            from: PeriodStatus::HardClosed,
            to: PeriodStatus::SoftClosed,
        }
        .into();
        assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");
    }
}
