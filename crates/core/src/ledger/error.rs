//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur during journal posting,
//! draft handling and reversal, together with their taxonomy bucket.

use chrono::NaiveDate;
use closebook_shared::ErrorCategory;
use closebook_shared::types::{AccountId, BookId, FiscalPeriodId, JournalEntryId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::JournalStatus;
use crate::period::PeriodError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal must have at least one line.
    #[error("Journal must have at least one line")]
    EmptyJournal,

    /// Journal is not balanced (debits != credits in base currency).
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedJournal {
        /// Total debit amount in base currency.
        debit: Decimal,
        /// Total credit amount in base currency.
        credit: Decimal,
    },

    /// Line carries no amount.
    #[error("Line {line_no}: amount cannot be zero")]
    ZeroAmount {
        /// 1-based line number.
        line_no: usize,
    },

    /// Line carries a negative amount.
    #[error("Line {line_no}: amount cannot be negative")]
    NegativeAmount {
        /// 1-based line number.
        line_no: usize,
    },

    /// Line sets both debit and credit.
    #[error("Line {line_no}: specify either debit or credit, not both")]
    BothSidesSet {
        /// 1-based line number.
        line_no: usize,
    },

    /// Currency code is not a three-letter ISO code.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Entry date is outside the target period.
    #[error("Entry date {date} is outside the period {start} to {end}")]
    EntryDateOutsidePeriod {
        /// The entry date.
        date: NaiveDate,
        /// First day of the period.
        start: NaiveDate,
        /// Last day of the period.
        end: NaiveDate,
    },

    /// Description is required.
    #[error("Journal description cannot be empty")]
    MissingDescription,

    // ========== Account Errors ==========
    /// Account not found in the caller's organization.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account does not allow posting (header account).
    #[error("Account {0} does not allow posting")]
    AccountNotPostable(AccountId),

    /// Header accounts with children cannot be made postable.
    #[error("Account {0} has child accounts and cannot allow posting")]
    AccountHasChildren(AccountId),

    // ========== Book / Period Errors ==========
    /// Book not found in the caller's organization.
    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// No period with this number exists in the book's calendar.
    #[error("No fiscal period {fiscal_year}-{period_no} in the calendar of book {book_id}")]
    PeriodNotResolved {
        /// The book.
        book_id: BookId,
        /// Fiscal year searched.
        fiscal_year: i32,
        /// Period number searched.
        period_no: i32,
    },

    /// Fiscal period belongs to a different calendar than the book.
    #[error("Fiscal period {fiscal_period_id} is not in the calendar of book {book_id}")]
    PeriodNotInBookCalendar {
        /// The book.
        book_id: BookId,
        /// The period.
        fiscal_period_id: FiscalPeriodId,
    },

    /// Period status rejected the operation.
    #[error(transparent)]
    Period(#[from] PeriodError),

    // ========== Journal State Errors ==========
    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    JournalNotFound(JournalEntryId),

    /// Only posted entries can be reversed.
    #[error("Journal entry {id} is {status:?} and cannot be reversed")]
    NotReversible {
        /// The entry.
        id: JournalEntryId,
        /// Its status.
        status: JournalStatus,
    },

    /// Reversal entries are not themselves reversible.
    #[error("Journal entry {0} is a reversal and cannot be reversed")]
    ReversalOfReversal(JournalEntryId),

    /// Close-generated entries are undone by reopening their period.
    #[error("Journal entry {0} was generated by a close run; reopen the period instead")]
    GeneratedJournal(JournalEntryId),

    /// Only drafts can be posted through the draft path.
    #[error("Journal entry {0} is not a draft")]
    NotDraft(JournalEntryId),

    // ========== Concurrency Errors ==========
    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the taxonomy bucket for this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyJournal
            | Self::UnbalancedJournal { .. }
            | Self::ZeroAmount { .. }
            | Self::NegativeAmount { .. }
            | Self::BothSidesSet { .. }
            | Self::InvalidCurrency(_)
            | Self::EntryDateOutsidePeriod { .. }
            | Self::MissingDescription
            | Self::AccountNotPostable(_)
            | Self::AccountHasChildren(_) => ErrorCategory::Validation,

            Self::AccountNotFound(_)
            | Self::BookNotFound(_)
            | Self::PeriodNotFound(_)
            | Self::PeriodNotResolved { .. }
            | Self::JournalNotFound(_) => ErrorCategory::NotFound,

            Self::PeriodNotInBookCalendar { .. }
            | Self::NotReversible { .. }
            | Self::ReversalOfReversal(_)
            | Self::GeneratedJournal(_)
            | Self::NotDraft(_) => ErrorCategory::State,

            Self::Period(e) => e.category(),

            Self::ConcurrentModification => ErrorCategory::Conflict,

            Self::Database(_) | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the specific error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyJournal => "EMPTY_JOURNAL",
            Self::UnbalancedJournal { .. } => "UNBALANCED_JOURNAL",
            Self::ZeroAmount { .. } => "ZERO_AMOUNT",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::BothSidesSet { .. } => "BOTH_SIDES_SET",
            Self::InvalidCurrency(_) => "INVALID_CURRENCY",
            Self::EntryDateOutsidePeriod { .. } => "ENTRY_DATE_OUTSIDE_PERIOD",
            Self::MissingDescription => "MISSING_DESCRIPTION",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountNotPostable(_) => "ACCOUNT_NOT_POSTABLE",
            Self::AccountHasChildren(_) => "ACCOUNT_HAS_CHILDREN",
            Self::BookNotFound(_) => "BOOK_NOT_FOUND",
            Self::PeriodNotFound(_) | Self::PeriodNotResolved { .. } => "PERIOD_NOT_FOUND",
            Self::PeriodNotInBookCalendar { .. } => "PERIOD_NOT_IN_BOOK_CALENDAR",
            Self::Period(e) => e.error_code(),
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::NotReversible { .. } => "NOT_REVERSIBLE",
            Self::ReversalOfReversal(_) => "REVERSAL_OF_REVERSAL",
            Self::GeneratedJournal(_) => "GENERATED_JOURNAL",
            Self::NotDraft(_) => "NOT_DRAFT",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
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

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::EmptyJournal.error_code(), "EMPTY_JOURNAL");
        let unbalanced = LedgerError::UnbalancedJournal {
            debit: Decimal::new(100, 2),
            credit: Decimal::new(50, 2),
        };
        assert_eq!(unbalanced.error_code(), "UNBALANCED_JOURNAL");
        assert_eq!(unbalanced.category(), ErrorCategory::Validation);

        let missing = LedgerError::JournalNotFound(JournalEntryId::new());
        assert_eq!(missing.error_code(), "JOURNAL_NOT_FOUND");
        assert_eq!(missing.category(), ErrorCategory::NotFound);

        let reversal = LedgerError::ReversalOfReversal(JournalEntryId::new());
        assert_eq!(reversal.error_code(), "REVERSAL_OF_REVERSAL");
        assert_eq!(reversal.category(), ErrorCategory::State);
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::EmptyJournal.http_status_code(), 400);
        assert_eq!(
            LedgerError::AccountNotFound(AccountId::new()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::PeriodNotInBookCalendar {
                book_id: BookId::new(),
                fiscal_period_id: FiscalPeriodId::new(),
            }
            .http_status_code(),
            422
        );
        assert_eq!(LedgerError::ConcurrentModification.http_status_code(), 409);
        assert_eq!(
            LedgerError::Database("test".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_period_errors_keep_their_category() {
        let err: LedgerError = PeriodError::PostingNotAllowed {
            status: PeriodStatus::HardClosed,
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::State);
        assert_eq!(err.error_code(), "PERIOD_CLOSED");
        assert_eq!(err.to_string(), "Period is HARD_CLOSED, posting not allowed");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::ConcurrentModification.is_retryable());
        assert!(!LedgerError::EmptyJournal.is_retryable());
        assert!(!LedgerError::Database("down".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedJournal {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(5000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Journal is not balanced. Debit: 100.00, Credit: 50.00"
        );

        let err = LedgerError::EntryDateOutsidePeriod {
            date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Entry date 2026-04-01 is outside the period 2026-03-01 to 2026-03-31"
        );
    }
}
