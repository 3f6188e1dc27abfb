//! Close run domain types.

use chrono::{DateTime, Utc};
use closebook_shared::types::{
    AccountId, BookId, CloseRunId, FiscalPeriodId, JournalEntryId, OrganizationId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::JournalLineInput;
use crate::period::CloseStatus;

/// Lifecycle of a close run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloseRunStatus {
    /// The close took effect.
    Completed,
    /// The close was undone by a reopen. Kept as history.
    Reopened,
}

/// One execution of the close workflow for a (book, period).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloseRun {
    /// Unique identifier.
    pub id: CloseRunId,
    /// Book.
    pub book_id: BookId,
    /// Fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Position in the run log of the (book, period), starting at 1.
    pub generation: i32,
    /// Requested target status.
    pub requested_close_status: CloseStatus,
    /// Generated carry-forward journal, absent when it had no lines.
    pub carry_forward_journal_entry_id: Option<JournalEntryId>,
    /// Generated year-end closing journal, absent when it had no lines.
    pub year_end_journal_entry_id: Option<JournalEntryId>,
    /// Net income closed into retained earnings.
    pub net_income: Decimal,
    /// Lifecycle status.
    pub status: CloseRunStatus,
    /// Free-form note supplied with the close.
    pub note: Option<String>,
    /// Who ran the close.
    pub created_by: UserId,
    /// When the close ran.
    pub created_at: DateTime<Utc>,
    /// Who reopened the period.
    pub reopened_by: Option<UserId>,
    /// When the period was reopened.
    pub reopened_at: Option<DateTime<Utc>>,
    /// Why the period was reopened.
    pub reopen_reason: Option<String>,
}

impl CloseRun {
    /// Returns the generated journal IDs, carry-forward first.
    #[must_use]
    pub fn generated_journal_ids(&self) -> Vec<JournalEntryId> {
        self.carry_forward_journal_entry_id
            .into_iter()
            .chain(self.year_end_journal_entry_id)
            .collect()
    }

    /// Returns true while the close is in effect.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == CloseRunStatus::Completed
    }
}

/// A close request.
#[derive(Debug, Clone)]
pub struct CloseRunRequest {
    /// Tenant the caller acts in.
    pub organization_id: OrganizationId,
    /// Book.
    pub book_id: BookId,
    /// Fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Target status.
    pub close_status: CloseStatus,
    /// Equity account receiving net income.
    pub retained_earnings_account_id: AccountId,
    /// Free-form note.
    pub note: Option<String>,
    /// Acting principal.
    pub requested_by: UserId,
}

/// Result of a close request.
#[derive(Debug, Clone, Serialize)]
pub struct CloseOutcome {
    /// The new run, or the existing one for an idempotent replay.
    pub run: CloseRun,
    /// True when the request matched the latest completed run and nothing was written.
    pub idempotent: bool,
}

/// A reopen request.
#[derive(Debug, Clone)]
pub struct ReopenRequest {
    /// Tenant the caller acts in.
    pub organization_id: OrganizationId,
    /// Book.
    pub book_id: BookId,
    /// Fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Why the period is reopened.
    pub reason: String,
    /// Acting principal.
    pub requested_by: UserId,
}

/// Result of a reopen.
#[derive(Debug, Clone, Serialize)]
pub struct ReopenOutcome {
    /// The latest run, now REOPENED.
    pub run: CloseRun,
    /// Every run this reopen undid, newest generation first.
    pub reopened_run_ids: Vec<CloseRunId>,
    /// Reversal journals, newest run first and carry-forward before
    /// year-end within a run.
    pub reversal_journal_entry_ids: Vec<JournalEntryId>,
}

/// Lines of the two journals a close generates.
#[derive(Debug, Clone, Default)]
pub struct CloseJournals {
    /// Zeroes temporary accounts into retained earnings.
    pub year_end: Vec<JournalLineInput>,
    /// Closes out and brings forward permanent balances.
    pub carry_forward: Vec<JournalLineInput>,
    /// Net income of the period.
    pub net_income: Decimal,
}
