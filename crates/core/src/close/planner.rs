//! Decisions the close and reopen workflows take before writing anything.

use closebook_shared::types::{AccountId, BookId, FiscalPeriodId, OrganizationId};

use super::error::CloseError;
use super::types::{CloseRun, CloseRunStatus};
use crate::ledger::{AccountInfo, AccountType};
use crate::period::CloseStatus;

/// What a close request should do given the latest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision<'a> {
    /// Return this run unchanged with `idempotent = true`.
    Idempotent(&'a CloseRun),
    /// Run the close and record it under this generation.
    Execute {
        /// Generation of the new run.
        generation: i32,
    },
}

/// Stateless planner for the close and reopen workflows.
pub struct ClosePlanner;

impl ClosePlanner {
    /// Decides between an idempotent replay and a fresh execution.
    ///
    /// Replays only when the latest run is COMPLETED for the same target status.
    /// A reopened run, a missing run, or a different target all execute.
    #[must_use]
    pub fn decide(latest: Option<&CloseRun>, requested: CloseStatus) -> CloseDecision<'_> {
        match latest {
            Some(run)
                if run.status == CloseRunStatus::Completed
                    && run.requested_close_status == requested =>
            {
                CloseDecision::Idempotent(run)
            }
            Some(run) => CloseDecision::Execute {
                generation: run.generation + 1,
            },
            None => CloseDecision::Execute { generation: 1 },
        }
    }

    /// Validates the retained earnings account.
    ///
    /// # Errors
    ///
    /// VALIDATION_ERROR when the account is unknown in the organization, not
    /// EQUITY, or does not allow posting.
    pub fn validate_retained_earnings(
        organization_id: OrganizationId,
        account_id: AccountId,
        account: Option<&AccountInfo>,
    ) -> Result<(), CloseError> {
        let account = account
            .filter(|a| a.organization_id == organization_id)
            .ok_or(CloseError::RetainedEarningsNotFound(account_id))?;
        if account.account_type != AccountType::Equity {
            return Err(CloseError::RetainedEarningsNotEquity(account_id));
        }
        if !account.allow_posting {
            return Err(CloseError::RetainedEarningsNotPostable(account_id));
        }
        Ok(())
    }

    /// Picks the runs a reopen undoes, newest generation first.
    ///
    /// Every COMPLETED run in the log still has live generated journals: a
    /// soft close tightened to hard leaves two of them.
    ///
    /// # Errors
    ///
    /// STATE_ERROR when there is no run or the latest is already reopened.
    pub fn reopen_targets(
        book_id: BookId,
        fiscal_period_id: FiscalPeriodId,
        runs: &[CloseRun],
    ) -> Result<Vec<&CloseRun>, CloseError> {
        match runs.iter().max_by_key(|run| run.generation) {
            None => Err(CloseError::NoCompletedRun {
                book_id,
                fiscal_period_id,
            }),
            Some(run) if run.status == CloseRunStatus::Reopened => {
                Err(CloseError::AlreadyReopened(run.id))
            }
            Some(_) => {
                let mut targets: Vec<&CloseRun> = runs
                    .iter()
                    .filter(|run| run.status == CloseRunStatus::Completed)
                    .collect();
                targets.sort_by_key(|run| std::cmp::Reverse(run.generation));
                Ok(targets)
            }
        }
    }

    /// Trims and checks the reopen reason.
    ///
    /// # Errors
    ///
    /// `ReopenReasonRequired` for blank reasons.
    pub fn validate_reopen_reason(reason: &str) -> Result<&str, CloseError> {
        let reason = reason.trim();
        if reason.is_empty() {
            Err(CloseError::ReopenReasonRequired)
        } else {
            Ok(reason)
        }
    }
}
