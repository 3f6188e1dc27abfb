//! Close and reopen workflows.
//!
//! Both run in one SERIALIZABLE transaction that starts by locking the
//! (book, period) status row FOR UPDATE. A second close or reopen of the same
//! period waits up to `lock_timeout_ms` and then fails with a retryable
//! conflict. The unique (book, period, generation) index backs the lock.

use chrono::Utc;
use closebook_core::close::{
    CloseDecision, CloseError, CloseJournalGenerator, CloseOutcome, ClosePlanner, CloseRun,
    CloseRunRequest, ReopenOutcome, ReopenRequest,
};
use closebook_core::ledger::{Book, JournalLineInput, LedgerError, ReversalContext, SourceType};
use closebook_core::period::{FiscalPeriod, PostingPrivilege};
use closebook_shared::types::{
    BookId, CloseRunId, FiscalPeriodId, JournalEntryId, OrganizationId, UserId,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::account::load_accounts;
use super::book::load_book;
use super::fiscal_period::load_target;
use super::journal::{load_activity, post_journal, reverse_journal};
use super::period_status::{RowLock, lock_status, set_status};
use super::{DEFAULT_LOCK_TIMEOUT_MS, begin_serializable};
use crate::entities::{period_close_runs, sea_orm_active_enums};
use crate::error::close_error;

/// Runs and records period closes and reopens.
#[derive(Debug, Clone)]
pub struct CloseRunRepository {
    db: DatabaseConnection,
    lock_timeout_ms: u64,
}

impl CloseRunRepository {
    /// Creates a new close run repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    /// Sets how long a close or reopen waits for the period lock.
    #[must_use]
    pub const fn with_lock_timeout(mut self, lock_timeout_ms: u64) -> Self {
        self.lock_timeout_ms = lock_timeout_ms;
        self
    }

    /// Closes the period, or replays the latest run if it already closed it
    /// to the requested status.
    pub async fn close_run(&self, request: CloseRunRequest) -> Result<CloseOutcome, CloseError> {
        let (book_id, fiscal_period_id) = (request.book_id, request.fiscal_period_id);
        let db_err = move |e: DbErr| close_error(e, book_id, fiscal_period_id);

        let txn = begin_serializable(&self.db, self.lock_timeout_ms)
            .await
            .map_err(db_err)?;

        let outcome = match close_in(&txn, &request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    book_id = %book_id,
                    fiscal_period_id = %fiscal_period_id,
                    code = err.error_code(),
                    error = %err,
                    "Close rejected"
                );
                return Err(err);
            }
        };

        txn.commit().await.map_err(db_err)?;

        if outcome.idempotent {
            tracing::info!(
                book_id = %book_id,
                fiscal_period_id = %fiscal_period_id,
                run_id = %outcome.run.id,
                "Close replayed"
            );
        } else {
            tracing::info!(
                book_id = %book_id,
                fiscal_period_id = %fiscal_period_id,
                run_id = %outcome.run.id,
                generation = outcome.run.generation,
                status = %outcome.run.requested_close_status,
                net_income = %outcome.run.net_income,
                "Period closed"
            );
        }

        Ok(outcome)
    }

    /// Reverses the latest run's generated journals and reopens the period.
    pub async fn reopen(&self, request: ReopenRequest) -> Result<ReopenOutcome, CloseError> {
        let (book_id, fiscal_period_id) = (request.book_id, request.fiscal_period_id);
        let db_err = move |e: DbErr| close_error(e, book_id, fiscal_period_id);

        let txn = begin_serializable(&self.db, self.lock_timeout_ms)
            .await
            .map_err(db_err)?;

        let outcome = match reopen_in(&txn, &request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    book_id = %book_id,
                    fiscal_period_id = %fiscal_period_id,
                    code = err.error_code(),
                    error = %err,
                    "Reopen rejected"
                );
                return Err(err);
            }
        };

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            book_id = %book_id,
            fiscal_period_id = %fiscal_period_id,
            run_id = %outcome.run.id,
            runs = outcome.reopened_run_ids.len(),
            reversals = outcome.reversal_journal_entry_ids.len(),
            "Period reopened"
        );

        Ok(outcome)
    }

    /// Returns the run log of the period, oldest generation first.
    pub async fn list_runs(
        &self,
        organization_id: OrganizationId,
        book_id: BookId,
        fiscal_period_id: FiscalPeriodId,
    ) -> Result<Vec<CloseRun>, CloseError> {
        load_book(&self.db, organization_id, book_id).await?;

        let runs = period_runs(&self.db, book_id, fiscal_period_id)
            .await
            .map_err(|e| close_error(e, book_id, fiscal_period_id))?;

        Ok(runs.into_iter().map(to_close_run).collect())
    }
}

async fn close_in(
    txn: &DatabaseTransaction,
    request: &CloseRunRequest,
) -> Result<CloseOutcome, CloseError> {
    let db_err = |e: DbErr| close_error(e, request.book_id, request.fiscal_period_id);

    let (book, period) = load_target(
        txn,
        request.organization_id,
        request.book_id,
        request.fiscal_period_id,
    )
    .await?;
    let status = lock_status(txn, book.id, period.id, RowLock::Exclusive)
        .await
        .map_err(db_err)?;
    let latest = latest_run(txn, book.id, period.id)
        .await
        .map_err(db_err)?
        .map(to_close_run);

    let generation = match ClosePlanner::decide(latest.as_ref(), request.close_status) {
        CloseDecision::Idempotent(run) => {
            return Ok(CloseOutcome {
                run: run.clone(),
                idempotent: true,
            });
        }
        CloseDecision::Execute { generation } => generation,
    };
    let next_status = status.close(request.close_status)?;

    let retained_id = request.retained_earnings_account_id;
    let retained = load_accounts(txn, request.organization_id, [retained_id])
        .await?
        .remove(&retained_id);
    ClosePlanner::validate_retained_earnings(
        request.organization_id,
        retained_id,
        retained.as_ref(),
    )?;
    let retained = retained.ok_or(CloseError::RetainedEarningsNotFound(retained_id))?;

    let activity = load_activity(txn, &book, &period).await?;
    let journals = CloseJournalGenerator::generate(&activity, &retained, &book.base_currency)?;

    let year_end = post_generated(
        txn,
        &book,
        &period,
        SourceType::YearEndClose,
        journals.year_end,
        request.requested_by,
    )
    .await?;
    let carry_forward = post_generated(
        txn,
        &book,
        &period,
        SourceType::CarryForward,
        journals.carry_forward,
        request.requested_by,
    )
    .await?;

    set_status(txn, book.id, period.id, next_status, request.requested_by)
        .await
        .map_err(db_err)?;

    let run = period_close_runs::ActiveModel {
        id: Set(CloseRunId::new().into_inner()),
        book_id: Set(book.id.into_inner()),
        fiscal_period_id: Set(period.id.into_inner()),
        generation: Set(generation),
        requested_close_status: Set(request.close_status.into()),
        carry_forward_journal_entry_id: Set(carry_forward.map(JournalEntryId::into_inner)),
        year_end_journal_entry_id: Set(year_end.map(JournalEntryId::into_inner)),
        net_income: Set(journals.net_income),
        status: Set(sea_orm_active_enums::CloseRunStatus::Completed),
        note: Set(request.note.clone()),
        created_by: Set(request.requested_by.into_inner()),
        created_at: Set(Utc::now().into()),
        reopened_by: Set(None),
        reopened_at: Set(None),
        reopen_reason: Set(None),
    }
    .insert(txn)
    .await
    .map_err(db_err)?;

    Ok(CloseOutcome {
        run: to_close_run(run),
        idempotent: false,
    })
}

async fn reopen_in(
    txn: &DatabaseTransaction,
    request: &ReopenRequest,
) -> Result<ReopenOutcome, CloseError> {
    let db_err = |e: DbErr| close_error(e, request.book_id, request.fiscal_period_id);

    let reason = ClosePlanner::validate_reopen_reason(&request.reason)?;

    let (book, period) = load_target(
        txn,
        request.organization_id,
        request.book_id,
        request.fiscal_period_id,
    )
    .await?;
    let status = lock_status(txn, book.id, period.id, RowLock::Exclusive)
        .await
        .map_err(db_err)?;
    let models = period_runs(txn, book.id, period.id).await.map_err(db_err)?;
    let runs: Vec<CloseRun> = models.iter().cloned().map(to_close_run).collect();

    let targets = ClosePlanner::reopen_targets(book.id, period.id, &runs)?;
    let next_status = status.reopen()?;

    let ctx = ReversalContext {
        fiscal_period_id: period.id,
        entry_date: period.end_date,
        description: None,
        created_by: request.requested_by,
    };
    let mut reversal_journal_entry_ids = Vec::new();
    for run in &targets {
        for journal_entry_id in run.generated_journal_ids() {
            let reversal = reverse_journal(
                txn,
                book.organization_id,
                journal_entry_id,
                &ctx,
                PostingPrivilege::CloseWorkflow,
            )
            .await?;
            reversal_journal_entry_ids.push(reversal.id);
        }
    }

    set_status(txn, book.id, period.id, next_status, request.requested_by)
        .await
        .map_err(db_err)?;

    let reopened_at = Utc::now();
    let mut reopened = Vec::with_capacity(targets.len());
    for run in &targets {
        let Some(model) = models.iter().find(|m| m.id == run.id.into_inner()) else {
            continue;
        };
        let mut active: period_close_runs::ActiveModel = model.clone().into();
        active.status = Set(sea_orm_active_enums::CloseRunStatus::Reopened);
        active.reopened_by = Set(Some(request.requested_by.into_inner()));
        active.reopened_at = Set(Some(reopened_at.into()));
        active.reopen_reason = Set(Some(reason.to_string()));
        reopened.push(to_close_run(active.update(txn).await.map_err(db_err)?));
    }

    let reopened_run_ids = reopened.iter().map(|run| run.id).collect();
    let run = reopened.into_iter().next().ok_or(CloseError::NoCompletedRun {
        book_id: book.id,
        fiscal_period_id: period.id,
    })?;

    Ok(ReopenOutcome {
        run,
        reopened_run_ids,
        reversal_journal_entry_ids,
    })
}

/// Posts a generated journal through the close workflow path; empty journals
/// are skipped.
async fn post_generated<C: ConnectionTrait>(
    conn: &C,
    book: &Book,
    period: &FiscalPeriod,
    source_type: SourceType,
    lines: Vec<JournalLineInput>,
    created_by: UserId,
) -> Result<Option<JournalEntryId>, LedgerError> {
    if lines.is_empty() {
        return Ok(None);
    }
    let input = CloseJournalGenerator::journal_input(book, period, source_type, lines, created_by);
    let entry = post_journal(conn, &input, PostingPrivilege::CloseWorkflow, None).await?;
    Ok(Some(entry.id))
}

async fn period_runs<C: ConnectionTrait>(
    conn: &C,
    book_id: BookId,
    fiscal_period_id: FiscalPeriodId,
) -> Result<Vec<period_close_runs::Model>, DbErr> {
    period_close_runs::Entity::find()
        .filter(period_close_runs::Column::BookId.eq(book_id.into_inner()))
        .filter(period_close_runs::Column::FiscalPeriodId.eq(fiscal_period_id.into_inner()))
        .order_by_asc(period_close_runs::Column::Generation)
        .all(conn)
        .await
}

async fn latest_run<C: ConnectionTrait>(
    conn: &C,
    book_id: BookId,
    fiscal_period_id: FiscalPeriodId,
) -> Result<Option<period_close_runs::Model>, DbErr> {
    period_close_runs::Entity::find()
        .filter(period_close_runs::Column::BookId.eq(book_id.into_inner()))
        .filter(period_close_runs::Column::FiscalPeriodId.eq(fiscal_period_id.into_inner()))
        .order_by_desc(period_close_runs::Column::Generation)
        .one(conn)
        .await
}

fn to_close_run(model: period_close_runs::Model) -> CloseRun {
    CloseRun {
        id: CloseRunId::from_uuid(model.id),
        book_id: BookId::from_uuid(model.book_id),
        fiscal_period_id: FiscalPeriodId::from_uuid(model.fiscal_period_id),
        generation: model.generation,
        requested_close_status: model.requested_close_status.into(),
        carry_forward_journal_entry_id: model
            .carry_forward_journal_entry_id
            .map(JournalEntryId::from_uuid),
        year_end_journal_entry_id: model.year_end_journal_entry_id.map(JournalEntryId::from_uuid),
        net_income: model.net_income,
        status: model.status.into(),
        note: model.note,
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.into(),
        reopened_by: model.reopened_by.map(UserId::from_uuid),
        reopened_at: model.reopened_at.map(Into::into),
        reopen_reason: model.reopen_reason,
    }
}
