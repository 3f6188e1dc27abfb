//! Period status rows and their locks.
//!
//! A (book, period) pair without a row is OPEN. The row is created on first
//! use and then locked: FOR SHARE by posting, FOR UPDATE by close and reopen.

use chrono::Utc;
use closebook_core::ledger::LedgerError;
use closebook_core::period::PeriodStatus;
use closebook_shared::types::{BookId, FiscalPeriodId, OrganizationId, UserId};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    QuerySelect, Set, Statement,
};

use super::fiscal_period::load_target;
use crate::entities::period_statuses;
use crate::error::ledger_error;

const ENSURE_STATUS_ROW_SQL: &str = r"
INSERT INTO period_statuses (book_id, fiscal_period_id, status)
VALUES ($1, $2, 'open')
ON CONFLICT (book_id, fiscal_period_id) DO NOTHING
";

/// Row lock strength on the status row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowLock {
    /// `FOR SHARE`, taken by posting.
    Shared,
    /// `FOR UPDATE`, taken by close and reopen.
    Exclusive,
}

/// Read access to period statuses.
#[derive(Debug, Clone)]
pub struct PeriodStatusRepository {
    db: DatabaseConnection,
}

impl PeriodStatusRepository {
    /// Creates a new period status repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the status of the period for the book.
    pub async fn get(
        &self,
        organization_id: OrganizationId,
        book_id: BookId,
        fiscal_period_id: FiscalPeriodId,
    ) -> Result<PeriodStatus, LedgerError> {
        load_target(&self.db, organization_id, book_id, fiscal_period_id).await?;

        let row = period_statuses::Entity::find_by_id((
            book_id.into_inner(),
            fiscal_period_id.into_inner(),
        ))
        .one(&self.db)
        .await
        .map_err(ledger_error)?;

        Ok(row.map_or(PeriodStatus::Open, |r| r.status.into()))
    }
}

/// Creates the status row if missing, locks it and returns the status.
pub(crate) async fn lock_status<C: ConnectionTrait>(
    conn: &C,
    book_id: BookId,
    fiscal_period_id: FiscalPeriodId,
    lock: RowLock,
) -> Result<PeriodStatus, DbErr> {
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        ENSURE_STATUS_ROW_SQL,
        [book_id.into_inner().into(), fiscal_period_id.into_inner().into()],
    ))
    .await?;

    let query =
        period_statuses::Entity::find_by_id((book_id.into_inner(), fiscal_period_id.into_inner()));
    let query = match lock {
        RowLock::Shared => query.lock_shared(),
        RowLock::Exclusive => query.lock_exclusive(),
    };

    let row = query.one(conn).await?.ok_or_else(|| {
        DbErr::RecordNotFound(format!("period status {book_id}/{fiscal_period_id}"))
    })?;
    Ok(row.status.into())
}

/// Writes a new status; the row must already be locked by the caller.
pub(crate) async fn set_status<C: ConnectionTrait>(
    conn: &C,
    book_id: BookId,
    fiscal_period_id: FiscalPeriodId,
    status: PeriodStatus,
    updated_by: UserId,
) -> Result<(), DbErr> {
    period_statuses::ActiveModel {
        book_id: Set(book_id.into_inner()),
        fiscal_period_id: Set(fiscal_period_id.into_inner()),
        status: Set(status.into()),
        updated_by: Set(Some(updated_by.into_inner())),
        updated_at: Set(Utc::now().into()),
    }
    .update(conn)
    .await?;
    Ok(())
}
