//! Fiscal period lookups.

use closebook_core::ledger::{Book, LedgerError, LedgerService};
use closebook_core::period::FiscalPeriod;
use closebook_shared::types::{BookId, CalendarId, FiscalPeriodId, OrganizationId};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::book::load_book;
use crate::entities::fiscal_periods;
use crate::error::ledger_error;

/// Read access to fiscal periods.
#[derive(Debug, Clone)]
pub struct FiscalPeriodRepository {
    db: DatabaseConnection,
}

impl FiscalPeriodRepository {
    /// Creates a new fiscal period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a period by id.
    pub async fn find(
        &self,
        fiscal_period_id: FiscalPeriodId,
    ) -> Result<FiscalPeriod, LedgerError> {
        load_period(&self.db, fiscal_period_id).await
    }

    /// Resolves a period number to a period of the book's calendar.
    pub async fn resolve(
        &self,
        organization_id: OrganizationId,
        book_id: BookId,
        fiscal_year: i32,
        period_no: i32,
        is_adjustment: bool,
    ) -> Result<FiscalPeriod, LedgerError> {
        let book = load_book(&self.db, organization_id, book_id).await?;

        fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::CalendarId.eq(book.calendar_id.into_inner()))
            .filter(fiscal_periods::Column::FiscalYear.eq(fiscal_year))
            .filter(fiscal_periods::Column::PeriodNo.eq(period_no))
            .filter(fiscal_periods::Column::IsAdjustment.eq(is_adjustment))
            .one(&self.db)
            .await
            .map_err(ledger_error)?
            .map(to_fiscal_period)
            .ok_or(LedgerError::PeriodNotResolved {
                book_id,
                fiscal_year,
                period_no,
            })
    }
}

pub(crate) async fn load_period<C: ConnectionTrait>(
    conn: &C,
    fiscal_period_id: FiscalPeriodId,
) -> Result<FiscalPeriod, LedgerError> {
    fiscal_periods::Entity::find_by_id(fiscal_period_id.into_inner())
        .one(conn)
        .await
        .map_err(ledger_error)?
        .map(to_fiscal_period)
        .ok_or(LedgerError::PeriodNotFound(fiscal_period_id))
}

/// Loads the book and period and checks the period is in the book's calendar.
pub(crate) async fn load_target<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
    book_id: BookId,
    fiscal_period_id: FiscalPeriodId,
) -> Result<(Book, FiscalPeriod), LedgerError> {
    let book = load_book(conn, organization_id, book_id).await?;
    let period = load_period(conn, fiscal_period_id).await?;
    LedgerService::validate_target(organization_id, &book, &period)?;
    Ok((book, period))
}

fn to_fiscal_period(model: fiscal_periods::Model) -> FiscalPeriod {
    FiscalPeriod {
        id: FiscalPeriodId::from_uuid(model.id),
        calendar_id: CalendarId::from_uuid(model.calendar_id),
        fiscal_year: model.fiscal_year,
        period_no: model.period_no,
        is_adjustment: model.is_adjustment,
        start_date: model.start_date,
        end_date: model.end_date,
    }
}
