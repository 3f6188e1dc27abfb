//! Journal repository: posting, drafts, reversal and period activity.
//!
//! Every write validates through [`LedgerService`] before touching a table,
//! so a rejected journal leaves nothing behind.

use chrono::Utc;
use closebook_core::ledger::{
    Book, JournalEntry, JournalLine, JournalLineInput, JournalStatus, JournalTotals, LedgerError,
    LedgerService, LineAmount, PeriodActivity, PostJournalInput, PostingContext, ReversalContext,
    ReversalService,
};
use closebook_core::period::{FiscalPeriod, PostingPrivilege};
use closebook_shared::types::{
    AccountId, BookId, FiscalPeriodId, JournalEntryId, JournalLineId, OrganizationId, UserId,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::account::load_accounts;
use super::fiscal_period::load_target;
use super::period_status::{RowLock, lock_status};
use super::{DEFAULT_LOCK_TIMEOUT_MS, begin_serializable};
use crate::entities::{journal_entries, journal_lines, sea_orm_active_enums};
use crate::error::ledger_error;

/// Persistence for journal entries and their lines.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    lock_timeout_ms: u64,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    /// Sets how long a write waits for the period status lock.
    #[must_use]
    pub const fn with_lock_timeout(mut self, lock_timeout_ms: u64) -> Self {
        self.lock_timeout_ms = lock_timeout_ms;
        self
    }

    /// Validates and posts a journal through the standard path.
    pub async fn post(&self, input: PostJournalInput) -> Result<JournalEntry, LedgerError> {
        let txn = begin_serializable(&self.db, self.lock_timeout_ms)
            .await
            .map_err(ledger_error)?;
        let entry = post_journal(&txn, &input, PostingPrivilege::Standard, None).await?;
        txn.commit().await.map_err(ledger_error)?;

        tracing::info!(
            journal_entry_id = %entry.id,
            book_id = %entry.book_id,
            fiscal_period_id = %entry.fiscal_period_id,
            lines = entry.lines.len(),
            "Journal posted"
        );
        Ok(entry)
    }

    /// Stores a draft. Lines are checked individually; balance is not required.
    pub async fn save_draft(&self, input: PostJournalInput) -> Result<JournalEntry, LedgerError> {
        let txn = self.db.begin().await.map_err(ledger_error)?;

        let (book, period) = load_target(
            &txn,
            input.organization_id,
            input.book_id,
            input.fiscal_period_id,
        )
        .await?;
        let accounts = load_accounts(
            &txn,
            input.organization_id,
            input.lines.iter().map(|l| l.account_id),
        )
        .await?;
        LedgerService::validate_draft(&input, &book, &period, |id| accounts.get(&id).cloned())?;

        let entry = insert_entry(&txn, &input, JournalStatus::Draft, None)
            .await
            .map_err(ledger_error)?;
        txn.commit().await.map_err(ledger_error)?;

        tracing::debug!(journal_entry_id = %entry.id, "Draft saved");
        Ok(entry)
    }

    /// Posts a stored draft after running the full posting validation on it.
    pub async fn post_draft(
        &self,
        organization_id: OrganizationId,
        journal_entry_id: JournalEntryId,
    ) -> Result<JournalEntry, LedgerError> {
        let txn = begin_serializable(&self.db, self.lock_timeout_ms)
            .await
            .map_err(ledger_error)?;

        let (header, lines) = load_entry(&txn, organization_id, journal_entry_id, true).await?;
        LedgerService::ensure_draft(journal_entry_id, header.status.into())?;

        let input = stored_input(&header, &lines);
        validate_for_posting(&txn, &input, PostingPrivilege::Standard).await?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut active: journal_entries::ActiveModel = header.into();
        active.status = Set(sea_orm_active_enums::JournalStatus::Posted);
        active.posted_at = Set(Some(now));
        active.updated_at = Set(now);
        let header = active.update(&txn).await.map_err(ledger_error)?;

        txn.commit().await.map_err(ledger_error)?;

        tracing::info!(journal_entry_id = %journal_entry_id, "Draft posted");
        Ok(to_journal_entry(header, lines))
    }

    /// Reverses a posted journal into the period given by `ctx`.
    pub async fn reverse(
        &self,
        organization_id: OrganizationId,
        journal_entry_id: JournalEntryId,
        ctx: &ReversalContext,
    ) -> Result<JournalEntry, LedgerError> {
        let txn = begin_serializable(&self.db, self.lock_timeout_ms)
            .await
            .map_err(ledger_error)?;
        let reversal = reverse_journal(
            &txn,
            organization_id,
            journal_entry_id,
            ctx,
            PostingPrivilege::Standard,
        )
        .await?;
        txn.commit().await.map_err(ledger_error)?;

        tracing::info!(
            journal_entry_id = %journal_entry_id,
            reversal_entry_id = %reversal.id,
            "Journal reversed"
        );
        Ok(reversal)
    }

    /// Returns the header and ordered lines of a journal.
    pub async fn get(
        &self,
        organization_id: OrganizationId,
        journal_entry_id: JournalEntryId,
    ) -> Result<JournalEntry, LedgerError> {
        let (header, lines) = load_entry(&self.db, organization_id, journal_entry_id, false).await?;
        Ok(to_journal_entry(header, lines))
    }

    /// Computes per-account activity of the period without writing anything.
    pub async fn period_activity(
        &self,
        organization_id: OrganizationId,
        book_id: BookId,
        fiscal_period_id: FiscalPeriodId,
    ) -> Result<PeriodActivity, LedgerError> {
        let (book, period) =
            load_target(&self.db, organization_id, book_id, fiscal_period_id).await?;
        load_activity(&self.db, &book, &period).await
    }
}

/// Validates `input` against the locked period status.
async fn validate_for_posting<C: ConnectionTrait>(
    conn: &C,
    input: &PostJournalInput,
    privilege: PostingPrivilege,
) -> Result<JournalTotals, LedgerError> {
    let (book, period) = load_target(
        conn,
        input.organization_id,
        input.book_id,
        input.fiscal_period_id,
    )
    .await?;
    let status = lock_status(conn, book.id, period.id, RowLock::Shared)
        .await
        .map_err(ledger_error)?;
    let accounts = load_accounts(
        conn,
        input.organization_id,
        input.lines.iter().map(|l| l.account_id),
    )
    .await?;

    let ctx = PostingContext {
        book: &book,
        period: &period,
        status,
        privilege,
    };
    LedgerService::validate_posting(input, &ctx, |id| accounts.get(&id).cloned())
}

/// Validates and inserts a POSTED journal inside the caller's transaction.
pub(crate) async fn post_journal<C: ConnectionTrait>(
    conn: &C,
    input: &PostJournalInput,
    privilege: PostingPrivilege,
    reverses_entry_id: Option<JournalEntryId>,
) -> Result<JournalEntry, LedgerError> {
    validate_for_posting(conn, input, privilege).await?;
    insert_entry(conn, input, JournalStatus::Posted, reverses_entry_id)
        .await
        .map_err(ledger_error)
}

/// Posts the mirror of a journal and marks the original REVERSED.
pub(crate) async fn reverse_journal<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
    journal_entry_id: JournalEntryId,
    ctx: &ReversalContext,
    privilege: PostingPrivilege,
) -> Result<JournalEntry, LedgerError> {
    let (header, lines) = load_entry(conn, organization_id, journal_entry_id, true).await?;
    let original = to_journal_entry(header.clone(), lines);

    let input = ReversalService::build(&original, ctx, privilege)?;
    let reversal = post_journal(conn, &input, privilege, Some(original.id)).await?;

    let mut active: journal_entries::ActiveModel = header.into();
    active.status = Set(sea_orm_active_enums::JournalStatus::Reversed);
    active.reversed_by_entry_id = Set(Some(reversal.id.into_inner()));
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await.map_err(ledger_error)?;

    Ok(reversal)
}

/// Sums POSTED and REVERSED lines of the period per account.
pub(crate) async fn load_activity<C: ConnectionTrait>(
    conn: &C,
    book: &Book,
    period: &FiscalPeriod,
) -> Result<PeriodActivity, LedgerError> {
    let entry_ids: Vec<uuid::Uuid> = journal_entries::Entity::find()
        .filter(journal_entries::Column::BookId.eq(book.id.into_inner()))
        .filter(journal_entries::Column::FiscalPeriodId.eq(period.id.into_inner()))
        .filter(journal_entries::Column::Status.is_in([
            sea_orm_active_enums::JournalStatus::Posted,
            sea_orm_active_enums::JournalStatus::Reversed,
        ]))
        .all(conn)
        .await
        .map_err(ledger_error)?
        .into_iter()
        .map(|e| e.id)
        .collect();

    let mut activity = PeriodActivity::new();
    if entry_ids.is_empty() {
        return Ok(activity);
    }

    let lines = journal_lines::Entity::find()
        .filter(journal_lines::Column::JournalEntryId.is_in(entry_ids))
        .all(conn)
        .await
        .map_err(ledger_error)?;

    let accounts = load_accounts(
        conn,
        book.organization_id,
        lines.iter().map(|l| AccountId::from_uuid(l.account_id)),
    )
    .await?;

    for line in &lines {
        let account_id = AccountId::from_uuid(line.account_id);
        let account = accounts
            .get(&account_id)
            .ok_or(LedgerError::AccountNotFound(account_id))?;
        activity.record(account, line.debit_base, line.credit_base);
    }

    Ok(activity)
}

async fn load_entry<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
    journal_entry_id: JournalEntryId,
    for_update: bool,
) -> Result<(journal_entries::Model, Vec<journal_lines::Model>), LedgerError> {
    let mut query = journal_entries::Entity::find_by_id(journal_entry_id.into_inner())
        .filter(journal_entries::Column::OrganizationId.eq(organization_id.into_inner()));
    if for_update {
        query = query.lock_exclusive();
    }

    let header = query
        .one(conn)
        .await
        .map_err(ledger_error)?
        .ok_or(LedgerError::JournalNotFound(journal_entry_id))?;

    let lines = journal_lines::Entity::find()
        .filter(journal_lines::Column::JournalEntryId.eq(header.id))
        .order_by_asc(journal_lines::Column::LineNo)
        .all(conn)
        .await
        .map_err(ledger_error)?;

    Ok((header, lines))
}

async fn insert_entry<C: ConnectionTrait>(
    conn: &C,
    input: &PostJournalInput,
    status: JournalStatus,
    reverses_entry_id: Option<JournalEntryId>,
) -> Result<JournalEntry, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();

    let header = journal_entries::ActiveModel {
        id: Set(JournalEntryId::new().into_inner()),
        organization_id: Set(input.organization_id.into_inner()),
        book_id: Set(input.book_id.into_inner()),
        fiscal_period_id: Set(input.fiscal_period_id.into_inner()),
        entry_date: Set(input.entry_date),
        document_date: Set(input.document_date),
        currency_code: Set(input.currency_code.clone()),
        source_type: Set(input.source_type.into()),
        description: Set(input.description.clone()),
        status: Set(status.into()),
        reverses_entry_id: Set(reverses_entry_id.map(JournalEntryId::into_inner)),
        reversed_by_entry_id: Set(None),
        created_by: Set(input.created_by.into_inner()),
        posted_at: Set((status == JournalStatus::Posted).then_some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    let mut lines = Vec::with_capacity(input.lines.len());
    for (line_no, line) in (1..).zip(&input.lines) {
        let model = journal_lines::ActiveModel {
            id: Set(JournalLineId::new().into_inner()),
            journal_entry_id: Set(header.id),
            line_no: Set(line_no),
            account_id: Set(line.account_id.into_inner()),
            currency_code: Set(line.amount.currency_code.clone()),
            amount_txn: Set(line.amount.amount_txn),
            debit_base: Set(line.amount.debit_base),
            credit_base: Set(line.amount.credit_base),
            description: Set(line.description.clone()),
        }
        .insert(conn)
        .await?;
        lines.push(model);
    }

    Ok(to_journal_entry(header, lines))
}

/// Rebuilds the posting input of a stored draft.
fn stored_input(
    header: &journal_entries::Model,
    lines: &[journal_lines::Model],
) -> PostJournalInput {
    let mut ordered: Vec<&journal_lines::Model> = lines.iter().collect();
    ordered.sort_by_key(|l| l.line_no);

    PostJournalInput {
        organization_id: OrganizationId::from_uuid(header.organization_id),
        book_id: BookId::from_uuid(header.book_id),
        fiscal_period_id: FiscalPeriodId::from_uuid(header.fiscal_period_id),
        entry_date: header.entry_date,
        document_date: header.document_date,
        currency_code: header.currency_code.trim().to_string(),
        source_type: header.source_type.into(),
        description: header.description.clone(),
        lines: ordered
            .into_iter()
            .map(|l| JournalLineInput {
                account_id: AccountId::from_uuid(l.account_id),
                amount: to_line_amount(l),
                description: l.description.clone(),
            })
            .collect(),
        created_by: UserId::from_uuid(header.created_by),
    }
}

fn to_line_amount(model: &journal_lines::Model) -> LineAmount {
    LineAmount {
        currency_code: model.currency_code.trim().to_string(),
        amount_txn: model.amount_txn,
        debit_base: model.debit_base,
        credit_base: model.credit_base,
    }
}

pub(crate) fn to_journal_entry(
    header: journal_entries::Model,
    mut lines: Vec<journal_lines::Model>,
) -> JournalEntry {
    lines.sort_by_key(|l| l.line_no);

    JournalEntry {
        id: JournalEntryId::from_uuid(header.id),
        organization_id: OrganizationId::from_uuid(header.organization_id),
        book_id: BookId::from_uuid(header.book_id),
        fiscal_period_id: FiscalPeriodId::from_uuid(header.fiscal_period_id),
        entry_date: header.entry_date,
        currency_code: header.currency_code.trim().to_string(),
        source_type: header.source_type.into(),
        description: header.description,
        status: header.status.into(),
        reverses_entry_id: header.reverses_entry_id.map(JournalEntryId::from_uuid),
        lines: lines
            .iter()
            .map(|l| JournalLine {
                id: JournalLineId::from_uuid(l.id),
                line_no: l.line_no,
                account_id: AccountId::from_uuid(l.account_id),
                amount: to_line_amount(l),
                description: l.description.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use closebook_core::ledger::{Side, SourceType};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn header(status: sea_orm_active_enums::JournalStatus) -> journal_entries::Model {
        let now: DateTimeWithTimeZone = Utc::now().into();
        journal_entries::Model {
            id: Uuid::now_v7(),
            organization_id: Uuid::now_v7(),
            book_id: Uuid::now_v7(),
            fiscal_period_id: Uuid::now_v7(),
            entry_date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            document_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            currency_code: "USD".into(),
            source_type: sea_orm_active_enums::JournalSourceType::Integration,
            description: "Payroll accrual".into(),
            status,
            reverses_entry_id: None,
            reversed_by_entry_id: None,
            created_by: Uuid::now_v7(),
            posted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(
        entry_id: Uuid,
        line_no: i32,
        debit: rust_decimal::Decimal,
        credit: rust_decimal::Decimal,
    ) -> journal_lines::Model {
        journal_lines::Model {
            id: Uuid::now_v7(),
            journal_entry_id: entry_id,
            line_no,
            account_id: Uuid::now_v7(),
            currency_code: "USD".into(),
            amount_txn: debit + credit,
            debit_base: debit,
            credit_base: credit,
            description: None,
        }
    }

    #[test]
    fn test_to_journal_entry_orders_lines() {
        let header = header(sea_orm_active_enums::JournalStatus::Posted);
        let lines = vec![
            line(header.id, 2, dec!(0), dec!(500)),
            line(header.id, 1, dec!(500), dec!(0)),
        ];
        let entry = to_journal_entry(header, lines);

        assert_eq!(entry.status, JournalStatus::Posted);
        assert_eq!(entry.source_type, SourceType::Integration);
        assert_eq!(entry.lines[0].line_no, 1);
        assert_eq!(entry.lines[0].amount.side(), Some(Side::Debit));
        assert_eq!(entry.lines[1].amount.side(), Some(Side::Credit));
    }

    #[test]
    fn test_stored_input_keeps_draft_header() {
        let header = header(sea_orm_active_enums::JournalStatus::Draft);
        let lines = vec![
            line(header.id, 2, dec!(0), dec!(75.5)),
            line(header.id, 1, dec!(75.5), dec!(0)),
        ];
        let input = stored_input(&header, &lines);

        assert_eq!(input.document_date, header.document_date);
        assert_eq!(input.created_by, UserId::from_uuid(header.created_by));
        assert_eq!(input.lines[0].amount.debit_base, dec!(75.5));
        assert_eq!(input.lines[1].amount.credit_base, dec!(75.5));
    }
}
