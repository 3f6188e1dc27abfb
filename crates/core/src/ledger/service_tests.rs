use chrono::NaiveDate;
use closebook_shared::types::{BookId, CalendarId, FiscalPeriodId, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::ledger::types::{AccountType, LineAmount, Side, SourceType};
use crate::period::PeriodError;

struct Fixture {
    org: OrganizationId,
    book: Book,
    period: FiscalPeriod,
    cash: AccountInfo,
    revenue: AccountInfo,
    header: AccountInfo,
}

fn account(org: OrganizationId, code: &str, account_type: AccountType) -> AccountInfo {
    AccountInfo {
        id: AccountId::new(),
        organization_id: org,
        code: code.to_string(),
        account_type,
        normal_side: account_type.conventional_normal_side(),
        allow_posting: true,
        parent_account_id: None,
    }
}

fn fixture() -> Fixture {
    let org = OrganizationId::new();
    let calendar_id = CalendarId::new();
    let mut header = account(org, "1", AccountType::Asset);
    header.allow_posting = false;
    Fixture {
        org,
        book: Book {
            id: BookId::new(),
            organization_id: org,
            code: "LOCAL".into(),
            base_currency: "USD".into(),
            calendar_id,
        },
        period: FiscalPeriod {
            id: FiscalPeriodId::new(),
            calendar_id,
            fiscal_year: 2026,
            period_no: 3,
            is_adjustment: false,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        },
        cash: account(org, "1000", AccountType::Asset),
        revenue: account(org, "4000", AccountType::Revenue),
        header,
    }
}

impl Fixture {
    fn lookup(&self) -> impl Fn(AccountId) -> Option<AccountInfo> + '_ {
        move |id| {
            [&self.cash, &self.revenue, &self.header]
                .into_iter()
                .find(|a| a.id == id)
                .cloned()
        }
    }

    fn ctx(&self, status: PeriodStatus, privilege: PostingPrivilege) -> PostingContext<'_> {
        PostingContext {
            book: &self.book,
            period: &self.period,
            status,
            privilege,
        }
    }

    fn input(&self, lines: Vec<(AccountId, Side, Decimal)>) -> PostJournalInput {
        PostJournalInput {
            organization_id: self.org,
            book_id: self.book.id,
            fiscal_period_id: self.period.id,
            entry_date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            document_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            currency_code: "USD".into(),
            source_type: SourceType::Manual,
            description: "Cash sale".into(),
            lines: lines
                .into_iter()
                .map(|(account_id, side, amount)| JournalLineInput {
                    account_id,
                    amount: LineAmount::in_base(side, "USD", amount),
                    description: None,
                })
                .collect(),
            created_by: UserId::new(),
        }
    }

    fn sale(&self, debit: Decimal, credit: Decimal) -> PostJournalInput {
        self.input(vec![
            (self.cash.id, Side::Debit, debit),
            (self.revenue.id, Side::Credit, credit),
        ])
    }
}

#[test]
fn test_validate_balanced_posting() {
    let f = fixture();
    let totals = LedgerService::validate_posting(
        &f.sale(dec!(100), dec!(100)),
        &f.ctx(PeriodStatus::Open, PostingPrivilege::Standard),
        f.lookup(),
    )
    .unwrap();

    assert_eq!(totals.debit, dec!(100));
    assert_eq!(totals.credit, dec!(100));
}

#[test]
fn test_unbalanced_posting_rejected() {
    let f = fixture();
    let err = LedgerService::validate_posting(
        &f.sale(dec!(100), dec!(90)),
        &f.ctx(PeriodStatus::Open, PostingPrivilege::Standard),
        f.lookup(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        LedgerError::UnbalancedJournal {
            debit: dec!(100),
            credit: dec!(90),
        }
    );
}

#[test]
fn test_closed_period_rejects_standard_posting() {
    let f = fixture();
    for status in [PeriodStatus::SoftClosed, PeriodStatus::HardClosed] {
        let err = LedgerService::validate_posting(
            &f.sale(dec!(100), dec!(100)),
            &f.ctx(status, PostingPrivilege::Standard),
            f.lookup(),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::Period(PeriodError::PostingNotAllowed { status }));
        assert_eq!(err.error_code(), "PERIOD_CLOSED");
        assert_eq!(err.category(), closebook_shared::ErrorCategory::State);
    }
}

#[test]
fn test_close_workflow_posts_into_closed_period() {
    let f = fixture();
    let result = LedgerService::validate_posting(
        &f.sale(dec!(100), dec!(100)),
        &f.ctx(PeriodStatus::HardClosed, PostingPrivilege::CloseWorkflow),
        f.lookup(),
    );
    assert!(result.is_ok());
}

#[test]
fn test_foreign_book_is_not_found() {
    let mut f = fixture();
    f.book.organization_id = OrganizationId::new();
    let err = LedgerService::validate_posting(
        &f.sale(dec!(1), dec!(1)),
        &f.ctx(PeriodStatus::Open, PostingPrivilege::Standard),
        f.lookup(),
    )
    .unwrap_err();
    assert_eq!(err, LedgerError::BookNotFound(f.book.id));
}

#[test]
fn test_period_of_other_calendar_is_state_error() {
    let mut f = fixture();
    f.period.calendar_id = CalendarId::new();
    let err = LedgerService::validate_posting(
        &f.sale(dec!(1), dec!(1)),
        &f.ctx(PeriodStatus::Open, PostingPrivilege::Standard),
        f.lookup(),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::PeriodNotInBookCalendar { .. }));
    assert_eq!(err.http_status_code(), 422);
}

#[test]
fn test_entry_date_outside_period() {
    let f = fixture();
    let mut input = f.sale(dec!(1), dec!(1));
    input.entry_date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
    let err = LedgerService::validate_posting(
        &input,
        &f.ctx(PeriodStatus::Open, PostingPrivilege::Standard),
        f.lookup(),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::EntryDateOutsidePeriod { .. }));
}

#[test]
fn test_unknown_and_foreign_accounts_not_found() {
    let f = fixture();
    let stranger = AccountId::new();
    let input = f.input(vec![
        (stranger, Side::Debit, dec!(5)),
        (f.revenue.id, Side::Credit, dec!(5)),
    ]);
    let err = LedgerService::validate_posting(
        &input,
        &f.ctx(PeriodStatus::Open, PostingPrivilege::Standard),
        f.lookup(),
    )
    .unwrap_err();
    assert_eq!(err, LedgerError::AccountNotFound(stranger));

    let foreign = account(OrganizationId::new(), "1000", AccountType::Asset);
    let foreign_id = foreign.id;
    let input = f.input(vec![
        (foreign_id, Side::Debit, dec!(5)),
        (f.revenue.id, Side::Credit, dec!(5)),
    ]);
    let err = LedgerService::validate_posting(
        &input,
        &f.ctx(PeriodStatus::Open, PostingPrivilege::Standard),
        move |id| (id == foreign_id).then(|| foreign.clone()),
    )
    .unwrap_err();
    assert_eq!(err, LedgerError::AccountNotFound(foreign_id));
}

#[test]
fn test_header_account_not_postable() {
    let f = fixture();
    let input = f.input(vec![
        (f.header.id, Side::Debit, dec!(5)),
        (f.revenue.id, Side::Credit, dec!(5)),
    ]);
    let err = LedgerService::validate_posting(
        &input,
        &f.ctx(PeriodStatus::Open, PostingPrivilege::Standard),
        f.lookup(),
    )
    .unwrap_err();
    assert_eq!(err, LedgerError::AccountNotPostable(f.header.id));
}

#[test]
fn test_blank_description_rejected() {
    let f = fixture();
    let mut input = f.sale(dec!(1), dec!(1));
    input.description = "  ".into();
    let err = LedgerService::validate_posting(
        &input,
        &f.ctx(PeriodStatus::Open, PostingPrivilege::Standard),
        f.lookup(),
    )
    .unwrap_err();
    assert_eq!(err, LedgerError::MissingDescription);
}

#[test]
fn test_draft_may_be_unbalanced_and_in_closed_period() {
    let f = fixture();
    let totals =
        LedgerService::validate_draft(&f.sale(dec!(100), dec!(40)), &f.book, &f.period, f.lookup())
            .unwrap();
    assert_eq!(totals.difference(), dec!(60));
}

#[test]
fn test_draft_still_checks_accounts() {
    let f = fixture();
    let input = f.input(vec![(f.header.id, Side::Debit, dec!(5))]);
    let err = LedgerService::validate_draft(&input, &f.book, &f.period, f.lookup()).unwrap_err();
    assert_eq!(err, LedgerError::AccountNotPostable(f.header.id));
}

#[test]
fn test_allow_posting_change() {
    let f = fixture();
    assert!(LedgerService::validate_allow_posting_change(&f.header, true, 0).is_ok());
    assert!(LedgerService::validate_allow_posting_change(&f.header, false, 3).is_ok());
    assert_eq!(
        LedgerService::validate_allow_posting_change(&f.header, true, 3),
        Err(LedgerError::AccountHasChildren(f.header.id))
    );
}

#[test]
fn test_ensure_draft() {
    let id = JournalEntryId::new();
    assert!(LedgerService::ensure_draft(id, JournalStatus::Draft).is_ok());
    assert_eq!(
        LedgerService::ensure_draft(id, JournalStatus::Posted),
        Err(LedgerError::NotDraft(id))
    );
    assert_eq!(
        LedgerService::ensure_draft(id, JournalStatus::Reversed),
        Err(LedgerError::NotDraft(id))
    );
}
