//! Property-based tests for LedgerService and reversal.
//!
//! - Balance integrity: only balanced journals pass posting validation
//! - Reversal integrity: mirrored lines are the exact sign-inverse and balance

use chrono::NaiveDate;
use closebook_shared::types::{
    AccountId, BookId, CalendarId, FiscalPeriodId, JournalEntryId, JournalLineId, OrganizationId,
    UserId,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::reversal::{ReversalContext, ReversalService};
use super::service::{LedgerService, PostingContext};
use super::types::{
    AccountInfo, AccountType, Book, JournalEntry, JournalLine, JournalLineInput, JournalStatus,
    JournalTotals, LineAmount, PostJournalInput, Side, SourceType,
};
use crate::period::{FiscalPeriod, PeriodStatus, PostingPrivilege};

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Debit), Just(Side::Credit)]
}

fn setup() -> (Book, FiscalPeriod) {
    let calendar_id = CalendarId::new();
    let book = Book {
        id: BookId::new(),
        organization_id: OrganizationId::new(),
        code: "LOCAL".into(),
        base_currency: "USD".into(),
        calendar_id,
    };
    let period = FiscalPeriod {
        id: FiscalPeriodId::new(),
        calendar_id,
        fiscal_year: 2026,
        period_no: 1,
        is_adjustment: false,
        start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
    };
    (book, period)
}

/// Every account exists in the book's tenant and allows posting.
fn open_lookup(org: OrganizationId) -> impl Fn(AccountId) -> Option<AccountInfo> {
    move |id| {
        Some(AccountInfo {
            id,
            organization_id: org,
            code: "9999".into(),
            account_type: AccountType::Asset,
            normal_side: Side::Debit,
            allow_posting: true,
            parent_account_id: None,
        })
    }
}

fn make_input(
    book: &Book,
    period: &FiscalPeriod,
    lines: Vec<JournalLineInput>,
) -> PostJournalInput {
    PostJournalInput {
        organization_id: book.organization_id,
        book_id: book.id,
        fiscal_period_id: period.id,
        entry_date: period.start_date,
        document_date: period.start_date,
        currency_code: "USD".into(),
        source_type: SourceType::Integration,
        description: "Payroll accrual".into(),
        lines,
        created_by: UserId::new(),
    }
}

fn line(side: Side, amount: Decimal) -> JournalLineInput {
    JournalLineInput {
        account_id: AccountId::new(),
        amount: LineAmount::in_base(side, "USD", amount),
        description: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Posting validation succeeds exactly when debits equal credits.
    #[test]
    fn prop_balance_integrity(
        debits in prop::collection::vec(positive_amount(), 1..6),
        credits in prop::collection::vec(positive_amount(), 1..6),
    ) {
        let (book, period) = setup();
        let mut lines: Vec<_> = debits.iter().map(|a| line(Side::Debit, *a)).collect();
        lines.extend(credits.iter().map(|a| line(Side::Credit, *a)));
        let input = make_input(&book, &period, lines);
        let ctx = PostingContext {
            book: &book,
            period: &period,
            status: PeriodStatus::Open,
            privilege: PostingPrivilege::Standard,
        };

        let debit_total: Decimal = debits.iter().copied().sum();
        let credit_total: Decimal = credits.iter().copied().sum();
        let result =
            LedgerService::validate_posting(&input, &ctx, open_lookup(book.organization_id));

        if debit_total == credit_total {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(
                result,
                Err(LedgerError::UnbalancedJournal { debit: debit_total, credit: credit_total })
            );
        }
    }

    /// The reversal of any balanced posted entry is its exact mirror and balances.
    #[test]
    fn prop_reversal_is_exact_mirror(
        amounts in prop::collection::vec((side_strategy(), positive_amount()), 1..8),
    ) {
        let (book, period) = setup();
        let mut lines: Vec<JournalLine> = amounts
            .iter()
            .enumerate()
            .map(|(i, (side, amount))| JournalLine {
                id: JournalLineId::new(),
                line_no: i32::try_from(i + 1).unwrap(),
                account_id: AccountId::new(),
                amount: LineAmount::in_base(*side, "USD", *amount),
                description: None,
            })
            .collect();
        // plug to balance
        let net = JournalTotals::from_amounts(lines.iter().map(|l| &l.amount)).difference();
        if !net.is_zero() {
            let side = if net > Decimal::ZERO { Side::Credit } else { Side::Debit };
            lines.push(JournalLine {
                id: JournalLineId::new(),
                line_no: i32::try_from(lines.len() + 1).unwrap(),
                account_id: AccountId::new(),
                amount: LineAmount::in_base(side, "USD", net.abs()),
                description: None,
            });
        }

        let original = JournalEntry {
            id: JournalEntryId::new(),
            organization_id: book.organization_id,
            book_id: book.id,
            fiscal_period_id: period.id,
            entry_date: period.start_date,
            currency_code: "USD".into(),
            source_type: SourceType::Manual,
            description: "Original".into(),
            status: JournalStatus::Posted,
            reverses_entry_id: None,
            lines,
        };
        let reversal = ReversalService::build(&original, &ReversalContext {
            fiscal_period_id: period.id,
            entry_date: period.end_date,
            description: None,
            created_by: UserId::new(),
        }, PostingPrivilege::Standard).unwrap();

        prop_assert_eq!(reversal.lines.len(), original.lines.len());
        for (src, rev) in original.lines.iter().zip(&reversal.lines) {
            prop_assert_eq!(src.account_id, rev.account_id);
            prop_assert_eq!(src.amount.debit_base, rev.amount.credit_base);
            prop_assert_eq!(src.amount.credit_base, rev.amount.debit_base);
        }
        let totals = JournalTotals::from_amounts(reversal.lines.iter().map(|l| &l.amount));
        prop_assert!(totals.is_balanced());

        let ctx = PostingContext {
            book: &book,
            period: &period,
            status: PeriodStatus::HardClosed,
            privilege: PostingPrivilege::CloseWorkflow,
        };
        let lookup = open_lookup(book.organization_id);
        prop_assert!(LedgerService::validate_posting(&reversal, &ctx, lookup).is_ok());
    }
}
