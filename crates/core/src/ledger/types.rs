//! Ledger domain types for journal posting and validation.
//!
//! This module defines the core types used for creating and validating
//! journal entries in the double-entry bookkeeping system.

use chrono::NaiveDate;
use closebook_shared::types::{
    AccountId, BookId, CalendarId, FiscalPeriodId, JournalEntryId, JournalLineId, OrganizationId,
    UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum absolute difference between debit and credit totals of a posted
/// journal. Balanced means `|debit - credit| < BALANCE_TOLERANCE`.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Side of a journal line.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// Debit side.
    Debit,
    /// Credit side.
    Credit,
}

impl Side {
    /// Returns the other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owners' residual interest, including retained earnings.
    Equity,
    /// Income earned in the period.
    Revenue,
    /// Costs incurred in the period.
    Expense,
}

impl AccountType {
    /// Revenue and expense accounts are zeroed by the year-end close.
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }

    /// Asset, liability and equity balances survive the close.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !self.is_temporary()
    }

    /// The side on which balances of this type conventionally increase.
    #[must_use]
    pub const fn conventional_normal_side(self) -> Side {
        match self {
            Self::Asset | Self::Expense => Side::Debit,
            Self::Liability | Self::Equity | Self::Revenue => Side::Credit,
        }
    }
}

/// Origin of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Keyed in by a user.
    Manual,
    /// Produced by an upstream module (payroll, billing, contracts).
    Integration,
    /// Generated by a close run to carry permanent balances forward.
    CarryForward,
    /// Generated by a close run to zero revenue and expense into retained earnings.
    YearEndClose,
    /// Mirror image of an earlier entry.
    Reversal,
}

impl SourceType {
    /// Returns true for entries the engine generates itself.
    #[must_use]
    pub const fn is_system_generated(self) -> bool {
        matches!(self, Self::CarryForward | Self::YearEndClose | Self::Reversal)
    }
}

/// Journal entry lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalStatus {
    /// Editable, not yet part of the ledger.
    Draft,
    /// Part of the ledger (immutable).
    Posted,
    /// Part of the ledger and offset by a reversal entry (immutable).
    Reversed,
}

impl JournalStatus {
    /// Returns true once the entry is ledger history.
    #[must_use]
    pub const fn is_immutable(self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }

    /// Returns true if lines of this entry count toward period balances.
    #[must_use]
    pub const fn counts_toward_activity(self) -> bool {
        self.is_immutable()
    }
}

/// Account attributes the engine needs for validation and close computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// The account ID.
    pub id: AccountId,
    /// Tenant owning the account.
    pub organization_id: OrganizationId,
    /// Account code, e.g. "1000".
    pub code: String,
    /// Classification.
    pub account_type: AccountType,
    /// Side on which the balance increases.
    pub normal_side: Side,
    /// Header accounts have this set to false and cannot receive lines.
    pub allow_posting: bool,
    /// Parent in the chart of accounts hierarchy.
    pub parent_account_id: Option<AccountId>,
}

/// A ledger book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// The book ID.
    pub id: BookId,
    /// Tenant owning the book.
    pub organization_id: OrganizationId,
    /// Book code, e.g. "LOCAL" or "GROUP".
    pub code: String,
    /// Base (functional) currency.
    pub base_currency: String,
    /// Fiscal calendar the book's periods come from.
    pub calendar_id: CalendarId,
}

/// Transaction-currency and base-currency amounts of one journal line.
///
/// Balancing is computed on the base side only. At most one of
/// `debit_base`/`credit_base` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmount {
    /// Transaction currency (ISO 4217).
    pub currency_code: String,
    /// Amount in transaction currency (positive).
    pub amount_txn: Decimal,
    /// Debit in base currency (0 if credit).
    pub debit_base: Decimal,
    /// Credit in base currency (0 if debit).
    pub credit_base: Decimal,
}

impl LineAmount {
    /// Creates a line amount on the given side.
    #[must_use]
    pub fn new(side: Side, currency_code: &str, amount_txn: Decimal, base: Decimal) -> Self {
        let (debit_base, credit_base) = match side {
            Side::Debit => (base, Decimal::ZERO),
            Side::Credit => (Decimal::ZERO, base),
        };
        Self {
            currency_code: currency_code.to_string(),
            amount_txn,
            debit_base,
            credit_base,
        }
    }

    /// Creates a line amount where transaction and base currency coincide.
    #[must_use]
    pub fn in_base(side: Side, currency_code: &str, amount: Decimal) -> Self {
        Self::new(side, currency_code, amount, amount)
    }

    /// Returns the side carrying a non-zero base amount, if exactly one does.
    #[must_use]
    pub fn side(&self) -> Option<Side> {
        match (self.debit_base.is_zero(), self.credit_base.is_zero()) {
            (false, true) => Some(Side::Debit),
            (true, false) => Some(Side::Credit),
            _ => None,
        }
    }

    /// Returns the non-zero base amount (or zero).
    #[must_use]
    pub fn base_amount(&self) -> Decimal {
        self.debit_base + self.credit_base
    }

    /// Returns debit minus credit in base currency.
    #[must_use]
    pub fn signed_base(&self) -> Decimal {
        self.debit_base - self.credit_base
    }

    /// Returns the same amount on the opposite side.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            currency_code: self.currency_code.clone(),
            amount_txn: self.amount_txn,
            debit_base: self.credit_base,
            credit_base: self.debit_base,
        }
    }
}

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Amounts.
    pub amount: LineAmount,
    /// Optional line description.
    pub description: Option<String>,
}

/// Input for posting a journal entry.
#[derive(Debug, Clone)]
pub struct PostJournalInput {
    /// Tenant the caller acts in.
    pub organization_id: OrganizationId,
    /// Target book.
    pub book_id: BookId,
    /// Target fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Accounting date; must fall inside the period.
    pub entry_date: NaiveDate,
    /// Date of the underlying document.
    pub document_date: NaiveDate,
    /// Header currency (ISO 4217).
    pub currency_code: String,
    /// Origin of the entry.
    pub source_type: SourceType,
    /// A description of the entry.
    pub description: String,
    /// Ordered lines; line numbers are assigned from 1 in this order.
    pub lines: Vec<JournalLineInput>,
    /// Acting principal.
    pub created_by: UserId,
}

/// A persisted journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalLine {
    /// The line ID.
    pub id: JournalLineId,
    /// 1-based position within the entry.
    pub line_no: i32,
    /// Account posted to.
    pub account_id: AccountId,
    /// Amounts.
    pub amount: LineAmount,
    /// Optional line description.
    pub description: Option<String>,
}

/// A persisted journal entry with its lines.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    /// The entry ID.
    pub id: JournalEntryId,
    /// Owning tenant.
    pub organization_id: OrganizationId,
    /// Book.
    pub book_id: BookId,
    /// Fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Header currency.
    pub currency_code: String,
    /// Origin.
    pub source_type: SourceType,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: JournalStatus,
    /// Entry this one reverses, for reversal entries.
    pub reverses_entry_id: Option<JournalEntryId>,
    /// Ordered lines.
    pub lines: Vec<JournalLine>,
}

/// Journal totals in base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JournalTotals {
    /// Sum of base debits.
    pub debit: Decimal,
    /// Sum of base credits.
    pub credit: Decimal,
}

impl JournalTotals {
    /// Sums the base amounts of the given amounts.
    pub fn from_amounts<'a>(amounts: impl IntoIterator<Item = &'a LineAmount>) -> Self {
        amounts.into_iter().fold(
            Self {
                debit: Decimal::ZERO,
                credit: Decimal::ZERO,
            },
            |acc, a| Self {
                debit: acc.debit + a.debit_base,
                credit: acc.credit + a.credit_base,
            },
        )
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Returns true if debits and credits agree within [`BALANCE_TOLERANCE`].
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference().abs() < BALANCE_TOLERANCE
    }
}
