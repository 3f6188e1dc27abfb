//! Account activity aggregation for a (book, period).

use std::collections::BTreeMap;

use closebook_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::Serialize;

use super::types::{AccountInfo, AccountType, Side};

/// Debit and credit totals of one account over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountActivity {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Classification.
    pub account_type: AccountType,
    /// Side on which the balance increases.
    pub normal_side: Side,
    /// Total base debits.
    pub debit_total: Decimal,
    /// Total base credits.
    pub credit_total: Decimal,
}

impl AccountActivity {
    /// Creates an empty activity record.
    #[must_use]
    pub fn new(account: &AccountInfo) -> Self {
        Self {
            account_id: account.id,
            code: account.code.clone(),
            account_type: account.account_type,
            normal_side: account.normal_side,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        }
    }

    /// Debit minus credit.
    #[must_use]
    pub fn net_debit(&self) -> Decimal {
        self.debit_total - self.credit_total
    }

    /// Balance measured on the account's normal side.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        match self.normal_side {
            Side::Debit => self.debit_total - self.credit_total,
            Side::Credit => self.credit_total - self.debit_total,
        }
    }

    /// Adds base amounts.
    pub fn add(&mut self, debit: Decimal, credit: Decimal) {
        self.debit_total += debit;
        self.credit_total += credit;
    }
}

/// Per-account activity of a (book, period), ordered by account ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodActivity {
    accounts: BTreeMap<AccountId, AccountActivity>,
}

impl PeriodActivity {
    /// Creates an empty activity set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records base amounts against an account.
    pub fn record(&mut self, account: &AccountInfo, debit: Decimal, credit: Decimal) {
        self.accounts
            .entry(account.id)
            .or_insert_with(|| AccountActivity::new(account))
            .add(debit, credit);
    }

    /// Returns the activity of one account.
    #[must_use]
    pub fn get(&self, account_id: AccountId) -> Option<&AccountActivity> {
        self.accounts.get(&account_id)
    }

    /// Iterates all accounts in account ID order.
    pub fn iter(&self) -> impl Iterator<Item = &AccountActivity> {
        self.accounts.values()
    }

    /// Iterates revenue and expense accounts.
    pub fn temporary(&self) -> impl Iterator<Item = &AccountActivity> {
        self.iter().filter(|a| a.account_type.is_temporary())
    }

    /// Iterates asset, liability and equity accounts.
    pub fn permanent(&self) -> impl Iterator<Item = &AccountActivity> {
        self.iter().filter(|a| a.account_type.is_permanent())
    }

    /// Net income: Σ(credit − debit) over revenue and expense accounts.
    #[must_use]
    pub fn net_income(&self) -> Decimal {
        self.temporary().map(|a| -a.net_debit()).sum()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Number of accounts with activity.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }
}
