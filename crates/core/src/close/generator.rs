//! Generation of the year-end closing and carry-forward journals.
//!
//! Year-end closing journal: one line per revenue/expense account with a
//! non-zero net, on the side opposite its net, plus a retained earnings line
//! for |net income| (credit on profit, debit on loss, omitted at zero).
//!
//! Carry-forward journal: for every asset/liability/equity account with a
//! non-zero balance after the closing journal, a close-out line on the side
//! opposite its balance followed by a bring-forward line on the balance side.
//! Each pair nets to zero, so no permanent position changes.

use closebook_shared::types::UserId;
use rust_decimal::Decimal;

use super::error::CloseError;
use super::types::CloseJournals;
use crate::ledger::{
    AccountInfo, Book, JournalLineInput, JournalTotals, LineAmount, PeriodActivity,
    PostJournalInput, Side, SourceType,
};
use crate::period::FiscalPeriod;

/// Stateless generator for close journals.
pub struct CloseJournalGenerator;

impl CloseJournalGenerator {
    /// Generates both journals from the period's activity.
    ///
    /// # Errors
    ///
    /// `GeneratedJournalUnbalanced` if either journal fails to balance.
    pub fn generate(
        activity: &PeriodActivity,
        retained_earnings: &AccountInfo,
        currency: &str,
    ) -> Result<CloseJournals, CloseError> {
        let (year_end, net_income) = Self::year_end_lines(activity, retained_earnings, currency);
        Self::ensure_balanced("year-end", &year_end)?;

        let mut after_close = activity.clone();
        match net_income.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => {
                after_close.record(retained_earnings, Decimal::ZERO, net_income);
            }
            std::cmp::Ordering::Less => {
                after_close.record(retained_earnings, -net_income, Decimal::ZERO);
            }
            std::cmp::Ordering::Equal => {}
        }

        let carry_forward = Self::carry_forward_lines(&after_close, currency);
        Self::ensure_balanced("carry-forward", &carry_forward)?;

        Ok(CloseJournals {
            year_end,
            carry_forward,
            net_income,
        })
    }

    /// Lines zeroing revenue and expense into retained earnings, and the net income.
    #[must_use]
    pub fn year_end_lines(
        activity: &PeriodActivity,
        retained_earnings: &AccountInfo,
        currency: &str,
    ) -> (Vec<JournalLineInput>, Decimal) {
        let mut lines: Vec<JournalLineInput> = activity
            .temporary()
            .filter(|a| !a.net_debit().is_zero())
            .map(|a| {
                let net = a.net_debit();
                let side = if net > Decimal::ZERO { Side::Credit } else { Side::Debit };
                JournalLineInput {
                    account_id: a.account_id,
                    amount: LineAmount::in_base(side, currency, net.abs()),
                    description: Some(format!("Close {} to retained earnings", a.code)),
                }
            })
            .collect();

        let net_income = activity.net_income();
        if !net_income.is_zero() {
            let side = if net_income > Decimal::ZERO { Side::Credit } else { Side::Debit };
            lines.push(JournalLineInput {
                account_id: retained_earnings.id,
                amount: LineAmount::in_base(side, currency, net_income.abs()),
                description: Some("Net income to retained earnings".to_string()),
            });
        }

        (lines, net_income)
    }

    /// Close-out / bring-forward pairs for permanent balances.
    #[must_use]
    pub fn carry_forward_lines(
        after_close: &PeriodActivity,
        currency: &str,
    ) -> Vec<JournalLineInput> {
        after_close
            .permanent()
            .filter(|a| !a.net_debit().is_zero())
            .flat_map(|a| {
                let net = a.net_debit();
                let balance_side = if net > Decimal::ZERO { Side::Debit } else { Side::Credit };
                let amount = net.abs();
                [
                    JournalLineInput {
                        account_id: a.account_id,
                        amount: LineAmount::in_base(balance_side.opposite(), currency, amount),
                        description: Some(format!("Balance carried forward {}", a.code)),
                    },
                    JournalLineInput {
                        account_id: a.account_id,
                        amount: LineAmount::in_base(balance_side, currency, amount),
                        description: Some(format!("Balance brought forward {}", a.code)),
                    },
                ]
            })
            .collect()
    }

    /// Wraps generated lines in a posting input dated on the period end in the
    /// book's base currency.
    #[must_use]
    pub fn journal_input(
        book: &Book,
        period: &FiscalPeriod,
        source_type: SourceType,
        lines: Vec<JournalLineInput>,
        created_by: UserId,
    ) -> PostJournalInput {
        let kind = match source_type {
            SourceType::YearEndClose => "Year-end close",
            SourceType::CarryForward => "Carry-forward",
            SourceType::Reversal => "Reversal",
            SourceType::Manual | SourceType::Integration => "Journal",
        };
        PostJournalInput {
            organization_id: book.organization_id,
            book_id: book.id,
            fiscal_period_id: period.id,
            entry_date: period.end_date,
            document_date: period.end_date,
            currency_code: book.base_currency.clone(),
            source_type,
            description: format!("{kind} {} {}", book.code, period.label()),
            lines,
            created_by,
        }
    }

    fn ensure_balanced(
        journal: &'static str,
        lines: &[JournalLineInput],
    ) -> Result<(), CloseError> {
        let totals = JournalTotals::from_amounts(lines.iter().map(|l| &l.amount));
        if totals.is_balanced() {
            Ok(())
        } else {
            Err(CloseError::GeneratedJournalUnbalanced {
                journal,
                difference: totals.difference(),
            })
        }
    }
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;
