//! Property-based tests for close journal generation.
//!
//! For any set of balanced source journals:
//! - Each generated journal balances on its own
//! - After both journals every revenue and expense account is zero
//! - Retained earnings moves by exactly the net income
//! - Every other permanent account keeps its position

use std::collections::HashMap;

use closebook_shared::types::{AccountId, OrganizationId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::generator::CloseJournalGenerator;
use crate::ledger::{AccountInfo, AccountType, JournalLineInput, JournalTotals, PeriodActivity};

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn chart() -> Vec<AccountInfo> {
    let org = OrganizationId::new();
    [
        ("1000", AccountType::Asset),
        ("1200", AccountType::Asset),
        ("2000", AccountType::Liability),
        ("3000", AccountType::Equity),
        ("4000", AccountType::Revenue),
        ("4100", AccountType::Revenue),
        ("5000", AccountType::Expense),
        ("5100", AccountType::Expense),
    ]
    .into_iter()
    .map(|(code, account_type)| AccountInfo {
        id: AccountId::new(),
        organization_id: org,
        code: code.into(),
        account_type,
        normal_side: account_type.conventional_normal_side(),
        allow_posting: true,
        parent_account_id: None,
    })
    .collect()
}

fn retained_earnings() -> AccountInfo {
    AccountInfo {
        id: AccountId::new(),
        organization_id: OrganizationId::new(),
        code: "3100".into(),
        account_type: AccountType::Equity,
        normal_side: crate::ledger::Side::Credit,
        allow_posting: true,
        parent_account_id: None,
    }
}

/// Each element is one two-line source journal: debit one account, credit another.
fn journals_strategy() -> impl Strategy<Value = Vec<(usize, usize, Decimal)>> {
    prop::collection::vec((0usize..8, 0usize..8, positive_amount()), 0..20)
}

fn net_by_account(lines: &[JournalLineInput]) -> HashMap<AccountId, Decimal> {
    let mut net = HashMap::new();
    for line in lines {
        *net.entry(line.account_id).or_insert(Decimal::ZERO) += line.amount.signed_base();
    }
    net
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_close_journals_satisfy_close_invariants(journals in journals_strategy()) {
        let accounts = chart();
        let retained = retained_earnings();

        let mut activity = PeriodActivity::new();
        for (debit, credit, amount) in &journals {
            activity.record(&accounts[*debit], *amount, Decimal::ZERO);
            activity.record(&accounts[*credit], Decimal::ZERO, *amount);
        }

        let generated = CloseJournalGenerator::generate(&activity, &retained, "USD").unwrap();

        // each journal balances on its own
        for lines in [&generated.year_end, &generated.carry_forward] {
            let totals = JournalTotals::from_amounts(lines.iter().map(|l| &l.amount));
            prop_assert!(totals.is_balanced());
            for line in lines.iter() {
                prop_assert!(line.amount.side().is_some());
            }
        }

        let year_end = net_by_account(&generated.year_end);
        let carry_forward = net_by_account(&generated.carry_forward);

        for account in activity.iter() {
            let effect = year_end.get(&account.account_id).copied().unwrap_or_default()
                + carry_forward.get(&account.account_id).copied().unwrap_or_default();

            if account.account_type.is_temporary() {
                // zeroed
                prop_assert_eq!(account.net_debit() + effect, Decimal::ZERO);
            } else {
                // unchanged
                prop_assert_eq!(effect, Decimal::ZERO);
            }
        }

        // retained earnings credited by exactly the net income
        let re_effect = year_end.get(&retained.id).copied().unwrap_or_default()
            + carry_forward.get(&retained.id).copied().unwrap_or_default();
        prop_assert_eq!(-re_effect, generated.net_income);
        prop_assert_eq!(generated.net_income, activity.net_income());
    }
}
