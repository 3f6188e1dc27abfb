//! Property-based tests for journal line validation.
//!
//! - Lines with zero, negative or two-sided amounts are rejected
//! - Balance is judged on base amounts with a strict 0.0001 tolerance

use closebook_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{BALANCE_TOLERANCE, JournalLineInput, LineAmount, Side};
use super::validation::{validate_balance, validate_lines};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate negative decimal amounts.
fn negative_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..0i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Debit), Just(Side::Credit)]
}

fn make_line(side: Side, amount: Decimal) -> JournalLineInput {
    JournalLineInput {
        account_id: AccountId::new(),
        amount: LineAmount::in_base(side, "USD", amount),
        description: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A zero line anywhere in the journal is rejected with its position.
    #[test]
    fn prop_zero_amount_rejected(
        amounts in prop::collection::vec(positive_amount(), 0..5),
        side in side_strategy(),
    ) {
        let mut lines: Vec<_> = amounts.iter().map(|a| make_line(Side::Debit, *a)).collect();
        lines.push(make_line(side, Decimal::ZERO));
        let position = lines.len();

        prop_assert_eq!(
            validate_lines(&lines),
            Err(LedgerError::ZeroAmount { line_no: position })
        );
    }

    /// Negative base amounts are rejected on either side.
    #[test]
    fn prop_negative_amount_rejected(amount in negative_amount(), side in side_strategy()) {
        let result = validate_lines(&[make_line(side, amount)]);
        prop_assert_eq!(result, Err(LedgerError::NegativeAmount { line_no: 1 }));
    }

    /// Lines with both sides set are rejected.
    #[test]
    fn prop_two_sided_line_rejected(debit in positive_amount(), credit in positive_amount()) {
        let mut line = make_line(Side::Debit, debit);
        line.amount.credit_base = credit;
        prop_assert_eq!(
            validate_lines(&[line]),
            Err(LedgerError::BothSidesSet { line_no: 1 })
        );
    }

    /// Debits split into parts and offset by one credit always balance.
    #[test]
    fn prop_split_debits_balance(parts in prop::collection::vec(positive_amount(), 1..8)) {
        let total: Decimal = parts.iter().copied().sum();
        let mut lines: Vec<_> = parts.iter().map(|a| make_line(Side::Debit, *a)).collect();
        lines.push(make_line(Side::Credit, total));

        let totals = validate_lines(&lines).unwrap();
        prop_assert!(validate_balance(&totals).is_ok());
        prop_assert_eq!(totals.debit, totals.credit);
    }

    /// Any difference of at least the tolerance is unbalanced; below it is balanced.
    #[test]
    fn prop_tolerance_boundary(amount in positive_amount(), ten_thousandths in 0i64..50) {
        let delta = Decimal::new(ten_thousandths, 4) / Decimal::TWO;
        let lines = vec![make_line(Side::Debit, amount + delta), make_line(Side::Credit, amount)];
        let totals = validate_lines(&lines).unwrap();

        prop_assert_eq!(validate_balance(&totals).is_ok(), delta < BALANCE_TOLERANCE);
    }
}

#[test]
fn test_minimum_valid_journal() {
    let lines = vec![
        make_line(Side::Debit, Decimal::new(1, 2)),
        make_line(Side::Credit, Decimal::new(1, 2)),
    ];
    let totals = validate_lines(&lines).unwrap();
    assert!(validate_balance(&totals).is_ok());
}
