//! Structural validation of journal lines.
//!
//! These checks need nothing beyond the input itself. Account, book and period
//! checks live in [`super::service::LedgerService`].

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{JournalLineInput, JournalTotals, LineAmount};

/// Validates an ISO 4217 style currency code (three ASCII uppercase letters).
///
/// # Errors
///
/// Returns `LedgerError::InvalidCurrency` otherwise.
pub fn validate_currency(code: &str) -> Result<(), LedgerError> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(LedgerError::InvalidCurrency(code.to_string()))
    }
}

/// Validates one line amount. `line_no` is 1-based and only used for messages.
///
/// # Errors
///
/// Returns an error if an amount is negative, both sides are set, or the line
/// carries no base amount.
pub fn validate_amount(amount: &LineAmount, line_no: usize) -> Result<(), LedgerError> {
    if amount.debit_base < Decimal::ZERO
        || amount.credit_base < Decimal::ZERO
        || amount.amount_txn < Decimal::ZERO
    {
        return Err(LedgerError::NegativeAmount { line_no });
    }
    if !amount.debit_base.is_zero() && !amount.credit_base.is_zero() {
        return Err(LedgerError::BothSidesSet { line_no });
    }
    if amount.base_amount().is_zero() || amount.amount_txn.is_zero() {
        return Err(LedgerError::ZeroAmount { line_no });
    }
    validate_currency(&amount.currency_code)
}

/// Validates every line and returns the base totals.
///
/// Balance is NOT checked here so that drafts can reuse it.
///
/// # Errors
///
/// Returns `LedgerError::EmptyJournal` for no lines, or the first line error.
pub fn validate_lines(lines: &[JournalLineInput]) -> Result<JournalTotals, LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::EmptyJournal);
    }
    for (idx, line) in lines.iter().enumerate() {
        validate_amount(&line.amount, idx + 1)?;
    }
    Ok(JournalTotals::from_amounts(lines.iter().map(|l| &l.amount)))
}

/// Checks that debits equal credits within tolerance.
///
/// # Errors
///
/// Returns `LedgerError::UnbalancedJournal` with both totals.
pub fn validate_balance(totals: &JournalTotals) -> Result<(), LedgerError> {
    if totals.is_balanced() {
        Ok(())
    } else {
        Err(LedgerError::UnbalancedJournal {
            debit: totals.debit,
            credit: totals.credit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::Side;
    use closebook_shared::types::AccountId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn line(side: Side, amount: Decimal) -> JournalLineInput {
        JournalLineInput {
            account_id: AccountId::new(),
            amount: LineAmount::in_base(side, "USD", amount),
            description: None,
        }
    }

    #[rstest]
    #[case("USD", true)]
    #[case("EUR", true)]
    #[case("usd", false)]
    #[case("US", false)]
    #[case("USDT", false)]
    #[case("U1D", false)]
    fn test_validate_currency(#[case] code: &str, #[case] ok: bool) {
        assert_eq!(validate_currency(code).is_ok(), ok);
    }

    #[test]
    fn test_balanced_lines() {
        let lines = vec![line(Side::Debit, dec!(100)), line(Side::Credit, dec!(100))];
        let totals = validate_lines(&lines).unwrap();
        assert_eq!(totals.debit, dec!(100));
        assert!(validate_balance(&totals).is_ok());
    }

    #[test]
    fn test_unbalanced_lines() {
        let lines = vec![line(Side::Debit, dec!(100)), line(Side::Credit, dec!(99))];
        let totals = validate_lines(&lines).unwrap();
        let err = validate_balance(&totals).unwrap_err();
        assert_eq!(
            err,
            LedgerError::UnbalancedJournal {
                debit: dec!(100),
                credit: dec!(99),
            }
        );
    }

    #[test]
    fn test_sub_tolerance_difference_is_balanced() {
        let lines = vec![
            line(Side::Debit, dec!(100.00009)),
            line(Side::Credit, dec!(100)),
        ];
        let totals = validate_lines(&lines).unwrap();
        assert!(validate_balance(&totals).is_ok());
    }

    #[test]
    fn test_no_lines() {
        assert_eq!(validate_lines(&[]), Err(LedgerError::EmptyJournal));
    }

    #[test]
    fn test_zero_line_reports_line_number() {
        let lines = vec![line(Side::Debit, dec!(100)), line(Side::Credit, dec!(0))];
        assert_eq!(
            validate_lines(&lines),
            Err(LedgerError::ZeroAmount { line_no: 2 })
        );
    }

    #[test]
    fn test_both_sides_rejected() {
        let mut bad = line(Side::Debit, dec!(5));
        bad.amount.credit_base = dec!(5);
        assert_eq!(
            validate_lines(&[bad]),
            Err(LedgerError::BothSidesSet { line_no: 1 })
        );
    }

    #[test]
    fn test_negative_rejected() {
        let bad = line(Side::Credit, dec!(-5));
        assert_eq!(
            validate_lines(&[bad]),
            Err(LedgerError::NegativeAmount { line_no: 1 })
        );
    }

    #[test]
    fn test_line_currency_checked() {
        let mut bad = line(Side::Debit, dec!(5));
        bad.amount.currency_code = "dollars".into();
        assert!(matches!(
            validate_lines(&[bad]),
            Err(LedgerError::InvalidCurrency(_))
        ));
    }
}
