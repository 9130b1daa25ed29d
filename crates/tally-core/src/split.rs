//! # Split-Payment Validation
//!
//! A settlement may be tendered across several methods (cash + Fonepay,
//! card + bank...). The "Confirm settlement" button stays disabled until
//! the rows add up to the settlement amount.
//!
//! ## Re-evaluated on Every Keystroke
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Target: 40.00                                                          │
//! │                                                                         │
//! │  Cash     [ 20.00 ]   ──► parse_amount ──► 2000                         │
//! │  Fonepay  [ 19.5  ]   ──► parse_amount ──► 1950                         │
//! │  Card     [ abc   ]   ──► parse_amount ──►    0   (permissive)          │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                   validate_split = (3950 == 4000) = false               │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                   [ Confirm ]  disabled                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentMethod, SplitPaymentRow};
use crate::MAX_AMOUNT_CENTS;

// =============================================================================
// Amount Parsing
// =============================================================================

/// Parses a user-typed amount into money. Anything unparseable is zero.
///
/// This is the ONE place the permissive-input policy lives:
/// - surrounding whitespace and thousands separators (`,`) are ignored
/// - an optional leading `+` or `-` is accepted
/// - fraction digits past the second are rounded half away from zero
/// - empty strings, stray characters and anything beyond
///   [`MAX_AMOUNT_CENTS`] in size yield `0.00`
///
/// A negative result is kept; [`validate_split`] refuses it as a tender.
///
/// ## Example
/// ```rust
/// use tally_core::split::parse_amount;
///
/// assert_eq!(parse_amount("1,250.5").cents(), 125050);
/// assert_eq!(parse_amount(" 19.999 ").cents(), 2000);
/// assert_eq!(parse_amount("twelve").cents(), 0);
/// ```
pub fn parse_amount(input: &str) -> Money {
    parse_cents(input).map(Money::from_cents).unwrap_or_default()
}

fn parse_cents(input: &str) -> Option<i64> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();

    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };

    let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let major: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

    let mut digits = frac.bytes().map(|b| i64::from(b - b'0'));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|d| d >= 5);

    let cents = major
        .checked_mul(100)?
        .checked_add(tenths * 10 + hundredths)?
        .checked_add(i64::from(round_up))?;
    if cents > MAX_AMOUNT_CENTS {
        return None;
    }

    Some(if negative { -cents } else { cents })
}

// =============================================================================
// Split Validation
// =============================================================================

fn checked_total(rows: &[SplitPaymentRow]) -> Option<Money> {
    rows.iter().try_fold(Money::zero(), |acc, row| acc.checked_add(row.amount))
}

/// Sum of every row's amount, for display. Saturates instead of wrapping.
pub fn tendered_total(rows: &[SplitPaymentRow]) -> Money {
    checked_total(rows).unwrap_or(Money::from_cents(i64::MAX))
}

/// Returns true iff `rows` is non-empty, no row is negative, and the rows
/// sum to `target` within 0.01.
///
/// With integer cents "within 0.01" is exact equality. Pure and
/// order-independent, and never panics whatever the rows hold.
pub fn validate_split(rows: &[SplitPaymentRow], target: Money) -> bool {
    if rows.is_empty() || rows.iter().any(|row| row.amount.is_negative()) {
        return false;
    }
    checked_total(rows).is_some_and(|total| total == target)
}

/// Confirm-path variant of [`validate_split`] that explains the failure.
pub fn check_split(rows: &[SplitPaymentRow], target: Money) -> CoreResult<()> {
    if let Some(row) = rows.iter().find(|row| row.amount.is_negative()) {
        return Err(ValidationError::OutOfRange {
            field: format!("{} amount", row.method),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        }
        .into());
    }
    if validate_split(rows, target) {
        Ok(())
    } else {
        Err(CoreError::SplitMismatch {
            tendered: tendered_total(rows),
            target,
        })
    }
}

/// Groups rows by method, for receipts and daily summaries.
pub fn split_totals_by_method(rows: &[SplitPaymentRow]) -> BTreeMap<PaymentMethod, Money> {
    let mut totals = BTreeMap::new();
    for row in rows {
        *totals.entry(row.method).or_insert_with(Money::zero) += row.amount;
    }
    totals
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(method: PaymentMethod, input: &str) -> SplitPaymentRow {
        SplitPaymentRow::new(method, parse_amount(input))
    }

    #[test]
    fn test_parse_amount_accepts_common_inputs() {
        assert_eq!(parse_amount("40").cents(), 4000);
        assert_eq!(parse_amount("40.00").cents(), 4000);
        assert_eq!(parse_amount("40.5").cents(), 4050);
        assert_eq!(parse_amount(".75").cents(), 75);
        assert_eq!(parse_amount("12.").cents(), 1200);
        assert_eq!(parse_amount("  1,234.56 ").cents(), 123456);
        assert_eq!(parse_amount("+5").cents(), 500);
        assert_eq!(parse_amount("-5.25").cents(), -525);
    }

    #[test]
    fn test_parse_amount_rounds_half_away_from_zero() {
        assert_eq!(parse_amount("10.004").cents(), 1000);
        assert_eq!(parse_amount("10.005").cents(), 1001);
        assert_eq!(parse_amount("-10.005").cents(), -1001);
        assert_eq!(parse_amount("0.999").cents(), 100);
    }

    #[test]
    fn test_parse_amount_falls_back_to_zero() {
        for input in [
            "",
            "   ",
            ".",
            "-",
            "abc",
            "12a",
            "1.2.3",
            "Rs 10",
            "--5",
            "99999999999999999999",
            "92233720368547758",
            "1000000000.01",
        ] {
            assert_eq!(parse_amount(input), Money::zero(), "input {:?}", input);
        }
    }

    #[test]
    fn test_parse_amount_ceiling_is_inclusive() {
        assert_eq!(parse_amount("1,000,000,000").cents(), MAX_AMOUNT_CENTS);
        assert_eq!(parse_amount("-1000000000").cents(), -MAX_AMOUNT_CENTS);
    }

    #[test]
    fn test_huge_rows_never_overflow() {
        let rows = vec![
            row(PaymentMethod::Cash, "92233720368547758"),
            row(PaymentMethod::Card, "92233720368547758"),
        ];
        assert!(!validate_split(&rows, Money::from_cents(8000)));

        let raw = vec![
            SplitPaymentRow::new(PaymentMethod::Cash, Money::from_cents(i64::MAX)),
            SplitPaymentRow::new(PaymentMethod::Card, Money::from_cents(i64::MAX)),
        ];
        assert!(!validate_split(&raw, Money::from_cents(8000)));
        assert_eq!(tendered_total(&raw), Money::from_cents(i64::MAX));
        assert!(check_split(&raw, Money::from_cents(8000)).is_err());
    }

    #[test]
    fn test_negative_row_is_refused() {
        let rows = vec![row(PaymentMethod::Cash, "100"), row(PaymentMethod::Card, "-20")];
        assert_eq!(tendered_total(&rows).cents(), 8000);
        assert!(!validate_split(&rows, Money::from_cents(8000)));

        match check_split(&rows, Money::from_cents(8000)) {
            Err(CoreError::Validation(ValidationError::OutOfRange { field, .. })) => {
                assert_eq!(field, format!("{} amount", PaymentMethod::Card));
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_split_exact_match_is_valid() {
        let rows = vec![row(PaymentMethod::Cash, "20"), row(PaymentMethod::Fonepay, "20.00")];
        assert!(validate_split(&rows, Money::from_cents(4000)));
        assert!(check_split(&rows, Money::from_cents(4000)).is_ok());
    }

    #[test]
    fn test_split_mismatch_is_invalid() {
        let rows = vec![row(PaymentMethod::Cash, "20"), row(PaymentMethod::Card, "19.50")];
        assert!(!validate_split(&rows, Money::from_cents(4000)));

        match check_split(&rows, Money::from_cents(4000)) {
            Err(CoreError::SplitMismatch { tendered, target }) => {
                assert_eq!(tendered.cents(), 3950);
                assert_eq!(target.cents(), 4000);
            }
            other => panic!("expected SplitMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_split_requires_at_least_one_row() {
        assert!(!validate_split(&[], Money::from_cents(4000)));
        assert!(!validate_split(&[], Money::zero()));
    }

    #[test]
    fn test_unparseable_row_counts_as_zero() {
        let rows = vec![
            row(PaymentMethod::Cash, "40"),
            row(PaymentMethod::Bank, "not a number"),
        ];
        assert!(validate_split(&rows, Money::from_cents(4000)));
    }

    #[test]
    fn test_split_is_order_independent_and_repeatable() {
        let rows = vec![
            row(PaymentMethod::Cash, "10.10"),
            row(PaymentMethod::Card, "5.05"),
            row(PaymentMethod::Bank, "0.01"),
            row(PaymentMethod::Fonepay, "24.84"),
        ];
        let target = Money::from_cents(4000);
        let expected = validate_split(&rows, target);
        assert!(expected);

        let mut permuted = rows.clone();
        for _ in 0..rows.len() {
            permuted.rotate_left(1);
            assert_eq!(validate_split(&permuted, target), expected);
            permuted.reverse();
            assert_eq!(validate_split(&permuted, target), expected);
        }
        assert_eq!(validate_split(&rows, target), expected);
    }

    #[test]
    fn test_split_totals_by_method() {
        let rows = vec![
            row(PaymentMethod::Cash, "10"),
            row(PaymentMethod::Fonepay, "5"),
            row(PaymentMethod::Cash, "2.50"),
        ];
        let totals = split_totals_by_method(&rows);
        assert_eq!(totals[&PaymentMethod::Cash].cents(), 1250);
        assert_eq!(totals[&PaymentMethod::Fonepay].cents(), 500);
        assert!(!totals.contains_key(&PaymentMethod::Card));
    }
}
