//! Tranche-by-tranche progressive tax evaluation.
//!
//! Each bracket taxes only the slice of the base between the previous
//! bracket's upper limit and its own, so income below a bracket's lower
//! bound is never retaxed at that bracket's rate.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fiscal_core::TaxBracket;
//! use fiscal_core::calculations::progressive::evaluate;
//!
//! let brackets = vec![
//!     TaxBracket::bounded(dec!(12450), dec!(0.095)),
//!     TaxBracket::bounded(dec!(20200), dec!(0.12)),
//!     TaxBracket::unbounded(dec!(0.15)),
//! ];
//!
//! // 12450 × 9.5% + 2550 × 12%
//! assert_eq!(evaluate(dec!(15000), &brackets), dec!(1488.75));
//! ```

use rust_decimal::Decimal;

use crate::TaxBracket;

/// Tax due on `taxable_base` under `brackets`.
///
/// Returns zero for a non-positive base or an empty table. Brackets are
/// expected in ascending order of upper limit; an unbounded bracket absorbs
/// whatever remains.
pub fn evaluate(
    taxable_base: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if taxable_base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut remaining = taxable_base;
    let mut previous_limit = Decimal::ZERO;
    let mut tax = Decimal::ZERO;

    for bracket in brackets {
        let tranche = match bracket.upper_limit {
            Some(limit) => remaining.min(limit - previous_limit).max(Decimal::ZERO),
            None => remaining,
        };
        if tranche <= Decimal::ZERO {
            break;
        }

        tax += tranche * bracket.marginal_rate;
        remaining -= tranche;
        if let Some(limit) = bracket.upper_limit {
            previous_limit = limit;
        }
    }

    tax
}

/// Rate applied to the last unit of `taxable_base`.
pub fn marginal_rate(
    taxable_base: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if taxable_base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    brackets
        .iter()
        .find(|b| b.upper_limit.is_none_or(|limit| taxable_base <= limit))
        .or(brackets.last())
        .map_or(Decimal::ZERO, |b| b.marginal_rate)
}

/// Highest rate in the table; the ceiling no effective rate can reach.
pub fn top_marginal_rate(brackets: &[TaxBracket]) -> Decimal {
    brackets
        .iter()
        .map(|b| b.marginal_rate)
        .max()
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::test_support::nationwide_brackets;

    // =========================================================================
    // evaluate tests
    // =========================================================================

    #[test]
    fn evaluate_returns_zero_for_zero_base() {
        assert_eq!(evaluate(dec!(0), &nationwide_brackets()), dec!(0));
    }

    #[test]
    fn evaluate_returns_zero_for_negative_base() {
        assert_eq!(evaluate(dec!(-5000), &nationwide_brackets()), dec!(0));
    }

    #[test]
    fn evaluate_returns_zero_for_empty_table() {
        assert_eq!(evaluate(dec!(50000), &[]), dec!(0));
    }

    #[test]
    fn evaluate_within_first_bracket() {
        let result = evaluate(dec!(10000), &nationwide_brackets());

        assert_eq!(result, dec!(950.000));
    }

    #[test]
    fn evaluate_at_first_boundary() {
        let result = evaluate(dec!(12450), &nationwide_brackets());

        assert_eq!(result, dec!(1182.75));
    }

    #[test]
    fn evaluate_second_bracket() {
        let result = evaluate(dec!(15000), &nationwide_brackets());

        // 1182.75 + (15000 - 12450) × 12% = 1182.75 + 306
        assert_eq!(result, dec!(1488.75));
    }

    #[test]
    fn evaluate_fourth_bracket() {
        let result = evaluate(dec!(40000), &nationwide_brackets());

        // 1182.75 + 930 + 2250 + (40000 - 35200) × 18.5% = 5250.75
        assert_eq!(result, dec!(5250.75));
    }

    #[test]
    fn evaluate_top_bracket() {
        let result = evaluate(dec!(400000), &nationwide_brackets());

        // 1182.75 + 930 + 2250 + 4588 + 54000 + 100000 × 24.5%
        assert_eq!(result, dec!(87450.75));
    }

    #[test]
    fn evaluate_single_unbounded_bracket_is_flat() {
        let brackets = vec![TaxBracket::unbounded(dec!(0.20))];

        assert_eq!(evaluate(dec!(12345), &brackets), dec!(2469.00));
    }

    #[test]
    fn evaluate_stops_when_table_has_no_unbounded_bracket() {
        let brackets = vec![
            TaxBracket::bounded(dec!(1000), dec!(0.10)),
            TaxBracket::bounded(dec!(2000), dec!(0.20)),
        ];

        // Income above the last limit is untaxed rather than double counted
        assert_eq!(evaluate(dec!(5000), &brackets), dec!(300.00));
    }

    #[test]
    fn evaluate_does_not_retax_lower_tranches() {
        let brackets = nationwide_brackets();
        let below = evaluate(dec!(20200), &brackets);
        let above = evaluate(dec!(20201), &brackets);

        assert_eq!(above - below, dec!(0.15));
    }

    // =========================================================================
    // marginal_rate tests
    // =========================================================================

    #[test]
    fn marginal_rate_finds_containing_bracket() {
        let brackets = nationwide_brackets();

        assert_eq!(marginal_rate(dec!(12450), &brackets), dec!(0.095));
        assert_eq!(marginal_rate(dec!(12451), &brackets), dec!(0.12));
        assert_eq!(marginal_rate(dec!(1000000), &brackets), dec!(0.245));
    }

    #[test]
    fn marginal_rate_is_zero_without_income() {
        assert_eq!(marginal_rate(dec!(0), &nationwide_brackets()), dec!(0));
        assert_eq!(marginal_rate(dec!(100), &[]), dec!(0));
    }

    #[test]
    fn top_marginal_rate_of_nationwide_table() {
        assert_eq!(top_marginal_rate(&nationwide_brackets()), dec!(0.245));
        assert_eq!(top_marginal_rate(&[]), dec!(0));
    }
}
