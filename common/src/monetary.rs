//! Monetary validation helpers.
//!
//! Ledger amounts are stored as `NUMERIC(10,2)`; every amount accepted by
//! the engine must be strictly positive and representable at two decimal
//! places without rounding.

use rust_decimal::Decimal;

/// Fractional digits carried by the `NUMERIC(10,2)` schema columns.
pub const MONEY_SCALE: u32 = 2;

/// Check that an amount is a valid transfer amount: strictly positive and
/// no more precise than the schema can hold.
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount.normalize().scale() <= MONEY_SCALE
}

/// Round a balance read back from the store to the schema scale.
///
/// Postgres already stores two fractional digits; this keeps display and
/// comparison in tests stable when a driver reports trailing zeros.
pub fn to_money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_amounts() {
        assert!(is_valid_amount(Decimal::from_str_exact("0.01").unwrap()));
        assert!(is_valid_amount(Decimal::from_str_exact("50.00").unwrap()));
        assert!(is_valid_amount(Decimal::from(1000)));
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(!is_valid_amount(Decimal::ZERO));
        assert!(!is_valid_amount(Decimal::from_str_exact("-5").unwrap()));
        assert!(!is_valid_amount(Decimal::from_str_exact("-0.01").unwrap()));
    }

    #[test]
    fn test_rejects_overprecise() {
        assert!(!is_valid_amount(Decimal::from_str_exact("0.001").unwrap()));
        assert!(!is_valid_amount(Decimal::from_str_exact("9.999").unwrap()));
        // Trailing zeros beyond scale 2 are fine after normalization.
        assert!(is_valid_amount(Decimal::from_str_exact("1.2300").unwrap()));
    }

    #[test]
    fn test_to_money_scale() {
        let v = Decimal::from_str_exact("34.5").unwrap();
        assert_eq!(to_money(v), Decimal::from_str_exact("34.50").unwrap());
    }
}
