//! # Money helpers
//!
//! All balances and transaction amounts are `rust_decimal::Decimal` with
//! a fixed scale of 2. Floating point is never used for money.

use crate::error::{CoreError, CoreResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// Monetary scale: two decimal places (paise).
pub const MONEY_SCALE: u32 = 2;

/// Round a monetary value to two decimal places, half-up.
///
/// Every amount is normalized through this before it touches a balance,
/// so `deposit(x)` followed by `withdraw(x)` restores the balance exactly.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate that an operation amount is strictly positive.
///
/// Zero and negative amounts are rejected uniformly on every path.
pub fn ensure_positive(amount: Decimal) -> CoreResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(CoreError::InvalidAmount(amount));
    }
    Ok(round_money(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(10)), dec!(10.00));
        assert_eq!(round_money(dec!(1025.0000)), dec!(1025.00));
    }

    #[test]
    fn test_ensure_positive_accepts_and_rounds() {
        assert_eq!(ensure_positive(dec!(99.999)).unwrap(), dec!(100.00));
    }

    #[test]
    fn test_ensure_positive_rejects_zero_and_negative() {
        assert!(matches!(
            ensure_positive(Decimal::ZERO),
            Err(CoreError::InvalidAmount(_))
        ));
        assert!(matches!(
            ensure_positive(dec!(-5)),
            Err(CoreError::InvalidAmount(_))
        ));
    }
}
