//! Exact decimal arithmetic for balances
//!
//! `Decimal::checked_add` only fails on overflow. Once the 96-bit mantissa is
//! full it rounds, dropping low-order digits. Custody balances must never
//! round, so every balance update goes through these helpers, which return
//! `None` unless the result is exact.

use rust_decimal::Decimal;

/// `a + b`, or `None` on overflow or if the sum is not exactly representable.
pub fn exact_add(a: Decimal, b: Decimal) -> Option<Decimal> {
    let sum = a.checked_add(b)?;
    // Both directions: a rounded sum can still give back the larger operand.
    if sum.checked_sub(b)? != a || sum.checked_sub(a)? != b {
        return None;
    }
    Some(sum)
}

/// `a - b`, or `None` on overflow or if the difference is not exactly
/// representable.
pub fn exact_sub(a: Decimal, b: Decimal) -> Option<Decimal> {
    exact_add(a, -b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big() -> Decimal {
        Decimal::from_i128_with_scale(10_i128.pow(28), 0)
    }

    fn tiny() -> Decimal {
        Decimal::new(1, 10)
    }

    #[test]
    fn test_exact_add_ordinary() {
        assert_eq!(
            exact_add(Decimal::new(15, 1), Decimal::new(25, 2)),
            Some(Decimal::new(175, 2))
        );
    }

    #[test]
    fn test_checked_add_rounds_silently() {
        // The behaviour the helpers guard against
        assert_eq!(big().checked_add(tiny()), Some(big()));
    }

    #[test]
    fn test_exact_add_rejects_rounding() {
        assert_eq!(exact_add(big(), tiny()), None);
        assert_eq!(exact_add(tiny(), big()), None);
    }

    #[test]
    fn test_exact_add_overflow() {
        assert_eq!(exact_add(Decimal::MAX, Decimal::ONE), None);
    }

    #[test]
    fn test_exact_sub_rejects_rounding() {
        assert_eq!(exact_sub(big(), tiny()), None);
        assert_eq!(exact_sub(tiny(), tiny()), Some(Decimal::ZERO));
    }

    #[test]
    fn test_exact_with_zero() {
        assert_eq!(exact_add(Decimal::ZERO, tiny()), Some(tiny()));
        assert_eq!(exact_sub(big(), Decimal::ZERO), Some(big()));
    }
}
