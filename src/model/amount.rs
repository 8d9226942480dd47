use rust_decimal::Decimal;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

/// An amount of money in major units, e.g. hryvnias, not kopecks.
///
/// Backed by an exact decimal with two fractional digits, so sums and aggregations reproduce the
/// upstream integer arithmetic without rounding drift. Negative amounts are spending, positive
/// amounts are income.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct UahAmount(Decimal);

impl UahAmount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from integer minor units (kopecks).
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::from_i128_with_scale(i128::from(minor), 2))
    }

    /// Magnitude of this amount with the sign dropped.
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Returns `true` for spending (outflow) amounts.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl From<Decimal> for UahAmount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<UahAmount> for Decimal {
    fn from(value: UahAmount) -> Self {
        value.0
    }
}

impl Add for UahAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for UahAmount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for UahAmount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for UahAmount {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for UahAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for UahAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor_is_exact() {
        let amount = UahAmount::from_minor(-4500);

        assert_eq!(Decimal::from(amount), Decimal::new(-4500, 2));
        assert_eq!(Decimal::from(amount) * Decimal::from(100), Decimal::from(-4500));
    }

    #[test]
    fn test_display_keeps_two_digits() {
        assert_eq!(UahAmount::from_minor(-4500).to_string(), "-45.00");
        assert_eq!(UahAmount::from_minor(100_000).to_string(), "1000.00");
        assert_eq!(UahAmount::from_minor(5).to_string(), "0.05");
    }

    #[test]
    fn test_math_ops() {
        let coffee = UahAmount::from_minor(-4500);
        let salary = UahAmount::from_minor(1_000_000);

        assert_eq!(coffee + salary, UahAmount::from_minor(995_500));
        assert_eq!(salary - coffee, UahAmount::from_minor(1_004_500));
        assert_eq!(-coffee, UahAmount::from_minor(4500));
        assert_eq!(coffee.abs(), UahAmount::from_minor(4500));

        let mut total = UahAmount::ZERO;
        total += coffee;
        total += coffee;
        assert_eq!(total, UahAmount::from_minor(-9000));
    }

    #[test]
    fn test_sum() {
        let amounts = [
            UahAmount::from_minor(-1000),
            UahAmount::from_minor(-2500),
            UahAmount::from_minor(500),
        ];

        let total: UahAmount = amounts.into_iter().sum();

        assert_eq!(total, UahAmount::from_minor(-3000));
        assert_eq!(total.to_string(), "-30.00");
    }

    #[test]
    fn test_sign_predicates() {
        assert!(UahAmount::from_minor(-1).is_negative());
        assert!(!UahAmount::from_minor(0).is_negative());
        assert!(!UahAmount::from_minor(1).is_negative());
    }

    #[test]
    fn test_equality_ignores_scale() {
        // `Decimal` equality is numeric, so zero with any scale is still zero.
        assert_eq!(UahAmount::ZERO, UahAmount::from_minor(0));
    }
}
