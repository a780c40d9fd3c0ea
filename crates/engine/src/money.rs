use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// Signed money amount in **whole Colombian pesos**.
///
/// COP has no minor unit in day-to-day bookkeeping, so amounts are plain
/// integers. Use this type for every monetary value in the engine (sales,
/// payments, expenses, totals) instead of raw `i64`/`f64`.
///
/// The value is signed: a negative total marks a loss day, which is a valid
/// state and not an error.
///
/// # Examples
///
/// ```rust
/// use engine::Pesos;
///
/// let stipend = Pesos::new(60_000);
/// assert_eq!(stipend.value(), 60_000);
/// assert_eq!(stipend.to_string(), "$60.000");
/// assert_eq!((-stipend).to_string(), "-$60.000");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Pesos(i64);

impl Pesos {
    pub const ZERO: Pesos = Pesos(0);

    /// Creates a new amount from whole pesos.
    #[must_use]
    pub const fn new(pesos: i64) -> Self {
        Self(pesos)
    }

    /// Returns the raw value in pesos.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Pesos) -> Option<Pesos> {
        self.0.checked_add(rhs.0).map(Pesos)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Pesos) -> Option<Pesos> {
        self.0.checked_sub(rhs.0).map(Pesos)
    }
}

impl fmt::Display for Pesos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        write!(f, "{sign}${grouped}")
    }
}

impl From<i64> for Pesos {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Pesos> for i64 {
    fn from(value: Pesos) -> Self {
        value.0
    }
}

impl Add for Pesos {
    type Output = Pesos;

    fn add(self, rhs: Pesos) -> Self::Output {
        Pesos(self.0 + rhs.0)
    }
}

impl AddAssign for Pesos {
    fn add_assign(&mut self, rhs: Pesos) {
        self.0 += rhs.0;
    }
}

impl Sub for Pesos {
    type Output = Pesos;

    fn sub(self, rhs: Pesos) -> Self::Output {
        Pesos(self.0 - rhs.0)
    }
}

impl SubAssign for Pesos {
    fn sub_assign(&mut self, rhs: Pesos) {
        self.0 -= rhs.0;
    }
}

impl Neg for Pesos {
    type Output = Pesos;

    fn neg(self) -> Self::Output {
        Pesos(-self.0)
    }
}

impl Sum for Pesos {
    fn sum<I: Iterator<Item = Pesos>>(iter: I) -> Self {
        iter.fold(Pesos::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_groups_thousands() {
        assert_eq!(Pesos::new(0).to_string(), "$0");
        assert_eq!(Pesos::new(950).to_string(), "$950");
        assert_eq!(Pesos::new(60_000).to_string(), "$60.000");
        assert_eq!(Pesos::new(1_234_567).to_string(), "$1.234.567");
        assert_eq!(Pesos::new(-110_000).to_string(), "-$110.000");
    }

    #[test]
    fn arithmetic_and_sum() {
        let a = Pesos::new(200_000);
        let b = Pesos::new(90_000);
        assert_eq!(a - b, Pesos::new(110_000));
        assert_eq!([a, b].into_iter().sum::<Pesos>(), Pesos::new(290_000));
        assert!((b - a).is_negative());
    }

    #[test]
    fn checked_ops_catch_overflow() {
        assert_eq!(Pesos::new(i64::MAX).checked_add(Pesos::new(1)), None);
        assert_eq!(
            Pesos::new(1).checked_sub(Pesos::new(1)),
            Some(Pesos::ZERO)
        );
    }
}
