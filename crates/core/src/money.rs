//! Monetary amounts.

use serde::{Deserialize, Serialize};

/// Non-negative amount in whole currency units.
///
/// The unsigned representation makes a negative budget unrepresentable;
/// subtraction is only available in checked form.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub const fn amount(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `None` when `rhs` exceeds `self`.
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Balances are uncapped; the only ceiling is the representation.
    pub fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl From<u64> for Money {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Renders with thousands separators and a trailing `$`, e.g. `1,000$`.
impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{grouped}$")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_groups_thousands() {
        assert_eq!(Money::new(0).to_string(), "0$");
        assert_eq!(Money::new(40).to_string(), "40$");
        assert_eq!(Money::new(999).to_string(), "999$");
        assert_eq!(Money::new(1000).to_string(), "1,000$");
        assert_eq!(Money::new(1_234_567).to_string(), "1,234,567$");
    }

    #[test]
    fn checked_sub_refuses_to_go_negative() {
        assert_eq!(Money::new(100).checked_sub(Money::new(40)), Some(Money::new(60)));
        assert_eq!(Money::new(100).checked_sub(Money::new(100)), Some(Money::ZERO));
        assert_eq!(Money::new(39).checked_sub(Money::new(40)), None);
    }

    #[test]
    fn saturating_add_stops_at_representation_limit() {
        assert_eq!(Money::new(60).saturating_add(Money::new(40)), Money::new(100));
        assert_eq!(
            Money::new(u64::MAX).saturating_add(Money::new(1)),
            Money::new(u64::MAX)
        );
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&Money::new(1000)).unwrap();
        assert_eq!(json, "1000");
    }
}
