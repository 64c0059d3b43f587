//! Ticket amount type.
//!
//! Tickets are the platform's virtual currency. Amounts are plain integers
//! (u64) — a balance can never go negative because subtraction is only ever
//! performed through checked operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A quantity of tickets — a balance, a stake, or a pot.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TicketAmount(u64);

impl TicketAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// The pot for a two-sided stake: `self × 2`.
    pub fn doubled(self) -> Option<Self> {
        self.0.checked_mul(2).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for TicketAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for TicketAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tickets", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_sub_underflow_is_none() {
        assert_eq!(TicketAmount::new(5).checked_sub(TicketAmount::new(6)), None);
        assert_eq!(
            TicketAmount::new(5).checked_sub(TicketAmount::new(5)),
            Some(TicketAmount::ZERO)
        );
    }

    #[test]
    fn doubled_is_the_pot() {
        assert_eq!(TicketAmount::new(50).doubled(), Some(TicketAmount::new(100)));
        assert_eq!(TicketAmount::new(u64::MAX).doubled(), None);
    }

    #[test]
    fn display_format() {
        assert_eq!(TicketAmount::new(100).to_string(), "100 tickets");
    }
}
