use proptest::prelude::*;

use arena_types::{TicketAmount, Timestamp};

proptest! {
    /// checked_add never wraps: it is Some exactly when u64 addition fits.
    #[test]
    fn ticket_checked_add_matches_u64(a in 0u64.., b in 0u64..) {
        let sum = TicketAmount::new(a).checked_add(TicketAmount::new(b));
        prop_assert_eq!(sum.map(|s| s.raw()), a.checked_add(b));
    }

    /// checked_sub is Some exactly when the balance covers the debit.
    #[test]
    fn ticket_checked_sub_matches_u64(a in 0u64.., b in 0u64..) {
        let diff = TicketAmount::new(a).checked_sub(TicketAmount::new(b));
        prop_assert_eq!(diff.is_some(), a >= b);
        if let Some(d) = diff {
            prop_assert_eq!(d.raw(), a - b);
        }
    }

    /// Escrow and refund round-trip: debiting a stake then crediting it back
    /// restores the original balance.
    #[test]
    fn ticket_escrow_roundtrip(balance in 0u64.., stake in 0u64..) {
        prop_assume!(stake <= balance);
        let after_debit = TicketAmount::new(balance)
            .checked_sub(TicketAmount::new(stake))
            .unwrap();
        let restored = after_debit.checked_add(TicketAmount::new(stake)).unwrap();
        prop_assert_eq!(restored.raw(), balance);
    }

    /// Timestamp ordering mirrors the raw seconds.
    #[test]
    fn timestamp_ordering(a in 0u64.., b in 0u64..) {
        prop_assert_eq!(Timestamp::new(a) <= Timestamp::new(b), a <= b);
    }

    /// has_expired is monotone in `now`: once expired, always expired.
    #[test]
    fn expiry_is_monotone(start in 0u64..1_000_000, dur in 0u64..1_000_000, now in 0u64..4_000_000, later in 0u64..1_000_000) {
        let t = Timestamp::new(start);
        if t.has_expired(dur, Timestamp::new(now)) {
            prop_assert!(t.has_expired(dur, Timestamp::new(now + later)));
        }
    }

    /// TicketAmount bincode roundtrip.
    #[test]
    fn ticket_bincode_roundtrip(a in 0u64..) {
        let amount = TicketAmount::new(a);
        let encoded = bincode::serialize(&amount).unwrap();
        let decoded: TicketAmount = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, amount);
    }
}
