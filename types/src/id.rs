//! Identifier newtypes for the core aggregates.
//!
//! Accounts are owned by the external identity collaborator; the ledger and
//! state machine only ever see opaque numeric ids.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Identity of a player or admin account.
    AccountId,
    "acct-"
);
id_type!(
    /// Identity of a duel aggregate.
    DuelId,
    "duel-"
);
id_type!(
    /// Identity of a tournament aggregate.
    TournamentId,
    "tourn-"
);
id_type!(
    /// Identity of a withdrawal request.
    WithdrawalId,
    "wd-"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_prefix() {
        assert_eq!(AccountId::new(7).to_string(), "acct-7");
        assert_eq!(DuelId::new(42).to_string(), "duel-42");
    }

    #[test]
    fn ids_are_ordered_by_raw_value() {
        assert!(DuelId::new(1) < DuelId::new(2));
        assert_eq!(AccountId::new(3).raw(), 3);
    }
}
