//! Account records and their storage trait.

use crate::StoreError;
use arena_types::{AccountId, Role, TicketAmount, Timestamp, VerificationState};
use serde::{Deserialize, Serialize};

/// Per-account information persisted by the backend.
///
/// Identity and credentials live in the external auth collaborator; this
/// record carries only what the ledger and state machine need.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    pub display_name: String,
    /// Ticket balance. Never negative — every debit goes through a checked
    /// subtraction applied under the store lock.
    pub tickets: TicketAmount,
    /// Cumulative duel victories. Monotonically non-decreasing.
    pub victories: u64,
    pub defeats: u64,
    /// Derived from `victories`; recomputed whenever it changes.
    pub rank: String,
    pub role: Role,
    pub verification: VerificationState,
    /// Whether IBAN/BIC are on file (collected elsewhere).
    pub bank_details_present: bool,
    pub created_at: Timestamp,
}

impl AccountRecord {
    pub fn new(
        id: AccountId,
        display_name: impl Into<String>,
        starting_tickets: TicketAmount,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            tickets: starting_tickets,
            victories: 0,
            defeats: 0,
            rank: String::new(),
            role: Role::Player,
            verification: VerificationState::Unverified,
            bank_details_present: false,
            created_at,
        }
    }

    /// Whether this account may stake tickets in duels and tournaments.
    pub fn can_play(&self) -> bool {
        self.verification.allows_play()
    }

    /// Whether this account may request a cash withdrawal.
    pub fn can_withdraw(&self) -> bool {
        self.can_play() && self.bank_details_present
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Trait for account storage operations.
pub trait AccountStore: Send + Sync {
    fn get_account(&self, id: &AccountId) -> Result<AccountRecord, StoreError>;
    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError>;
    fn exists(&self, id: &AccountId) -> Result<bool, StoreError>;
    fn account_count(&self) -> Result<u64, StoreError>;
    fn iter_accounts(&self) -> Result<Vec<AccountRecord>, StoreError>;

    /// Atomically check-and-mutate one account.
    ///
    /// `apply` runs under the store's lock. Returning `false` discards the
    /// mutation and commits nothing. Returns the record as committed, or the
    /// untouched record if the closure declined. This is the primitive the
    /// ledger builds its no-interleaved-read-then-write debit on.
    fn update_account(
        &self,
        id: &AccountId,
        apply: &mut dyn FnMut(&mut AccountRecord) -> bool,
    ) -> Result<AccountRecord, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eligibility_gates() {
        let mut acct = AccountRecord::new(
            AccountId::new(1),
            "alice",
            TicketAmount::new(100),
            Timestamp::new(0),
        );
        assert!(!acct.can_play());
        assert!(!acct.can_withdraw());

        acct.verification = VerificationState::Verified;
        assert!(acct.can_play());
        assert!(!acct.can_withdraw());

        acct.bank_details_present = true;
        assert!(acct.can_withdraw());
    }
}
