//! Duel records and their storage trait.

use crate::StoreError;
use arena_types::{
    AccountId, Declaration, DuelId, DuelState, GameKind, Side, TicketAmount, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Audit trail of a privileged admin settlement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminOverride {
    pub resolved_by: AccountId,
    pub reason: String,
    pub resolved_at: Timestamp,
}

/// The central aggregate: a two-party staked match.
///
/// Terminal records are never deleted — they are the audit history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DuelRecord {
    pub id: DuelId,
    pub creator: AccountId,
    /// Absent until someone joins. `creator != opponent` is enforced at join.
    pub opponent: Option<AccountId>,
    pub game: GameKind,
    /// Tickets escrowed by each participant at their join point.
    pub stake: TicketAmount,
    /// Play window from `started_at` to `expires_at`.
    pub duration_secs: u64,
    pub state: DuelState,
    pub creator_declaration: Option<Declaration>,
    pub opponent_declaration: Option<Declaration>,
    /// Set exactly once, immutable thereafter; present iff Completed.
    pub winner: Option<AccountId>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub disputed_at: Option<Timestamp>,
    /// Idempotency guard: refunds are issued at most once per duel.
    pub refund_issued: bool,
    pub admin_override: Option<AdminOverride>,
}

impl DuelRecord {
    pub fn new(
        id: DuelId,
        creator: AccountId,
        game: GameKind,
        stake: TicketAmount,
        duration_secs: u64,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            creator,
            opponent: None,
            game,
            stake,
            duration_secs,
            state: DuelState::Open,
            creator_declaration: None,
            opponent_declaration: None,
            winner: None,
            created_at,
            started_at: None,
            expires_at: None,
            completed_at: None,
            disputed_at: None,
            refund_issued: false,
            admin_override: None,
        }
    }

    /// Which seat `account` occupies, if any.
    pub fn side_of(&self, account: &AccountId) -> Option<Side> {
        if *account == self.creator {
            Some(Side::Creator)
        } else if self.opponent.as_ref() == Some(account) {
            Some(Side::Opponent)
        } else {
            None
        }
    }

    pub fn account_on(&self, side: Side) -> Option<AccountId> {
        match side {
            Side::Creator => Some(self.creator),
            Side::Opponent => self.opponent,
        }
    }

    pub fn declaration_of(&self, side: Side) -> Option<Declaration> {
        match side {
            Side::Creator => self.creator_declaration,
            Side::Opponent => self.opponent_declaration,
        }
    }

    /// Record a declaration. Last write wins while the duel is non-terminal.
    pub fn set_declaration(&mut self, side: Side, declaration: Declaration) {
        match side {
            Side::Creator => self.creator_declaration = Some(declaration),
            Side::Opponent => self.opponent_declaration = Some(declaration),
        }
    }

    /// Derived predicate — never stored as separate authoritative state.
    pub fn both_declared(&self) -> bool {
        self.creator_declaration.is_some() && self.opponent_declaration.is_some()
    }

    /// Whether the play window has closed.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.expires_at, Some(deadline) if now > deadline)
    }

    /// Tickets currently held in escrow for this duel: `stake × joined
    /// participants` while non-terminal, zero once settled or refunded.
    pub fn escrowed(&self) -> TicketAmount {
        if self.state.is_terminal() {
            return TicketAmount::ZERO;
        }
        let mut total = self.stake;
        if self.opponent.is_some() {
            total = total + self.stake;
        }
        total
    }
}

/// Trait for duel storage operations.
pub trait DuelStore: Send + Sync {
    /// Hand out the next unused duel id.
    fn allocate_duel_id(&self) -> Result<DuelId, StoreError>;
    fn get_duel(&self, id: &DuelId) -> Result<DuelRecord, StoreError>;
    fn put_duel(&self, record: &DuelRecord) -> Result<(), StoreError>;
    fn duel_count(&self) -> Result<u64, StoreError>;
    fn iter_duels(&self) -> Result<Vec<DuelRecord>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_duel() -> DuelRecord {
        DuelRecord::new(
            DuelId::new(1),
            AccountId::new(10),
            GameKind::BoxFight,
            TicketAmount::new(50),
            600,
            Timestamp::new(1000),
        )
    }

    #[test]
    fn side_of_distinguishes_participants() {
        let mut duel = open_duel();
        assert_eq!(duel.side_of(&AccountId::new(10)), Some(Side::Creator));
        assert_eq!(duel.side_of(&AccountId::new(20)), None);

        duel.opponent = Some(AccountId::new(20));
        assert_eq!(duel.side_of(&AccountId::new(20)), Some(Side::Opponent));
        assert_eq!(duel.side_of(&AccountId::new(30)), None);
    }

    #[test]
    fn escrow_tracks_joined_participants() {
        let mut duel = open_duel();
        assert_eq!(duel.escrowed(), TicketAmount::new(50));

        duel.opponent = Some(AccountId::new(20));
        duel.state = DuelState::Active;
        assert_eq!(duel.escrowed(), TicketAmount::new(100));

        duel.state = DuelState::Completed;
        assert_eq!(duel.escrowed(), TicketAmount::ZERO);
    }

    #[test]
    fn declarations_overwrite() {
        let mut duel = open_duel();
        duel.set_declaration(Side::Creator, Declaration::Defeat);
        duel.set_declaration(Side::Creator, Declaration::Victory);
        assert_eq!(duel.declaration_of(Side::Creator), Some(Declaration::Victory));
        assert!(!duel.both_declared());
    }
}
