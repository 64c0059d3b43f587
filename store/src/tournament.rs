//! Tournament records and their storage trait.

use crate::StoreError;
use arena_types::{AccountId, GameKind, TicketAmount, Timestamp, TournamentId, TournamentState};
use serde::{Deserialize, Serialize};

/// One match of a single-elimination bracket.
///
/// A bye is a match without a second player; its winner is fixed when the
/// match is created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BracketMatch {
    pub round: u32,
    /// 1-based position within the round.
    pub number: u32,
    pub player1: AccountId,
    pub player2: Option<AccountId>,
    pub winner: Option<AccountId>,
    pub played_at: Option<Timestamp>,
}

impl BracketMatch {
    pub fn is_bye(&self) -> bool {
        self.player2.is_none()
    }

    pub fn involves(&self, account: &AccountId) -> bool {
        self.player1 == *account || self.player2.as_ref() == Some(account)
    }
}

/// A single-elimination tournament with a closed prize pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub id: TournamentId,
    pub name: String,
    pub game: GameKind,
    /// Tickets debited from each entrant at registration.
    pub entry_fee: TicketAmount,
    /// Funded exclusively by entry fees; paid in full to the champion.
    pub prize_pool: TicketAmount,
    pub max_participants: u32,
    pub participants: Vec<AccountId>,
    pub matches: Vec<BracketMatch>,
    pub state: TournamentState,
    pub winner: Option<AccountId>,
    pub created_at: Timestamp,
}

impl TournamentRecord {
    pub fn new(
        id: TournamentId,
        name: impl Into<String>,
        game: GameKind,
        entry_fee: TicketAmount,
        max_participants: u32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            game,
            entry_fee,
            prize_pool: TicketAmount::ZERO,
            max_participants,
            participants: Vec::new(),
            matches: Vec::new(),
            state: TournamentState::Open,
            winner: None,
            created_at,
        }
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() as u32 >= self.max_participants
    }

    pub fn is_registered(&self, account: &AccountId) -> bool {
        self.participants.contains(account)
    }

    /// All matches of one round.
    pub fn round_matches(&self, round: u32) -> Vec<&BracketMatch> {
        self.matches.iter().filter(|m| m.round == round).collect()
    }

    /// Highest round number present in the bracket (0 before start).
    pub fn current_round(&self) -> u32 {
        self.matches.iter().map(|m| m.round).max().unwrap_or(0)
    }

    /// Tickets held in this tournament's pool while it is still live.
    pub fn escrowed(&self) -> TicketAmount {
        if self.state.is_terminal() {
            TicketAmount::ZERO
        } else {
            self.prize_pool
        }
    }
}

/// Trait for tournament storage operations.
pub trait TournamentStore: Send + Sync {
    fn allocate_tournament_id(&self) -> Result<TournamentId, StoreError>;
    fn get_tournament(&self, id: &TournamentId) -> Result<TournamentRecord, StoreError>;
    fn put_tournament(&self, record: &TournamentRecord) -> Result<(), StoreError>;
    fn iter_tournaments(&self) -> Result<Vec<TournamentRecord>, StoreError>;
}
