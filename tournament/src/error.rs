use arena_ledger::LedgerError;
use arena_store::StoreError;
use arena_types::{AccountId, TicketAmount, TournamentId, TournamentState};

#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        needed: TicketAmount,
        available: TicketAmount,
    },

    #[error("tournament {tournament} is {state:?}, cannot {event}")]
    InvalidState {
        tournament: TournamentId,
        state: TournamentState,
        event: &'static str,
    },

    #[error("account {0} is not verified to play")]
    NotEligible(AccountId),

    #[error("account {0} lacks admin privileges")]
    NotAuthorized(AccountId),

    #[error("account {0} is already registered")]
    AlreadyRegistered(AccountId),

    #[error("tournament {0} is full")]
    Full(TournamentId),

    #[error("need at least 2 participants, have {0}")]
    NotEnoughParticipants(usize),

    #[error("capacity must be at least 2, got {0}")]
    CapacityTooSmall(u32),

    #[error("no match {number} in round {round}")]
    MatchNotFound { round: u32, number: u32 },

    #[error("match already has a result")]
    AlreadyPlayed,

    #[error("account {0} is not in this match")]
    NotInMatch(AccountId),

    #[error("ledger error: {0}")]
    Ledger(LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<LedgerError> for TournamentError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds { needed, available } => {
                Self::InsufficientFunds { needed, available }
            }
            other => Self::Ledger(other),
        }
    }
}
