use arena_ledger::LedgerError;
use arena_store::StoreError;
use arena_types::{AccountId, DuelId, DuelState, TicketAmount};

#[derive(Debug, thiserror::Error)]
pub enum DuelError {
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        needed: TicketAmount,
        available: TicketAmount,
    },

    #[error("duel {duel} is {state}, cannot {event}")]
    InvalidState {
        duel: DuelId,
        state: DuelState,
        event: &'static str,
    },

    #[error("account {0} is not a participant of this duel")]
    NotParticipant(AccountId),

    #[error("account {0} is not verified to play")]
    NotEligible(AccountId),

    #[error("creator cannot join their own duel")]
    SelfJoin,

    #[error("duel {0} already has an opponent")]
    AlreadyJoined(DuelId),

    #[error("stake must be greater than zero")]
    ZeroStake,

    #[error("duel {0} has passed its play window")]
    Expired(DuelId),

    #[error("duel {0} is already resolved")]
    AlreadyResolved(DuelId),

    #[error("duel {0} is not disputed")]
    NotDisputed(DuelId),

    #[error("account {0} lacks admin privileges")]
    NotAuthorized(AccountId),

    #[error("ledger error: {0}")]
    Ledger(LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<LedgerError> for DuelError {
    fn from(err: LedgerError) -> Self {
        // Surface the one ledger failure callers act on; wrap the rest.
        match err {
            LedgerError::InsufficientFunds { needed, available } => {
                Self::InsufficientFunds { needed, available }
            }
            other => Self::Ledger(other),
        }
    }
}
