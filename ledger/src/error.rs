use arena_store::StoreError;
use arena_types::{AccountId, TicketAmount, WithdrawalState};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        needed: TicketAmount,
        available: TicketAmount,
    },

    #[error("ticket amount overflow")]
    Overflow,

    #[error("conservation violated: expected {expected}, accounted {accounted}")]
    ConservationViolation {
        expected: TicketAmount,
        accounted: TicketAmount,
    },

    #[error("account {0} is not eligible to withdraw")]
    NotEligible(AccountId),

    #[error("withdrawal amount {euros}€ outside allowed range {min}€..={max}€")]
    AmountOutOfRange { euros: u64, min: u64, max: u64 },

    #[error("withdrawal is {0}, operation not applicable")]
    InvalidWithdrawalState(WithdrawalState),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
