//! Withdrawal records and their storage trait.
//!
//! Actual bank transfer is simulated — the record only tracks the
//! tickets-to-euros conversion and the idempotent settlement transition.

use crate::StoreError;
use arena_types::{AccountId, TicketAmount, Timestamp, WithdrawalId, WithdrawalState};
use serde::{Deserialize, Serialize};

/// A request to convert tickets into a (simulated) bank transfer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub id: WithdrawalId,
    pub account: AccountId,
    pub amount_euros: u64,
    /// Tickets debited up front when the request was accepted.
    pub amount_tickets: TicketAmount,
    pub state: WithdrawalState,
    /// Simulated bank transaction reference, set at settlement.
    pub transaction_ref: Option<String>,
    /// Free-text audit note (settlement or rejection detail).
    pub note: String,
    pub requested_at: Timestamp,
    pub processed_at: Option<Timestamp>,
}

/// Trait for withdrawal storage operations.
pub trait WithdrawalStore: Send + Sync {
    fn allocate_withdrawal_id(&self) -> Result<WithdrawalId, StoreError>;
    fn get_withdrawal(&self, id: &WithdrawalId) -> Result<WithdrawalRecord, StoreError>;
    fn put_withdrawal(&self, record: &WithdrawalRecord) -> Result<(), StoreError>;
    fn iter_withdrawals(&self) -> Result<Vec<WithdrawalRecord>, StoreError>;
}
