//! Withdrawal lifecycle: request, settle, reject.
//!
//! Tickets are debited when the request is accepted and sit in the pending
//! bucket until an admin settles (tickets leave the economy) or rejects
//! (tickets return to the account). The bank transfer itself is simulated;
//! settlement just records a transaction reference.

use crate::{Ledger, LedgerError};
use arena_store::{AccountStore, WithdrawalRecord, WithdrawalStore};
use arena_types::{AccountId, ArenaParams, TicketAmount, Timestamp, WithdrawalId, WithdrawalState};
use std::sync::Arc;
use tracing::info;

pub struct WithdrawalEngine {
    accounts: Arc<dyn AccountStore>,
    withdrawals: Arc<dyn WithdrawalStore>,
    ledger: Ledger,
    params: ArenaParams,
}

impl WithdrawalEngine {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        withdrawals: Arc<dyn WithdrawalStore>,
        ledger: Ledger,
        params: ArenaParams,
    ) -> Self {
        Self {
            accounts,
            withdrawals,
            ledger,
            params,
        }
    }

    /// Open a withdrawal request for `euros`, debiting the ticket
    /// equivalent up front.
    ///
    /// Requires a verified account with bank details on file, and an amount
    /// within the configured bounds.
    pub fn request(
        &self,
        account: &AccountId,
        euros: u64,
        now: Timestamp,
    ) -> Result<WithdrawalRecord, LedgerError> {
        let acct = self.accounts.get_account(account)?;
        if !acct.can_withdraw() {
            return Err(LedgerError::NotEligible(*account));
        }
        if euros < self.params.min_withdrawal_euros || euros > self.params.max_withdrawal_euros {
            return Err(LedgerError::AmountOutOfRange {
                euros,
                min: self.params.min_withdrawal_euros,
                max: self.params.max_withdrawal_euros,
            });
        }
        let tickets = euros
            .checked_mul(self.params.tickets_per_euro)
            .map(TicketAmount::new)
            .ok_or(LedgerError::Overflow)?;
        self.ledger.debit(account, tickets)?;

        let id = self.withdrawals.allocate_withdrawal_id()?;
        let record = WithdrawalRecord {
            id,
            account: *account,
            amount_euros: euros,
            amount_tickets: tickets,
            state: WithdrawalState::Pending,
            transaction_ref: None,
            note: String::new(),
            requested_at: now,
            processed_at: None,
        };
        self.withdrawals.put_withdrawal(&record)?;
        info!(withdrawal = %id, %account, euros, %tickets, "withdrawal requested");
        Ok(record)
    }

    /// Mark a pending withdrawal as transferred.
    ///
    /// Idempotent: settling an already-settled withdrawal returns it
    /// unchanged. A rejected withdrawal cannot be settled — its tickets
    /// were already refunded.
    pub fn settle(
        &self,
        id: &WithdrawalId,
        now: Timestamp,
    ) -> Result<WithdrawalRecord, LedgerError> {
        let mut record = self.withdrawals.get_withdrawal(id)?;
        match record.state {
            WithdrawalState::Settled => return Ok(record),
            WithdrawalState::Rejected => {
                return Err(LedgerError::InvalidWithdrawalState(record.state))
            }
            WithdrawalState::Pending => {}
        }
        record.state = WithdrawalState::Settled;
        record.transaction_ref = Some(format!("TXN-{:08X}", rand::random::<u32>()));
        record.note = format!("{}€ transferred", record.amount_euros);
        record.processed_at = Some(now);
        self.withdrawals.put_withdrawal(&record)?;
        info!(
            withdrawal = %id,
            account = %record.account,
            txn = record.transaction_ref.as_deref().unwrap_or(""),
            "withdrawal settled"
        );
        Ok(record)
    }

    /// Reject a pending withdrawal and return its tickets to the account.
    ///
    /// Idempotent: rejecting an already-rejected withdrawal returns it
    /// unchanged without refunding a second time. A settled withdrawal
    /// cannot be rejected.
    pub fn reject(
        &self,
        id: &WithdrawalId,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<WithdrawalRecord, LedgerError> {
        let mut record = self.withdrawals.get_withdrawal(id)?;
        match record.state {
            WithdrawalState::Rejected => return Ok(record),
            WithdrawalState::Settled => {
                return Err(LedgerError::InvalidWithdrawalState(record.state))
            }
            WithdrawalState::Pending => {}
        }
        self.ledger.credit(&record.account, record.amount_tickets)?;
        record.state = WithdrawalState::Rejected;
        record.note = reason.into();
        record.processed_at = Some(now);
        self.withdrawals.put_withdrawal(&record)?;
        info!(withdrawal = %id, account = %record.account, "withdrawal rejected, tickets refunded");
        Ok(record)
    }

    pub fn pending(&self) -> Result<Vec<WithdrawalRecord>, LedgerError> {
        let mut pending: Vec<_> = self
            .withdrawals
            .iter_withdrawals()?
            .into_iter()
            .filter(|w| w.state == WithdrawalState::Pending)
            .collect();
        pending.sort_by_key(|w| w.requested_at);
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_store::{AccountRecord, MemoryStore};
    use arena_types::VerificationState;

    fn engine_with_account(tickets: u64) -> (WithdrawalEngine, Arc<MemoryStore>, AccountId) {
        let store = Arc::new(MemoryStore::new());
        let id = AccountId::new(1);
        let mut acct =
            AccountRecord::new(id, "alice", TicketAmount::new(tickets), Timestamp::new(0));
        acct.verification = VerificationState::Verified;
        acct.bank_details_present = true;
        store.put_account(&acct).unwrap();

        let ledger = Ledger::new(store.clone());
        let engine = WithdrawalEngine::new(
            store.clone(),
            store.clone(),
            ledger,
            ArenaParams::arena_defaults(),
        );
        (engine, store, id)
    }

    #[test]
    fn request_debits_tickets_up_front() {
        let (engine, store, id) = engine_with_account(500);
        let record = engine.request(&id, 10, Timestamp::new(100)).unwrap();
        assert_eq!(record.amount_tickets, TicketAmount::new(100));
        assert_eq!(record.state, WithdrawalState::Pending);
        assert_eq!(
            store.get_account(&id).unwrap().tickets,
            TicketAmount::new(400)
        );
    }

    #[test]
    fn unverified_account_cannot_withdraw() {
        let (engine, store, id) = engine_with_account(500);
        store
            .update_account(&id, &mut |rec| {
                rec.verification = VerificationState::Pending;
                true
            })
            .unwrap();
        assert!(matches!(
            engine.request(&id, 10, Timestamp::new(100)),
            Err(LedgerError::NotEligible(_))
        ));
    }

    #[test]
    fn amount_bounds_enforced() {
        let (engine, _, id) = engine_with_account(500_000);
        assert!(matches!(
            engine.request(&id, 0, Timestamp::new(0)),
            Err(LedgerError::AmountOutOfRange { .. })
        ));
        assert!(matches!(
            engine.request(&id, 5000, Timestamp::new(0)),
            Err(LedgerError::AmountOutOfRange { .. })
        ));
    }

    #[test]
    fn settle_is_idempotent() {
        let (engine, _, id) = engine_with_account(500);
        let record = engine.request(&id, 10, Timestamp::new(100)).unwrap();

        let settled = engine.settle(&record.id, Timestamp::new(200)).unwrap();
        assert_eq!(settled.state, WithdrawalState::Settled);
        let txn = settled.transaction_ref.clone().unwrap();
        assert!(txn.starts_with("TXN-"));

        let again = engine.settle(&record.id, Timestamp::new(300)).unwrap();
        assert_eq!(again.transaction_ref.unwrap(), txn);
        assert_eq!(again.processed_at, Some(Timestamp::new(200)));
    }

    #[test]
    fn reject_refunds_exactly_once() {
        let (engine, store, id) = engine_with_account(500);
        let record = engine.request(&id, 10, Timestamp::new(100)).unwrap();
        assert_eq!(
            store.get_account(&id).unwrap().tickets,
            TicketAmount::new(400)
        );

        engine
            .reject(&record.id, "suspicious activity", Timestamp::new(200))
            .unwrap();
        assert_eq!(
            store.get_account(&id).unwrap().tickets,
            TicketAmount::new(500)
        );

        // A second reject must not refund again.
        engine
            .reject(&record.id, "duplicate", Timestamp::new(300))
            .unwrap();
        assert_eq!(
            store.get_account(&id).unwrap().tickets,
            TicketAmount::new(500)
        );
    }

    #[test]
    fn settled_withdrawal_cannot_be_rejected() {
        let (engine, _, id) = engine_with_account(500);
        let record = engine.request(&id, 10, Timestamp::new(100)).unwrap();
        engine.settle(&record.id, Timestamp::new(200)).unwrap();
        assert!(matches!(
            engine.reject(&record.id, "too late", Timestamp::new(300)),
            Err(LedgerError::InvalidWithdrawalState(_))
        ));
    }
}
