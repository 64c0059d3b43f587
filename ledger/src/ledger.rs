//! Atomic ticket movements and the conservation audit.

use crate::LedgerError;
use arena_store::{AccountStore, DuelRecord, DuelStore, TournamentStore, WithdrawalStore};
use arena_types::{AccountId, TicketAmount, WithdrawalState};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Whether [`Ledger::refund_all`] actually moved tickets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefundOutcome {
    /// Stakes returned; total credited across participants.
    Issued(TicketAmount),
    /// The duel's refund was already issued earlier; nothing moved.
    AlreadyIssued,
}

/// Where every ticket on the platform currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConservationReport {
    /// Sum of all account balances.
    pub circulating: TicketAmount,
    /// Stakes held by non-terminal duels.
    pub duel_escrow: TicketAmount,
    /// Prize pools of non-terminal tournaments.
    pub tournament_pools: TicketAmount,
    /// Tickets debited for withdrawals still pending.
    pub pending_withdrawals: TicketAmount,
}

impl ConservationReport {
    /// Every ticket accounted for, across all four buckets.
    pub fn accounted(&self) -> Option<TicketAmount> {
        self.circulating
            .checked_add(self.duel_escrow)?
            .checked_add(self.tournament_pools)?
            .checked_add(self.pending_withdrawals)
    }
}

/// The single gateway for ticket movements.
///
/// Balances are stored per account; the ledger never caches them. Each
/// movement is one atomic check-and-write against the account store, so a
/// debit can never interleave with another movement on the same account.
#[derive(Clone)]
pub struct Ledger {
    accounts: Arc<dyn AccountStore>,
}

impl Ledger {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub fn balance(&self, account: &AccountId) -> Result<TicketAmount, LedgerError> {
        Ok(self.accounts.get_account(account)?.tickets)
    }

    /// Remove `amount` tickets from `account`, failing without any effect if
    /// the balance is short. Returns the balance after the debit.
    pub fn debit(
        &self,
        account: &AccountId,
        amount: TicketAmount,
    ) -> Result<TicketAmount, LedgerError> {
        let mut shortfall = None;
        let committed = self.accounts.update_account(account, &mut |rec| {
            match rec.tickets.checked_sub(amount) {
                Some(remaining) => {
                    rec.tickets = remaining;
                    true
                }
                None => {
                    shortfall = Some(rec.tickets);
                    false
                }
            }
        })?;
        if let Some(available) = shortfall {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        debug!(%account, %amount, balance = %committed.tickets, "debit");
        Ok(committed.tickets)
    }

    /// Add `amount` tickets to `account`. Returns the balance after the
    /// credit.
    pub fn credit(
        &self,
        account: &AccountId,
        amount: TicketAmount,
    ) -> Result<TicketAmount, LedgerError> {
        let mut overflowed = false;
        let committed = self.accounts.update_account(account, &mut |rec| {
            match rec.tickets.checked_add(amount) {
                Some(total) => {
                    rec.tickets = total;
                    true
                }
                None => {
                    overflowed = true;
                    false
                }
            }
        })?;
        if overflowed {
            return Err(LedgerError::Overflow);
        }
        debug!(%account, %amount, balance = %committed.tickets, "credit");
        Ok(committed.tickets)
    }

    /// Pay the full pot of a duel (both stakes) to `winner`.
    ///
    /// Returns the pot amount. The caller is responsible for having
    /// established that `winner` is a participant and that the duel has not
    /// already been settled.
    pub fn transfer_pot(
        &self,
        duel: &DuelRecord,
        winner: &AccountId,
    ) -> Result<TicketAmount, LedgerError> {
        let pot = duel.stake.doubled().ok_or(LedgerError::Overflow)?;
        self.credit(winner, pot)?;
        info!(duel = %duel.id, %winner, %pot, "pot transferred");
        Ok(pot)
    }

    /// Return every escrowed stake of `duel` to its owner.
    ///
    /// Idempotent: the duel's `refund_issued` flag is checked and set here,
    /// so a second call (expiry sweep racing an admin cancel, a replayed
    /// sweep tick) moves nothing. The caller persists the mutated record.
    pub fn refund_all(&self, duel: &mut DuelRecord) -> Result<RefundOutcome, LedgerError> {
        if duel.refund_issued {
            return Ok(RefundOutcome::AlreadyIssued);
        }
        let mut total = duel.stake;
        self.credit(&duel.creator, duel.stake)?;
        if let Some(opponent) = duel.opponent {
            self.credit(&opponent, duel.stake)?;
            total = total.checked_add(duel.stake).ok_or(LedgerError::Overflow)?;
        }
        duel.refund_issued = true;
        info!(duel = %duel.id, %total, "stakes refunded");
        Ok(RefundOutcome::Issued(total))
    }

    /// Tally where every ticket currently sits.
    pub fn audit(
        &self,
        duels: &dyn DuelStore,
        tournaments: &dyn TournamentStore,
        withdrawals: &dyn WithdrawalStore,
    ) -> Result<ConservationReport, LedgerError> {
        let mut circulating = TicketAmount::ZERO;
        for acct in self.accounts.iter_accounts()? {
            circulating = circulating
                .checked_add(acct.tickets)
                .ok_or(LedgerError::Overflow)?;
        }

        let mut duel_escrow = TicketAmount::ZERO;
        for duel in duels.iter_duels()? {
            duel_escrow = duel_escrow
                .checked_add(duel.escrowed())
                .ok_or(LedgerError::Overflow)?;
        }

        let mut tournament_pools = TicketAmount::ZERO;
        for tournament in tournaments.iter_tournaments()? {
            tournament_pools = tournament_pools
                .checked_add(tournament.escrowed())
                .ok_or(LedgerError::Overflow)?;
        }

        let mut pending_withdrawals = TicketAmount::ZERO;
        for wd in withdrawals.iter_withdrawals()? {
            if wd.state == WithdrawalState::Pending {
                pending_withdrawals = pending_withdrawals
                    .checked_add(wd.amount_tickets)
                    .ok_or(LedgerError::Overflow)?;
            }
        }

        Ok(ConservationReport {
            circulating,
            duel_escrow,
            tournament_pools,
            pending_withdrawals,
        })
    }

    /// Verify that a report accounts for exactly `expected` tickets.
    ///
    /// A mismatch is a bug somewhere in the movement paths; it is logged at
    /// error level before being returned.
    pub fn check_conservation(
        &self,
        expected: TicketAmount,
        report: &ConservationReport,
    ) -> Result<(), LedgerError> {
        let accounted = report.accounted().ok_or(LedgerError::Overflow)?;
        if accounted != expected {
            error!(
                %expected,
                %accounted,
                circulating = %report.circulating,
                duel_escrow = %report.duel_escrow,
                tournament_pools = %report.tournament_pools,
                pending_withdrawals = %report.pending_withdrawals,
                "ticket conservation violated"
            );
            return Err(LedgerError::ConservationViolation {
                expected,
                accounted,
            });
        }
        Ok(())
    }
}
