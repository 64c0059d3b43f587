//! The duel state machine and its auto-resolution sweep.
//!
//! All transitions for one duel serialize on a per-duel lock held for the
//! whole read-check-write sequence. Guards run after the lock is acquired,
//! never before, so a caller that loses a race sees the winner's committed
//! state instead of a stale snapshot.

use crate::error::DuelError;
use crate::rank::RankTable;
use arena_ledger::Ledger;
use arena_store::{AccountStore, AdminOverride, DuelRecord, DuelStore};
use arena_types::{
    AccountId, ArenaParams, Declaration, DuelId, DuelState, GameKind, TicketAmount, Timestamp,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Outcome of one auto-resolution sweep pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Non-terminal duels examined.
    pub scanned: u64,
    /// Duels moved to Expired this pass.
    pub expired: u64,
    /// Total tickets returned by expiry refunds this pass.
    pub refunded: TicketAmount,
    /// Disputed duels older than the alert threshold.
    pub disputes_flagged: u64,
    /// Duels whose transition failed; the sweep continued past them.
    pub failures: u64,
}

/// Aggregate platform counters for the admin surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaStats {
    pub accounts: u64,
    pub duels_total: u64,
    pub duels_open: u64,
    pub duels_active: u64,
    pub duels_disputed: u64,
    pub duels_completed: u64,
    pub duels_expired: u64,
    pub duels_cancelled: u64,
    /// Sum of all account balances.
    pub tickets_circulating: TicketAmount,
    /// Tickets held in duel escrow.
    pub tickets_escrowed: TicketAmount,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub account: AccountId,
    pub display_name: String,
    pub victories: u64,
    pub defeats: u64,
    pub rank: String,
}

pub struct DuelEngine {
    accounts: Arc<dyn AccountStore>,
    duels: Arc<dyn DuelStore>,
    ledger: Ledger,
    ranks: RankTable,
    params: ArenaParams,
    /// One lock per duel, created lazily. The map lock is only held long
    /// enough to fetch or insert the entry.
    locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl DuelEngine {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        duels: Arc<dyn DuelStore>,
        ledger: Ledger,
        params: ArenaParams,
    ) -> Self {
        let ranks = RankTable::new(&params);
        Self {
            accounts,
            duels,
            ledger,
            ranks,
            params,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, id: &DuelId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(id.raw()).or_default().clone()
    }

    pub fn get(&self, id: &DuelId) -> Result<DuelRecord, DuelError> {
        Ok(self.duels.get_duel(id)?)
    }

    /// Duels currently open for joining.
    pub fn open_duels(&self) -> Result<Vec<DuelRecord>, DuelError> {
        let mut open: Vec<_> = self
            .duels
            .iter_duels()?
            .into_iter()
            .filter(|d| d.state == DuelState::Open)
            .collect();
        open.sort_by_key(|d| d.created_at);
        Ok(open)
    }

    /// Open a duel, escrowing the creator's stake.
    pub fn create_duel(
        &self,
        creator: &AccountId,
        game: GameKind,
        stake: TicketAmount,
        now: Timestamp,
    ) -> Result<DuelRecord, DuelError> {
        if stake.is_zero() {
            return Err(DuelError::ZeroStake);
        }
        let acct = self.accounts.get_account(creator)?;
        if !acct.can_play() {
            return Err(DuelError::NotEligible(*creator));
        }
        self.ledger.debit(creator, stake)?;

        let stored = self.duels.allocate_duel_id().and_then(|id| {
            let duel = DuelRecord::new(
                id,
                *creator,
                game,
                stake,
                self.params.duel_duration_secs,
                now,
            );
            self.duels.put_duel(&duel).map(|()| duel)
        });
        let duel = match stored {
            Ok(duel) => duel,
            Err(err) => {
                // The record never landed; the stake must not stay escrowed.
                self.ledger.credit(creator, stake)?;
                return Err(err.into());
            }
        };
        info!(duel = %duel.id, %creator, %stake, game = %game, "duel created");
        Ok(duel)
    }

    /// Join an open duel as the opponent. Escrows the matching stake and
    /// starts the play window.
    pub fn join_duel(
        &self,
        id: &DuelId,
        joiner: &AccountId,
        now: Timestamp,
    ) -> Result<DuelRecord, DuelError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        let mut duel = self.duels.get_duel(id)?;
        if duel.state != DuelState::Open {
            return Err(DuelError::InvalidState {
                duel: *id,
                state: duel.state,
                event: "join",
            });
        }
        if duel.opponent.is_some() {
            return Err(DuelError::AlreadyJoined(*id));
        }
        if *joiner == duel.creator {
            return Err(DuelError::SelfJoin);
        }
        let acct = self.accounts.get_account(joiner)?;
        if !acct.can_play() {
            return Err(DuelError::NotEligible(*joiner));
        }
        self.ledger.debit(joiner, duel.stake)?;

        duel.opponent = Some(*joiner);
        duel.state = DuelState::Active;
        duel.started_at = Some(now);
        duel.expires_at = Some(now.plus_secs(duel.duration_secs));
        if let Err(err) = self.duels.put_duel(&duel) {
            self.ledger.credit(joiner, duel.stake)?;
            return Err(err.into());
        }
        info!(duel = %id, %joiner, "duel joined, play window open");
        Ok(duel)
    }

    /// Cancel an open duel. Creator only, and only before anyone joins.
    /// The escrowed stake is refunded.
    pub fn cancel_duel(
        &self,
        id: &DuelId,
        caller: &AccountId,
        now: Timestamp,
    ) -> Result<DuelRecord, DuelError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        let mut duel = self.duels.get_duel(id)?;
        if *caller != duel.creator {
            return Err(DuelError::NotAuthorized(*caller));
        }
        if duel.state != DuelState::Open {
            return Err(DuelError::InvalidState {
                duel: *id,
                state: duel.state,
                event: "cancel",
            });
        }
        self.ledger.refund_all(&mut duel)?;
        duel.state = DuelState::Cancelled;
        duel.completed_at = Some(now);
        self.duels.put_duel(&duel)?;
        info!(duel = %id, "duel cancelled by creator");
        Ok(duel)
    }

    /// Change the stake of an open duel. Creator only. The escrow is
    /// adjusted by the difference.
    pub fn modify_stake(
        &self,
        id: &DuelId,
        caller: &AccountId,
        new_stake: TicketAmount,
        _now: Timestamp,
    ) -> Result<DuelRecord, DuelError> {
        if new_stake.is_zero() {
            return Err(DuelError::ZeroStake);
        }
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        let mut duel = self.duels.get_duel(id)?;
        if *caller != duel.creator {
            return Err(DuelError::NotAuthorized(*caller));
        }
        if duel.state != DuelState::Open {
            return Err(DuelError::InvalidState {
                duel: *id,
                state: duel.state,
                event: "modify stake",
            });
        }
        if let Some(increase) = new_stake.checked_sub(duel.stake) {
            if !increase.is_zero() {
                self.ledger.debit(caller, increase)?;
            }
            duel.stake = new_stake;
            if let Err(err) = self.duels.put_duel(&duel) {
                self.ledger.credit(caller, increase)?;
                return Err(err.into());
            }
        } else {
            let decrease = duel.stake.saturating_sub(new_stake);
            self.ledger.credit(caller, decrease)?;
            duel.stake = new_stake;
            if let Err(err) = self.duels.put_duel(&duel) {
                self.ledger.debit(caller, decrease)?;
                return Err(err.into());
            }
        }
        info!(duel = %id, stake = %new_stake, "stake modified");
        Ok(duel)
    }

    /// Record a participant's declaration and resolve the duel if the pair
    /// of declarations now determines an outcome.
    ///
    /// Declarations overwrite: a participant may change theirs until the
    /// duel resolves. If the play window has already closed, the expiry
    /// transition is applied first and the declaration is refused.
    pub fn declare(
        &self,
        id: &DuelId,
        caller: &AccountId,
        declaration: Declaration,
        now: Timestamp,
    ) -> Result<DuelRecord, DuelError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        let mut duel = self.duels.get_duel(id)?;
        let side = duel
            .side_of(caller)
            .ok_or(DuelError::NotParticipant(*caller))?;
        if duel.state.is_terminal() {
            return Err(DuelError::AlreadyResolved(*id));
        }
        if duel.state != DuelState::Active {
            return Err(DuelError::InvalidState {
                duel: *id,
                state: duel.state,
                event: "declare",
            });
        }
        if duel.is_expired(now) {
            self.expire_locked(&mut duel, now)?;
            self.duels.put_duel(&duel)?;
            return Err(DuelError::Expired(*id));
        }

        duel.set_declaration(side, declaration);
        self.try_auto_resolve(&mut duel, now)?;
        self.duels.put_duel(&duel)?;
        Ok(duel)
    }

    /// Apply the declaration table to an Active duel.
    ///
    /// A forfeit from either side resolves immediately in the other side's
    /// favor, before the consistency rule is consulted. With both sides
    /// declared, victory/defeat must agree on a single winner; two victory
    /// claims (or two defeat claims) park the duel in Disputed for an
    /// admin.
    fn try_auto_resolve(&self, duel: &mut DuelRecord, now: Timestamp) -> Result<(), DuelError> {
        let creator = duel.creator;
        let opponent = duel.opponent;

        if duel.creator_declaration == Some(Declaration::Forfeit) {
            if let Some(opp) = opponent {
                return self.settle_locked(duel, opp, now);
            }
        }
        if duel.opponent_declaration == Some(Declaration::Forfeit) {
            return self.settle_locked(duel, creator, now);
        }

        match (duel.creator_declaration, duel.opponent_declaration) {
            (Some(Declaration::Victory), Some(Declaration::Defeat)) => {
                self.settle_locked(duel, creator, now)
            }
            (Some(Declaration::Defeat), Some(Declaration::Victory)) => {
                let opp = opponent.expect("active duel has an opponent");
                self.settle_locked(duel, opp, now)
            }
            (Some(_), Some(_)) => {
                duel.state = DuelState::Disputed;
                duel.disputed_at = Some(now);
                warn!(duel = %duel.id, "contradictory declarations, duel disputed");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Settle the duel in `winner`'s favor: pay the pot, fix the winner,
    /// bump the win/loss counters, and recompute the winner's rank.
    fn settle_locked(
        &self,
        duel: &mut DuelRecord,
        winner: AccountId,
        now: Timestamp,
    ) -> Result<(), DuelError> {
        if duel.winner.is_some() {
            return Err(DuelError::AlreadyResolved(duel.id));
        }
        let side = duel
            .side_of(&winner)
            .ok_or(DuelError::NotParticipant(winner))?;
        let loser = duel.account_on(side.other());

        self.ledger.transfer_pot(duel, &winner)?;
        duel.state = DuelState::Completed;
        duel.winner = Some(winner);
        duel.completed_at = Some(now);

        self.accounts.update_account(&winner, &mut |rec| {
            rec.victories += 1;
            rec.rank = self.ranks.rank_for(rec.victories).to_string();
            true
        })?;
        if let Some(loser) = loser {
            self.accounts.update_account(&loser, &mut |rec| {
                rec.defeats += 1;
                true
            })?;
        }
        info!(duel = %duel.id, %winner, "duel settled");
        Ok(())
    }

    /// Move a duel whose window has closed to Expired and refund stakes.
    /// Assumes the caller holds the duel's lock.
    fn expire_locked(&self, duel: &mut DuelRecord, now: Timestamp) -> Result<(), DuelError> {
        self.ledger.refund_all(&mut *duel)?;
        duel.state = DuelState::Expired;
        duel.completed_at = Some(now);
        info!(duel = %duel.id, "duel expired, stakes refunded");
        Ok(())
    }

    /// One auto-resolution pass over every non-terminal duel.
    ///
    /// Expires duels whose play window has closed, refunding stakes. Open
    /// duels have no window yet and are left for their creator to cancel.
    /// Disputed duels older than the alert threshold are flagged for human
    /// attention, not touched. A failure on one duel is logged and counted;
    /// the sweep moves on.
    pub fn sweep(&self, now: Timestamp) -> Result<SweepReport, DuelError> {
        let mut report = SweepReport::default();
        for candidate in self.duels.iter_duels()? {
            if candidate.state.is_terminal() {
                continue;
            }
            report.scanned += 1;
            match self.sweep_one(&candidate.id, now) {
                Ok(SweepAction::Expired(refunded)) => {
                    report.expired += 1;
                    report.refunded = report
                        .refunded
                        .checked_add(refunded)
                        .unwrap_or(report.refunded);
                }
                Ok(SweepAction::DisputeFlagged) => report.disputes_flagged += 1,
                Ok(SweepAction::None) => {}
                Err(err) => {
                    report.failures += 1;
                    warn!(duel = %candidate.id, error = %err, "sweep transition failed");
                }
            }
        }
        if report.expired > 0 || report.disputes_flagged > 0 || report.failures > 0 {
            info!(
                scanned = report.scanned,
                expired = report.expired,
                refunded = %report.refunded,
                disputes = report.disputes_flagged,
                failures = report.failures,
                "sweep pass complete"
            );
        }
        Ok(report)
    }

    fn sweep_one(&self, id: &DuelId, now: Timestamp) -> Result<SweepAction, DuelError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        // Re-read under the lock; the duel may have resolved since the scan.
        let mut duel = self.duels.get_duel(id)?;
        match duel.state {
            DuelState::Active | DuelState::Waiting if duel.is_expired(now) => {
                let before = duel.escrowed();
                self.expire_locked(&mut duel, now)?;
                self.duels.put_duel(&duel)?;
                Ok(SweepAction::Expired(before))
            }
            DuelState::Disputed => {
                let stale = duel
                    .disputed_at
                    .map(|t| now > t.plus_secs(self.params.dispute_alert_age_secs))
                    .unwrap_or(false);
                if stale {
                    warn!(duel = %id, "dispute awaiting admin past alert threshold");
                    Ok(SweepAction::DisputeFlagged)
                } else {
                    Ok(SweepAction::None)
                }
            }
            _ => Ok(SweepAction::None),
        }
    }

    /// Admin settlement of a disputed duel in `winner`'s favor.
    pub fn admin_resolve(
        &self,
        id: &DuelId,
        admin: &AccountId,
        winner: &AccountId,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<DuelRecord, DuelError> {
        self.require_admin(admin)?;
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        let mut duel = self.duels.get_duel(id)?;
        if duel.state.is_terminal() {
            return Err(DuelError::AlreadyResolved(*id));
        }
        if duel.state != DuelState::Disputed {
            return Err(DuelError::NotDisputed(*id));
        }
        if duel.side_of(winner).is_none() {
            return Err(DuelError::NotParticipant(*winner));
        }
        self.settle_locked(&mut duel, *winner, now)?;
        duel.admin_override = Some(AdminOverride {
            resolved_by: *admin,
            reason: reason.into(),
            resolved_at: now,
        });
        self.duels.put_duel(&duel)?;
        info!(duel = %id, %admin, %winner, "dispute resolved by admin");
        Ok(duel)
    }

    /// Admin cancellation of any non-terminal duel, refunding all stakes.
    pub fn admin_cancel(
        &self,
        id: &DuelId,
        admin: &AccountId,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<DuelRecord, DuelError> {
        self.require_admin(admin)?;
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        let mut duel = self.duels.get_duel(id)?;
        if duel.state.is_terminal() {
            return Err(DuelError::AlreadyResolved(*id));
        }
        self.ledger.refund_all(&mut duel)?;
        duel.state = DuelState::Cancelled;
        duel.completed_at = Some(now);
        duel.admin_override = Some(AdminOverride {
            resolved_by: *admin,
            reason: reason.into(),
            resolved_at: now,
        });
        self.duels.put_duel(&duel)?;
        info!(duel = %id, %admin, "duel cancelled by admin");
        Ok(duel)
    }

    fn require_admin(&self, admin: &AccountId) -> Result<(), DuelError> {
        let acct = self.accounts.get_account(admin)?;
        if !acct.is_admin() {
            return Err(DuelError::NotAuthorized(*admin));
        }
        Ok(())
    }

    /// Platform counters for the admin dashboard.
    pub fn stats(&self) -> Result<ArenaStats, DuelError> {
        let mut stats = ArenaStats {
            accounts: self.accounts.account_count()?,
            duels_total: 0,
            duels_open: 0,
            duels_active: 0,
            duels_disputed: 0,
            duels_completed: 0,
            duels_expired: 0,
            duels_cancelled: 0,
            tickets_circulating: TicketAmount::ZERO,
            tickets_escrowed: TicketAmount::ZERO,
        };
        for acct in self.accounts.iter_accounts()? {
            stats.tickets_circulating = stats
                .tickets_circulating
                .checked_add(acct.tickets)
                .unwrap_or(stats.tickets_circulating);
        }
        for duel in self.duels.iter_duels()? {
            stats.duels_total += 1;
            match duel.state {
                DuelState::Open => stats.duels_open += 1,
                DuelState::Waiting | DuelState::Active => stats.duels_active += 1,
                DuelState::Disputed => stats.duels_disputed += 1,
                DuelState::Completed => stats.duels_completed += 1,
                DuelState::Expired => stats.duels_expired += 1,
                DuelState::Cancelled => stats.duels_cancelled += 1,
            }
            stats.tickets_escrowed = stats
                .tickets_escrowed
                .checked_add(duel.escrowed())
                .unwrap_or(stats.tickets_escrowed);
        }
        Ok(stats)
    }

    /// Accounts ordered by victories, best first, capped at `limit`.
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, DuelError> {
        let mut entries: Vec<LeaderboardEntry> = self
            .accounts
            .iter_accounts()?
            .into_iter()
            .map(|a| LeaderboardEntry {
                account: a.id,
                display_name: a.display_name,
                victories: a.victories,
                defeats: a.defeats,
                rank: a.rank,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.victories
                .cmp(&a.victories)
                .then_with(|| a.defeats.cmp(&b.defeats))
                .then_with(|| a.account.cmp(&b.account))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}

enum SweepAction {
    Expired(TicketAmount),
    DisputeFlagged,
    None,
}
