//! Bracket lifecycle: registration, draw, round advancement, payout.

use crate::error::TournamentError;
use arena_ledger::Ledger;
use arena_store::{AccountStore, BracketMatch, TournamentRecord, TournamentStore};
use arena_types::{AccountId, GameKind, TicketAmount, Timestamp, TournamentId, TournamentState};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub struct TournamentEngine {
    accounts: Arc<dyn AccountStore>,
    tournaments: Arc<dyn TournamentStore>,
    ledger: Ledger,
    locks: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl TournamentEngine {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tournaments: Arc<dyn TournamentStore>,
        ledger: Ledger,
    ) -> Self {
        Self {
            accounts,
            tournaments,
            ledger,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, id: &TournamentId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(id.raw()).or_default().clone()
    }

    fn require_admin(&self, admin: &AccountId) -> Result<(), TournamentError> {
        let acct = self.accounts.get_account(admin)?;
        if !acct.is_admin() {
            return Err(TournamentError::NotAuthorized(*admin));
        }
        Ok(())
    }

    pub fn get(&self, id: &TournamentId) -> Result<TournamentRecord, TournamentError> {
        Ok(self.tournaments.get_tournament(id)?)
    }

    /// Open a tournament for registration. Admin only.
    pub fn create(
        &self,
        admin: &AccountId,
        name: impl Into<String>,
        game: GameKind,
        entry_fee: TicketAmount,
        max_participants: u32,
        now: Timestamp,
    ) -> Result<TournamentRecord, TournamentError> {
        self.require_admin(admin)?;
        if max_participants < 2 {
            return Err(TournamentError::CapacityTooSmall(max_participants));
        }
        let id = self.tournaments.allocate_tournament_id()?;
        let record = TournamentRecord::new(id, name, game, entry_fee, max_participants, now);
        self.tournaments.put_tournament(&record)?;
        info!(tournament = %id, %entry_fee, max_participants, "tournament created");
        Ok(record)
    }

    /// Register an account, moving its entry fee into the prize pool.
    /// Reaching capacity draws the bracket immediately.
    pub fn register(
        &self,
        id: &TournamentId,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<TournamentRecord, TournamentError> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        let mut record = self.tournaments.get_tournament(id)?;
        if record.state != TournamentState::Open {
            return Err(TournamentError::InvalidState {
                tournament: *id,
                state: record.state,
                event: "register",
            });
        }
        if record.is_registered(account) {
            return Err(TournamentError::AlreadyRegistered(*account));
        }
        if record.is_full() {
            return Err(TournamentError::Full(*id));
        }
        let acct = self.accounts.get_account(account)?;
        if !acct.can_play() {
            return Err(TournamentError::NotEligible(*account));
        }
        if !record.entry_fee.is_zero() {
            self.ledger.debit(account, record.entry_fee)?;
            record.prize_pool = record
                .prize_pool
                .checked_add(record.entry_fee)
                .ok_or(TournamentError::Ledger(
                    arena_ledger::LedgerError::Overflow,
                ))?;
        }
        record.participants.push(*account);
        info!(tournament = %id, %account, "entrant registered");

        if record.is_full() {
            self.draw_bracket(&mut record, now);
        }
        self.tournaments.put_tournament(&record)?;
        Ok(record)
    }

    /// Start a tournament before it fills. Admin only; needs at least two
    /// entrants.
    pub fn start(
        &self,
        id: &TournamentId,
        admin: &AccountId,
        now: Timestamp,
    ) -> Result<TournamentRecord, TournamentError> {
        self.require_admin(admin)?;
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        let mut record = self.tournaments.get_tournament(id)?;
        if record.state != TournamentState::Open {
            return Err(TournamentError::InvalidState {
                tournament: *id,
                state: record.state,
                event: "start",
            });
        }
        if record.participants.len() < 2 {
            return Err(TournamentError::NotEnoughParticipants(
                record.participants.len(),
            ));
        }
        self.draw_bracket(&mut record, now);
        self.tournaments.put_tournament(&record)?;
        Ok(record)
    }

    /// Shuffle entrants and build round 1. With an odd count the last seed
    /// gets a bye whose winner is fixed here.
    fn draw_bracket(&self, record: &mut TournamentRecord, _now: Timestamp) {
        let mut seeds = record.participants.clone();
        seeds.shuffle(&mut rand::rng());
        record.matches = Self::pair_round(1, &seeds);
        record.state = TournamentState::Ongoing;
        info!(
            tournament = %record.id,
            entrants = seeds.len(),
            matches = record.matches.len(),
            "bracket drawn"
        );
    }

    fn pair_round(round: u32, seeds: &[AccountId]) -> Vec<BracketMatch> {
        let mut matches = Vec::new();
        let mut number = 1;
        let mut chunks = seeds.chunks_exact(2);
        for pair in &mut chunks {
            matches.push(BracketMatch {
                round,
                number,
                player1: pair[0],
                player2: Some(pair[1]),
                winner: None,
                played_at: None,
            });
            number += 1;
        }
        if let [odd_one] = chunks.remainder() {
            matches.push(BracketMatch {
                round,
                number,
                player1: *odd_one,
                player2: None,
                winner: Some(*odd_one),
                played_at: None,
            });
        }
        matches
    }

    /// Record the winner of one match. Admin only. Completing the last
    /// match of a round draws the next one; the final winner takes the
    /// whole prize pool.
    pub fn report_result(
        &self,
        id: &TournamentId,
        admin: &AccountId,
        round: u32,
        number: u32,
        winner: &AccountId,
        now: Timestamp,
    ) -> Result<TournamentRecord, TournamentError> {
        self.require_admin(admin)?;
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        let mut record = self.tournaments.get_tournament(id)?;
        if record.state != TournamentState::Ongoing {
            return Err(TournamentError::InvalidState {
                tournament: *id,
                state: record.state,
                event: "report result",
            });
        }
        let m = record
            .matches
            .iter_mut()
            .find(|m| m.round == round && m.number == number)
            .ok_or(TournamentError::MatchNotFound { round, number })?;
        if m.winner.is_some() {
            // Covers both replayed reports and byes, which are decided at
            // draw time.
            return Err(TournamentError::AlreadyPlayed);
        }
        if !m.involves(winner) {
            return Err(TournamentError::NotInMatch(*winner));
        }
        m.winner = Some(*winner);
        m.played_at = Some(now);
        info!(tournament = %id, round, number, %winner, "match result recorded");

        self.advance_if_round_complete(&mut record, round)?;
        self.tournaments.put_tournament(&record)?;
        Ok(record)
    }

    fn advance_if_round_complete(
        &self,
        record: &mut TournamentRecord,
        round: u32,
    ) -> Result<(), TournamentError> {
        let mut winners: Vec<(u32, AccountId)> = Vec::new();
        for m in record.round_matches(round) {
            match m.winner {
                Some(w) => winners.push((m.number, w)),
                None => return Ok(()),
            }
        }
        winners.sort_by_key(|(number, _)| *number);
        let mut winners: Vec<AccountId> = winners.into_iter().map(|(_, w)| w).collect();

        if let [champion] = winners.as_slice() {
            let champion = *champion;
            let pool = record.prize_pool;
            record.state = TournamentState::Completed;
            record.winner = Some(champion);
            if !pool.is_zero() {
                self.ledger.credit(&champion, pool)?;
            }
            info!(tournament = %record.id, %champion, %pool, "tournament completed");
        } else {
            // Re-draw seeding each round, as at the initial bracket.
            winners.shuffle(&mut rand::rng());
            let next = Self::pair_round(round + 1, &winners);
            record.matches.extend(next);
            info!(tournament = %record.id, round = round + 1, "next round drawn");
        }
        Ok(())
    }

    /// Cancel a live tournament and refund every entry fee. Admin only.
    pub fn cancel(
        &self,
        id: &TournamentId,
        admin: &AccountId,
        _now: Timestamp,
    ) -> Result<TournamentRecord, TournamentError> {
        self.require_admin(admin)?;
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap();

        let mut record = self.tournaments.get_tournament(id)?;
        if record.state.is_terminal() {
            return Err(TournamentError::InvalidState {
                tournament: *id,
                state: record.state,
                event: "cancel",
            });
        }
        if !record.entry_fee.is_zero() {
            for participant in record.participants.clone() {
                if let Err(err) = self.ledger.credit(&participant, record.entry_fee) {
                    warn!(tournament = %id, %participant, error = %err, "refund failed");
                }
            }
        }
        record.prize_pool = TicketAmount::ZERO;
        record.state = TournamentState::Cancelled;
        self.tournaments.put_tournament(&record)?;
        info!(tournament = %id, "tournament cancelled, fees refunded");
        Ok(record)
    }
}
