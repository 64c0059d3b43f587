//! The arena node — wires stores, ledger, and engines together.

use crate::config::ArenaConfig;
use crate::error::NodeError;
use crate::metrics::ArenaMetrics;
use crate::scheduler::SweepScheduler;
use crate::shutdown::ShutdownController;
use arena_duel::{DuelEngine, LeaderboardEntry, RankTable};
use arena_ledger::{ConservationReport, Ledger, WithdrawalEngine};
use arena_store::{
    AccountRecord, AccountStore, MemoryStore, StoreError, WithdrawalRecord, WithdrawalStore,
};
use arena_tournament::TournamentEngine;
use arena_types::{
    AccountId, TicketAmount, Timestamp, VerificationState, WithdrawalId, WithdrawalState,
};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::info;

/// A running arena backend.
///
/// Owns the storage backend, the ledger, and the three engines, plus the
/// background sweep scheduler. Account identity comes from the external
/// auth collaborator; the node only manages the platform-side record.
pub struct ArenaNode {
    pub config: ArenaConfig,
    store: Arc<MemoryStore>,
    pub ledger: Ledger,
    pub duels: Arc<DuelEngine>,
    pub tournaments: Arc<TournamentEngine>,
    pub withdrawals: Arc<WithdrawalEngine>,
    /// Present unless the config disables metrics.
    pub metrics: Option<Arc<ArenaMetrics>>,
    pub shutdown: ShutdownController,
    ranks: RankTable,
    /// Tickets that should exist platform-wide: grown by registration
    /// grants, shrunk by settled withdrawals. Audited against the stores.
    expected_supply: Mutex<TicketAmount>,
    scheduler_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ArenaNode {
    pub fn new(config: ArenaConfig) -> Result<Self, NodeError> {
        let store = if config.snapshot_path.exists() {
            info!(path = %config.snapshot_path.display(), "loading store snapshot");
            Arc::new(MemoryStore::load_from_path(&config.snapshot_path)?)
        } else {
            Arc::new(MemoryStore::new())
        };

        let ledger = Ledger::new(store.clone());
        let duels = Arc::new(DuelEngine::new(
            store.clone(),
            store.clone(),
            ledger.clone(),
            config.params.clone(),
        ));
        let tournaments = Arc::new(TournamentEngine::new(
            store.clone(),
            store.clone(),
            ledger.clone(),
        ));
        let withdrawals = Arc::new(WithdrawalEngine::new(
            store.clone(),
            store.clone(),
            ledger.clone(),
            config.params.clone(),
        ));
        let ranks = RankTable::new(&config.params);

        // Whatever the stores account for right now is the supply we hold
        // the platform to from here on.
        let report = ledger.audit(store.as_ref(), store.as_ref(), store.as_ref())?;
        let expected_supply = report
            .accounted()
            .ok_or(arena_ledger::LedgerError::Overflow)?;

        let metrics = config.enable_metrics.then(|| Arc::new(ArenaMetrics::new()));

        Ok(Self {
            config,
            store,
            ledger,
            duels,
            tournaments,
            withdrawals,
            metrics,
            shutdown: ShutdownController::new(),
            ranks,
            expected_supply: Mutex::new(expected_supply),
            scheduler_handle: Mutex::new(None),
        })
    }

    /// Create the platform-side record for an authenticated account,
    /// granting the starting ticket balance.
    pub fn register_account(
        &self,
        id: AccountId,
        display_name: impl Into<String>,
        now: Timestamp,
    ) -> Result<AccountRecord, NodeError> {
        if self.store.exists(&id)? {
            return Err(StoreError::Duplicate(id.to_string()).into());
        }
        let mut record =
            AccountRecord::new(id, display_name, self.config.params.starting_tickets, now);
        record.rank = self.ranks.rank_for(0).to_string();
        self.store.put_account(&record)?;

        let mut expected = self.expected_supply.lock().unwrap();
        *expected = expected
            .checked_add(record.tickets)
            .ok_or(arena_ledger::LedgerError::Overflow)?;
        info!(account = %id, tickets = %record.tickets, "account registered");
        Ok(record)
    }

    /// Record the outcome of an identity review.
    pub fn set_verification(
        &self,
        admin: &AccountId,
        account: &AccountId,
        state: VerificationState,
    ) -> Result<AccountRecord, NodeError> {
        let reviewer = self.store.get_account(admin)?;
        if !reviewer.is_admin() {
            return Err(arena_duel::DuelError::NotAuthorized(*admin).into());
        }
        let updated = self.store.update_account(account, &mut |rec| {
            rec.verification = state;
            true
        })?;
        info!(account = %account, ?state, "verification updated");
        Ok(updated)
    }

    /// Mark that bank details are on file for an account.
    pub fn set_bank_details_present(
        &self,
        account: &AccountId,
        present: bool,
    ) -> Result<AccountRecord, NodeError> {
        Ok(self.store.update_account(account, &mut |rec| {
            rec.bank_details_present = present;
            true
        })?)
    }

    /// Settle a pending withdrawal; the tickets leave the platform supply.
    pub fn settle_withdrawal(
        &self,
        id: &WithdrawalId,
        now: Timestamp,
    ) -> Result<WithdrawalRecord, NodeError> {
        // Settle is idempotent; only the transition out of Pending shrinks
        // the supply.
        let was_pending = self.store.get_withdrawal(id)?.state == WithdrawalState::Pending;
        let settled = self.withdrawals.settle(id, now)?;
        if was_pending {
            let mut expected = self.expected_supply.lock().unwrap();
            *expected = expected.saturating_sub(settled.amount_tickets);
        }
        Ok(settled)
    }

    /// The leaderboard, sized by the node's configured entry count.
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, NodeError> {
        Ok(self.duels.leaderboard(self.config.leaderboard_size)?)
    }

    /// Verify that every ticket the platform should hold is accounted for.
    pub fn audit(&self) -> Result<ConservationReport, NodeError> {
        let report = self
            .ledger
            .audit(self.store.as_ref(), self.store.as_ref(), self.store.as_ref())?;
        let expected = *self.expected_supply.lock().unwrap();
        self.ledger.check_conservation(expected, &report)?;
        Ok(report)
    }

    /// Start the background sweep scheduler.
    pub fn start(&self) {
        let scheduler = Arc::new(SweepScheduler::new(
            self.duels.clone(),
            self.metrics.clone(),
            self.config.params.sweep_interval_secs,
        ));
        let handle = scheduler.spawn(self.shutdown.subscribe());
        *self.scheduler_handle.lock().unwrap() = Some(handle);
        info!("arena node started");
    }

    /// Stop background work and persist the store snapshot.
    pub async fn stop(&self) -> Result<(), NodeError> {
        self.shutdown.shutdown();
        let handle = self.scheduler_handle.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        if let Some(parent) = self.config.snapshot_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.store.save_to_path(&self.config.snapshot_path)?;
        info!(path = %self.config.snapshot_path.display(), "store snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::{Declaration, GameKind, Role};

    fn test_config(dir: &std::path::Path) -> ArenaConfig {
        ArenaConfig {
            snapshot_path: dir.join("arena.snapshot"),
            ..ArenaConfig::default()
        }
    }

    fn verified_player(node: &ArenaNode, id: u64) -> AccountId {
        let account = AccountId::new(id);
        node.register_account(account, format!("player{id}"), Timestamp::new(0))
            .unwrap();
        node.store
            .update_account(&account, &mut |rec| {
                rec.verification = VerificationState::Verified;
                true
            })
            .unwrap();
        account
    }

    #[test]
    fn registration_grants_starting_tickets_and_rank() {
        let dir = tempfile::tempdir().unwrap();
        let node = ArenaNode::new(test_config(dir.path())).unwrap();
        let record = node
            .register_account(AccountId::new(1), "alice", Timestamp::new(0))
            .unwrap();
        assert_eq!(record.tickets, TicketAmount::new(100));
        assert_eq!(record.rank, "Beginner");

        assert!(matches!(
            node.register_account(AccountId::new(1), "alice again", Timestamp::new(1)),
            Err(NodeError::Store(StoreError::Duplicate(_)))
        ));
    }

    #[test]
    fn verification_review_requires_admin() {
        let dir = tempfile::tempdir().unwrap();
        let node = ArenaNode::new(test_config(dir.path())).unwrap();
        let player = verified_player(&node, 1);
        node.register_account(AccountId::new(2), "bob", Timestamp::new(0))
            .unwrap();

        assert!(node
            .set_verification(&player, &AccountId::new(2), VerificationState::Verified)
            .is_err());

        node.store
            .update_account(&player, &mut |rec| {
                rec.role = Role::Admin;
                true
            })
            .unwrap();
        let updated = node
            .set_verification(&player, &AccountId::new(2), VerificationState::Verified)
            .unwrap();
        assert_eq!(updated.verification, VerificationState::Verified);
    }

    #[test]
    fn metrics_follow_the_config_switch() {
        let dir = tempfile::tempdir().unwrap();
        let node = ArenaNode::new(test_config(dir.path())).unwrap();
        assert!(node.metrics.is_some());

        let mut config = test_config(dir.path());
        config.enable_metrics = false;
        let bare = ArenaNode::new(config).unwrap();
        assert!(bare.metrics.is_none());
    }

    #[test]
    fn leaderboard_uses_the_configured_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.leaderboard_size = 1;
        let node = ArenaNode::new(config).unwrap();

        let alice = verified_player(&node, 1);
        verified_player(&node, 2);
        node.store
            .update_account(&alice, &mut |rec| {
                rec.victories = 3;
                true
            })
            .unwrap();

        let board = node.leaderboard().unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].account, alice);
    }

    #[test]
    fn audit_holds_across_a_full_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let node = ArenaNode::new(test_config(dir.path())).unwrap();
        let alice = verified_player(&node, 1);
        let bob = verified_player(&node, 2);
        node.audit().unwrap();

        let duel = node
            .duels
            .create_duel(&alice, GameKind::BoxFight, TicketAmount::new(20), Timestamp::new(10))
            .unwrap();
        node.duels.join_duel(&duel.id, &bob, Timestamp::new(11)).unwrap();
        node.audit().unwrap();

        node.duels
            .declare(&duel.id, &alice, Declaration::Victory, Timestamp::new(20))
            .unwrap();
        node.duels
            .declare(&duel.id, &bob, Declaration::Defeat, Timestamp::new(21))
            .unwrap();
        node.audit().unwrap();

        // Alice withdraws: supply shrinks only at settlement.
        node.set_bank_details_present(&alice, true).unwrap();
        let wd = node
            .withdrawals
            .request(&alice, 5, Timestamp::new(30))
            .unwrap();
        node.audit().unwrap();
        node.settle_withdrawal(&wd.id, Timestamp::new(31)).unwrap();
        node.audit().unwrap();
    }

    #[tokio::test]
    async fn snapshot_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        {
            let node = ArenaNode::new(config.clone()).unwrap();
            verified_player(&node, 1);
            node.stop().await.unwrap();
        }
        let reloaded = ArenaNode::new(config).unwrap();
        let record = reloaded
            .store
            .get_account(&AccountId::new(1))
            .unwrap();
        assert_eq!(record.tickets, TicketAmount::new(100));
        reloaded.audit().unwrap();
    }
}
