//! Periodic auto-resolution scheduler.
//!
//! Drives [`DuelEngine::sweep`] on a fixed interval. The scheduler holds no
//! policy of its own: every decision about expiry, refunds, and dispute
//! flagging lives in the engine, so a manual sweep and a scheduled sweep
//! are the same operation.

use crate::metrics::ArenaMetrics;
use arena_duel::DuelEngine;
use arena_types::Timestamp;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub struct SweepScheduler {
    engine: Arc<DuelEngine>,
    /// Absent when the node runs with metrics disabled.
    metrics: Option<Arc<ArenaMetrics>>,
    interval: Duration,
}

impl SweepScheduler {
    pub fn new(
        engine: Arc<DuelEngine>,
        metrics: Option<Arc<ArenaMetrics>>,
        interval_secs: u64,
    ) -> Self {
        Self {
            engine,
            metrics,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// Run a single sweep pass against the current wall clock.
    pub fn run_once(&self) {
        match self.engine.sweep(Timestamp::now()) {
            Ok(report) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_sweep(&report);
                    match self.engine.stats() {
                        Ok(stats) => metrics.update_from_stats(&stats),
                        Err(err) => error!(error = %err, "stats refresh failed"),
                    }
                }
            }
            Err(err) => {
                if let Some(metrics) = &self.metrics {
                    metrics.sweep_failures_total.inc();
                }
                error!(error = %err, "sweep pass failed");
            }
        }
    }

    /// Spawn the sweep loop. Stops when `shutdown` fires.
    pub fn spawn(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            info!(interval_secs = self.interval.as_secs(), "sweep scheduler started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.run_once(),
                    _ = shutdown.recv() => {
                        info!("sweep scheduler stopped");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_ledger::Ledger;
    use arena_store::{AccountRecord, AccountStore, MemoryStore};
    use arena_types::{AccountId, ArenaParams, GameKind, TicketAmount, VerificationState};

    fn engine_with_expired_duel() -> (Arc<DuelEngine>, arena_types::DuelId) {
        let store = Arc::new(MemoryStore::new());
        for id in [1u64, 2] {
            let mut acct = AccountRecord::new(
                AccountId::new(id),
                format!("player{id}"),
                TicketAmount::new(100),
                Timestamp::new(0),
            );
            acct.verification = VerificationState::Verified;
            store.put_account(&acct).unwrap();
        }
        let ledger = Ledger::new(store.clone());
        let engine = Arc::new(DuelEngine::new(
            store.clone(),
            store,
            ledger,
            ArenaParams::arena_defaults(),
        ));
        // Joined far enough in the past that the window has closed by now.
        let duel = engine
            .create_duel(
                &AccountId::new(1),
                GameKind::BoxFight,
                TicketAmount::new(10),
                Timestamp::new(0),
            )
            .unwrap();
        engine
            .join_duel(&duel.id, &AccountId::new(2), Timestamp::new(0))
            .unwrap();
        (engine, duel.id)
    }

    #[tokio::test]
    async fn run_once_sweeps_and_records_metrics() {
        let (engine, _) = engine_with_expired_duel();
        let metrics = Arc::new(ArenaMetrics::new());
        let scheduler = SweepScheduler::new(engine, Some(metrics.clone()), 60);

        scheduler.run_once();
        assert_eq!(metrics.sweeps_total.get(), 1);
        assert_eq!(metrics.duels_expired_total.get(), 1);
        assert_eq!(metrics.tickets_refunded_total.get(), 20);
        assert_eq!(metrics.tickets_circulating.get(), 200);
    }

    #[tokio::test]
    async fn run_once_without_metrics_still_sweeps() {
        let (engine, duel_id) = engine_with_expired_duel();
        let scheduler = SweepScheduler::new(engine.clone(), None, 60);

        scheduler.run_once();
        let record = engine.get(&duel_id).unwrap();
        assert_eq!(record.state, arena_types::DuelState::Expired);
    }

    #[tokio::test]
    async fn spawned_loop_stops_on_shutdown() {
        let (engine, _) = engine_with_expired_duel();
        let metrics = Arc::new(ArenaMetrics::new());
        let scheduler = Arc::new(SweepScheduler::new(engine, Some(metrics), 1));

        let (tx, rx) = broadcast::channel(1);
        let handle = scheduler.spawn(rx);
        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
