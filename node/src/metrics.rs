//! Prometheus metrics for the arena node.
//!
//! The [`ArenaMetrics`] struct owns a dedicated [`Registry`] that an
//! exporter can encode into the Prometheus text exposition format.

use arena_duel::{ArenaStats, SweepReport};
use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter, IntGauge,
    Opts, Registry,
};

/// Central collection of node-level Prometheus metrics.
pub struct ArenaMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Sweep passes executed.
    pub sweeps_total: IntCounter,
    /// Duels moved to Expired by the sweep.
    pub duels_expired_total: IntCounter,
    /// Tickets refunded by expiry sweeps.
    pub tickets_refunded_total: IntCounter,
    /// Sweep transitions that failed.
    pub sweep_failures_total: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Registered accounts.
    pub accounts: IntGauge,
    /// Duels currently in play.
    pub duels_active: IntGauge,
    /// Duels waiting on an admin decision.
    pub duels_disputed: IntGauge,
    /// Tickets across all account balances.
    pub tickets_circulating: IntGauge,
}

impl ArenaMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let sweeps_total = register_int_counter_with_registry!(
            Opts::new("arena_sweeps_total", "Sweep passes executed"),
            registry
        )
        .expect("failed to register sweeps_total counter");

        let duels_expired_total = register_int_counter_with_registry!(
            Opts::new(
                "arena_duels_expired_total",
                "Duels expired by the auto-resolution sweep"
            ),
            registry
        )
        .expect("failed to register duels_expired_total counter");

        let tickets_refunded_total = register_int_counter_with_registry!(
            Opts::new(
                "arena_tickets_refunded_total",
                "Tickets refunded by expiry sweeps"
            ),
            registry
        )
        .expect("failed to register tickets_refunded_total counter");

        let sweep_failures_total = register_int_counter_with_registry!(
            Opts::new("arena_sweep_failures_total", "Failed sweep transitions"),
            registry
        )
        .expect("failed to register sweep_failures_total counter");

        let accounts = register_int_gauge_with_registry!(
            Opts::new("arena_accounts", "Registered accounts"),
            registry
        )
        .expect("failed to register accounts gauge");

        let duels_active = register_int_gauge_with_registry!(
            Opts::new("arena_duels_active", "Duels currently in play"),
            registry
        )
        .expect("failed to register duels_active gauge");

        let duels_disputed = register_int_gauge_with_registry!(
            Opts::new(
                "arena_duels_disputed",
                "Duels waiting on an admin decision"
            ),
            registry
        )
        .expect("failed to register duels_disputed gauge");

        let tickets_circulating = register_int_gauge_with_registry!(
            Opts::new(
                "arena_tickets_circulating",
                "Tickets across all account balances"
            ),
            registry
        )
        .expect("failed to register tickets_circulating gauge");

        Self {
            registry,
            sweeps_total,
            duels_expired_total,
            tickets_refunded_total,
            sweep_failures_total,
            accounts,
            duels_active,
            duels_disputed,
            tickets_circulating,
        }
    }

    /// Fold one sweep pass into the counters.
    pub fn record_sweep(&self, report: &SweepReport) {
        self.sweeps_total.inc();
        self.duels_expired_total.inc_by(report.expired);
        self.tickets_refunded_total.inc_by(report.refunded.raw());
        self.sweep_failures_total.inc_by(report.failures);
    }

    /// Refresh the gauges from a stats snapshot.
    pub fn update_from_stats(&self, stats: &ArenaStats) {
        self.accounts.set(stats.accounts as i64);
        self.duels_active.set(stats.duels_active as i64);
        self.duels_disputed.set(stats.duels_disputed as i64);
        self.tickets_circulating
            .set(stats.tickets_circulating.raw() as i64);
    }
}

impl Default for ArenaMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::TicketAmount;

    #[test]
    fn record_sweep_accumulates() {
        let metrics = ArenaMetrics::new();
        let report = SweepReport {
            scanned: 5,
            expired: 2,
            refunded: TicketAmount::new(40),
            disputes_flagged: 1,
            failures: 0,
        };
        metrics.record_sweep(&report);
        metrics.record_sweep(&report);
        assert_eq!(metrics.sweeps_total.get(), 2);
        assert_eq!(metrics.duels_expired_total.get(), 4);
        assert_eq!(metrics.tickets_refunded_total.get(), 80);
    }
}
