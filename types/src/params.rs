//! Platform parameters — everything an operator can tune without a code
//! change.
//!
//! Rank thresholds, expiry windows, and conversion rates are configuration,
//! not hard-coded policy.

use crate::amount::TicketAmount;
use serde::{Deserialize, Serialize};

/// One rung of the rank ladder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankThreshold {
    /// Minimum cumulative victories for this label.
    pub min_victories: u64,
    pub label: String,
}

/// All tunable parameters of the arena backend.
///
/// Fields omitted from a config file fall back to the defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaParams {
    /// Tickets granted to a freshly registered account.
    pub starting_tickets: TicketAmount,

    /// Default duel duration from `started_at` to `expires_at`, in seconds.
    pub duel_duration_secs: u64,

    /// Age at which a duel still sitting in Disputed is flagged for human
    /// escalation, in seconds.
    pub dispute_alert_age_secs: u64,

    /// Interval between auto-resolution sweeps, in seconds.
    pub sweep_interval_secs: u64,

    /// Rank ladder, ordered by ascending `min_victories`. The highest rung
    /// at or below the victory count wins.
    pub rank_thresholds: Vec<RankThreshold>,

    /// Conversion rate for withdrawals: tickets per euro.
    pub tickets_per_euro: u64,

    /// Minimum withdrawal, in euros.
    pub min_withdrawal_euros: u64,

    /// Maximum withdrawal, in euros.
    pub max_withdrawal_euros: u64,
}

impl ArenaParams {
    /// Production defaults, matching the live rank ladder.
    pub fn arena_defaults() -> Self {
        Self {
            starting_tickets: TicketAmount::new(100),
            duel_duration_secs: 24 * 3600,
            dispute_alert_age_secs: 12 * 3600,
            sweep_interval_secs: 60,
            rank_thresholds: vec![
                RankThreshold { min_victories: 0, label: "Beginner".into() },
                RankThreshold { min_victories: 5, label: "Amateur".into() },
                RankThreshold { min_victories: 15, label: "Confirmed".into() },
                RankThreshold { min_victories: 30, label: "Expert".into() },
                RankThreshold { min_victories: 50, label: "Master".into() },
                RankThreshold { min_victories: 100, label: "Legend".into() },
            ],
            tickets_per_euro: 10,
            min_withdrawal_euros: 1,
            max_withdrawal_euros: 1000,
        }
    }
}

impl Default for ArenaParams {
    fn default() -> Self {
        Self::arena_defaults()
    }
}
