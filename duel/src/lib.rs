//! Duel lifecycle engine.
//!
//! A duel moves through Open → Active → {Completed, Expired, Cancelled},
//! with Disputed as an intermediate hold when declarations contradict.
//! Every transition runs under a per-duel lock; guards are evaluated after
//! the lock is taken, so two racing callers observe each other's effects.

pub mod engine;
pub mod error;
pub mod rank;

pub use engine::{ArenaStats, DuelEngine, LeaderboardEntry, SweepReport};
pub use error::DuelError;
pub use rank::RankTable;
