//! Fundamental types for the arena wagering backend.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, ticket amounts, timestamps, lifecycle enums, and
//! the tunable parameters.

pub mod amount;
pub mod game;
pub mod id;
pub mod params;
pub mod state;
pub mod time;

pub use amount::TicketAmount;
pub use game::{GameCategory, GameKind};
pub use id::{AccountId, DuelId, TournamentId, WithdrawalId};
pub use params::{ArenaParams, RankThreshold};
pub use state::{Declaration, DuelState, Role, Side, TournamentState, VerificationState, WithdrawalState};
pub use time::Timestamp;
