//! Single-elimination tournament engine.
//!
//! Entry fees fund a closed prize pool paid in full to the champion.
//! Brackets are drawn by shuffling entrants; an odd entrant count gives the
//! last seed a bye whose winner is fixed at draw time.

pub mod engine;
pub mod error;

pub use engine::TournamentEngine;
pub use error::TournamentError;
