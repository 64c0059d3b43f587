//! Storage traits and records for the arena backend.
//!
//! Every storage backend implements these traits; the engines depend only on
//! the traits. The bundled [`MemoryStore`] is the reference backend — the
//! spec treats durable storage as an external collaborator, so all that is
//! required here is a transactional check-and-apply primitive.

pub mod account;
pub mod duel;
pub mod error;
pub mod memory;
pub mod tournament;
pub mod withdrawal;

pub use account::{AccountRecord, AccountStore};
pub use duel::{AdminOverride, DuelRecord, DuelStore};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use tournament::{BracketMatch, TournamentRecord, TournamentStore};
pub use withdrawal::{WithdrawalRecord, WithdrawalStore};
