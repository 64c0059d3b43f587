//! Ticket ledger for the arena.
//!
//! Every ticket movement on the platform goes through [`Ledger`]: staking,
//! pot payouts, refunds, and withdrawal debits. Balances live in the account
//! store; the ledger's job is to make each movement atomic and checked so
//! the total supply is conserved.

pub mod error;
pub mod ledger;
pub mod withdrawal;

pub use error::LedgerError;
pub use ledger::{ConservationReport, Ledger, RefundOutcome};
pub use withdrawal::WithdrawalEngine;
