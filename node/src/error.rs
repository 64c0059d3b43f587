use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("duel error: {0}")]
    Duel(#[from] arena_duel::DuelError),

    #[error("tournament error: {0}")]
    Tournament(#[from] arena_tournament::TournamentError),

    #[error("ledger error: {0}")]
    Ledger(#[from] arena_ledger::LedgerError),

    #[error("store error: {0}")]
    Store(#[from] arena_store::StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
