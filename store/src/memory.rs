//! Thread-safe in-memory storage backend.
//!
//! Each table is a `Mutex<HashMap>`; `update_account` clones the record,
//! runs the caller's closure, and commits only if the closure accepts —
//! the check and the write happen under one lock acquisition, so no other
//! caller can interleave between them.
//!
//! State can be snapshotted to disk as one bincode blob and reloaded,
//! which is all the durability the simulated deployment needs.

use crate::account::{AccountRecord, AccountStore};
use crate::duel::{DuelRecord, DuelStore};
use crate::tournament::{TournamentRecord, TournamentStore};
use crate::withdrawal::{WithdrawalRecord, WithdrawalStore};
use crate::StoreError;
use arena_types::{AccountId, DuelId, TournamentId, WithdrawalId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub struct MemoryStore {
    accounts: Mutex<HashMap<u64, AccountRecord>>,
    duels: Mutex<HashMap<u64, DuelRecord>>,
    tournaments: Mutex<HashMap<u64, TournamentRecord>>,
    withdrawals: Mutex<HashMap<u64, WithdrawalRecord>>,
    next_duel_id: AtomicU64,
    next_tournament_id: AtomicU64,
    next_withdrawal_id: AtomicU64,
}

/// Serializable image of the whole store.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    accounts: Vec<AccountRecord>,
    duels: Vec<DuelRecord>,
    tournaments: Vec<TournamentRecord>,
    withdrawals: Vec<WithdrawalRecord>,
    next_duel_id: u64,
    next_tournament_id: u64,
    next_withdrawal_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            duels: Mutex::new(HashMap::new()),
            tournaments: Mutex::new(HashMap::new()),
            withdrawals: Mutex::new(HashMap::new()),
            next_duel_id: AtomicU64::new(1),
            next_tournament_id: AtomicU64::new(1),
            next_withdrawal_id: AtomicU64::new(1),
        }
    }

    /// Write the entire store to `path` as a bincode snapshot.
    pub fn save_to_path(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            accounts: self.accounts.lock().unwrap().values().cloned().collect(),
            duels: self.duels.lock().unwrap().values().cloned().collect(),
            tournaments: self.tournaments.lock().unwrap().values().cloned().collect(),
            withdrawals: self.withdrawals.lock().unwrap().values().cloned().collect(),
            next_duel_id: self.next_duel_id.load(Ordering::SeqCst),
            next_tournament_id: self.next_tournament_id.load(Ordering::SeqCst),
            next_withdrawal_id: self.next_withdrawal_id.load(Ordering::SeqCst),
        };
        let bytes =
            bincode::serialize(&snapshot).map_err(|e| StoreError::Serialization(e.to_string()))?;
        std::fs::write(path, bytes).map_err(|e| StoreError::Backend(e.to_string()))
    }

    /// Rebuild a store from a snapshot written by [`save_to_path`].
    ///
    /// [`save_to_path`]: MemoryStore::save_to_path
    pub fn load_from_path(path: &Path) -> Result<Self, StoreError> {
        let bytes = std::fs::read(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        let snapshot: Snapshot =
            bincode::deserialize(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let store = Self::new();
        {
            let mut accounts = store.accounts.lock().unwrap();
            for rec in snapshot.accounts {
                accounts.insert(rec.id.raw(), rec);
            }
            let mut duels = store.duels.lock().unwrap();
            for rec in snapshot.duels {
                duels.insert(rec.id.raw(), rec);
            }
            let mut tournaments = store.tournaments.lock().unwrap();
            for rec in snapshot.tournaments {
                tournaments.insert(rec.id.raw(), rec);
            }
            let mut withdrawals = store.withdrawals.lock().unwrap();
            for rec in snapshot.withdrawals {
                withdrawals.insert(rec.id.raw(), rec);
            }
        }
        store.next_duel_id.store(snapshot.next_duel_id, Ordering::SeqCst);
        store
            .next_tournament_id
            .store(snapshot.next_tournament_id, Ordering::SeqCst);
        store
            .next_withdrawal_id
            .store(snapshot.next_withdrawal_id, Ordering::SeqCst);
        Ok(store)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for MemoryStore {
    fn get_account(&self, id: &AccountId) -> Result<AccountRecord, StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .get(&id.raw())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn put_account(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.accounts
            .lock()
            .unwrap()
            .insert(record.id.raw(), record.clone());
        Ok(())
    }

    fn exists(&self, id: &AccountId) -> Result<bool, StoreError> {
        Ok(self.accounts.lock().unwrap().contains_key(&id.raw()))
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.lock().unwrap().len() as u64)
    }

    fn iter_accounts(&self) -> Result<Vec<AccountRecord>, StoreError> {
        Ok(self.accounts.lock().unwrap().values().cloned().collect())
    }

    fn update_account(
        &self,
        id: &AccountId,
        apply: &mut dyn FnMut(&mut AccountRecord) -> bool,
    ) -> Result<AccountRecord, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        let current = accounts
            .get(&id.raw())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut candidate = current.clone();
        if apply(&mut candidate) {
            accounts.insert(id.raw(), candidate.clone());
            Ok(candidate)
        } else {
            Ok(current.clone())
        }
    }
}

impl DuelStore for MemoryStore {
    fn allocate_duel_id(&self) -> Result<DuelId, StoreError> {
        Ok(DuelId::new(self.next_duel_id.fetch_add(1, Ordering::SeqCst)))
    }

    fn get_duel(&self, id: &DuelId) -> Result<DuelRecord, StoreError> {
        self.duels
            .lock()
            .unwrap()
            .get(&id.raw())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn put_duel(&self, record: &DuelRecord) -> Result<(), StoreError> {
        self.duels
            .lock()
            .unwrap()
            .insert(record.id.raw(), record.clone());
        Ok(())
    }

    fn duel_count(&self) -> Result<u64, StoreError> {
        Ok(self.duels.lock().unwrap().len() as u64)
    }

    fn iter_duels(&self) -> Result<Vec<DuelRecord>, StoreError> {
        Ok(self.duels.lock().unwrap().values().cloned().collect())
    }
}

impl TournamentStore for MemoryStore {
    fn allocate_tournament_id(&self) -> Result<TournamentId, StoreError> {
        Ok(TournamentId::new(
            self.next_tournament_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    fn get_tournament(&self, id: &TournamentId) -> Result<TournamentRecord, StoreError> {
        self.tournaments
            .lock()
            .unwrap()
            .get(&id.raw())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn put_tournament(&self, record: &TournamentRecord) -> Result<(), StoreError> {
        self.tournaments
            .lock()
            .unwrap()
            .insert(record.id.raw(), record.clone());
        Ok(())
    }

    fn iter_tournaments(&self) -> Result<Vec<TournamentRecord>, StoreError> {
        Ok(self.tournaments.lock().unwrap().values().cloned().collect())
    }
}

impl WithdrawalStore for MemoryStore {
    fn allocate_withdrawal_id(&self) -> Result<WithdrawalId, StoreError> {
        Ok(WithdrawalId::new(
            self.next_withdrawal_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    fn get_withdrawal(&self, id: &WithdrawalId) -> Result<WithdrawalRecord, StoreError> {
        self.withdrawals
            .lock()
            .unwrap()
            .get(&id.raw())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn put_withdrawal(&self, record: &WithdrawalRecord) -> Result<(), StoreError> {
        self.withdrawals
            .lock()
            .unwrap()
            .insert(record.id.raw(), record.clone());
        Ok(())
    }

    fn iter_withdrawals(&self) -> Result<Vec<WithdrawalRecord>, StoreError> {
        Ok(self.withdrawals.lock().unwrap().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_types::{GameKind, TicketAmount, Timestamp};

    fn test_account(id: u64, tickets: u64) -> AccountRecord {
        AccountRecord::new(
            AccountId::new(id),
            format!("player{id}"),
            TicketAmount::new(tickets),
            Timestamp::new(0),
        )
    }

    #[test]
    fn put_get_account() {
        let store = MemoryStore::new();
        let acct = test_account(1, 100);
        store.put_account(&acct).unwrap();
        let got = store.get_account(&AccountId::new(1)).unwrap();
        assert_eq!(got.tickets, TicketAmount::new(100));
    }

    #[test]
    fn account_not_found() {
        let store = MemoryStore::new();
        assert!(store.get_account(&AccountId::new(99)).is_err());
    }

    #[test]
    fn update_account_commits_when_accepted() {
        let store = MemoryStore::new();
        store.put_account(&test_account(1, 100)).unwrap();

        let updated = store
            .update_account(&AccountId::new(1), &mut |rec| {
                rec.tickets = TicketAmount::new(60);
                true
            })
            .unwrap();
        assert_eq!(updated.tickets, TicketAmount::new(60));
        assert_eq!(
            store.get_account(&AccountId::new(1)).unwrap().tickets,
            TicketAmount::new(60)
        );
    }

    #[test]
    fn update_account_declined_commits_nothing() {
        let store = MemoryStore::new();
        store.put_account(&test_account(1, 100)).unwrap();

        let unchanged = store
            .update_account(&AccountId::new(1), &mut |rec| {
                rec.tickets = TicketAmount::new(0);
                false
            })
            .unwrap();
        assert_eq!(unchanged.tickets, TicketAmount::new(100));
        assert_eq!(
            store.get_account(&AccountId::new(1)).unwrap().tickets,
            TicketAmount::new(100)
        );
    }

    #[test]
    fn duel_ids_are_unique_and_increasing() {
        let store = MemoryStore::new();
        let a = store.allocate_duel_id().unwrap();
        let b = store.allocate_duel_id().unwrap();
        assert!(a < b);
    }

    #[test]
    fn snapshot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arena.snapshot");

        let store = MemoryStore::new();
        store.put_account(&test_account(1, 100)).unwrap();
        let duel_id = store.allocate_duel_id().unwrap();
        store
            .put_duel(&DuelRecord::new(
                duel_id,
                AccountId::new(1),
                GameKind::BoxFight,
                TicketAmount::new(25),
                600,
                Timestamp::new(5),
            ))
            .unwrap();
        store.save_to_path(&path).unwrap();

        let restored = MemoryStore::load_from_path(&path).unwrap();
        assert_eq!(restored.account_count().unwrap(), 1);
        assert_eq!(restored.duel_count().unwrap(), 1);
        // Id allocation resumes past the snapshot point.
        let next = restored.allocate_duel_id().unwrap();
        assert!(next > duel_id);
    }
}
