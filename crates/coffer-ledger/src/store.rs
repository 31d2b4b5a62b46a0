//! Persistence contracts for the ledger document and the rates document.
//!
//! Both contracts are synchronous: a backend reads or replaces a whole
//! document per call. The [`Ledger`](crate::Ledger) serializes writers, so
//! implementations only need to make a single `save` atomic.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use coffer_types::{Account, MaintenanceRates, UserId};

use crate::StoreError;

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Durable home of the ledger document (user id to account).
pub trait AccountStore: Send + Sync {
    /// Read the full document. A store that has never been written
    /// returns an empty map.
    fn load(&self) -> Result<BTreeMap<UserId, Account>, StoreError>;

    /// Replace the full document. Either the whole document is written or
    /// the previous one is left intact.
    fn save(&self, document: &BTreeMap<UserId, Account>) -> Result<(), StoreError>;
}

/// Durable home of the interest and tax rates.
pub trait RatesStore: Send + Sync {
    /// Read the current rates. Missing keys fall back to the defaults.
    fn load_rates(&self) -> Result<MaintenanceRates, StoreError>;

    /// Persist new rates, preserving anything else the document holds.
    fn save_rates(&self, rates: &MaintenanceRates) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory [`AccountStore`] with write-failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<BTreeMap<UserId, Account>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `accounts`.
    pub fn with_accounts(accounts: impl IntoIterator<Item = (UserId, Account)>) -> Self {
        Self {
            document: Mutex::new(accounts.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Make every subsequent `save` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the last persisted document.
    pub fn contents(&self) -> BTreeMap<UserId, Account> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AccountStore for MemoryStore {
    fn load(&self) -> Result<BTreeMap<UserId, Account>, StoreError> {
        Ok(self.contents())
    }

    fn save(&self, document: &BTreeMap<UserId, Account>) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store write refused".to_owned()));
        }
        let mut stored = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        stored.clone_from(document);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryRatesStore
// ---------------------------------------------------------------------------

/// In-memory [`RatesStore`].
#[derive(Debug, Default)]
pub struct MemoryRatesStore {
    rates: Mutex<MaintenanceRates>,
}

impl MemoryRatesStore {
    /// Create a store holding `rates`.
    pub const fn new(rates: MaintenanceRates) -> Self {
        Self {
            rates: Mutex::new(rates),
        }
    }
}

impl RatesStore for MemoryRatesStore {
    fn load_rates(&self) -> Result<MaintenanceRates, StoreError> {
        Ok(*self.rates.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn save_rates(&self, rates: &MaintenanceRates) -> Result<(), StoreError> {
        *self.rates.lock().unwrap_or_else(PoisonError::into_inner) = *rates;
        Ok(())
    }
}
