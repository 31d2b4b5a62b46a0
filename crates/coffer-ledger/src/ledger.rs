//! The [`Ledger`]: committed account state plus per-account locks.
//!
//! # Design
//!
//! - **One document**: the committed map of every account is loaded once
//!   at [`Ledger::open`] and rewritten through the [`AccountStore`] on
//!   every commit.
//! - **Per-account serializability**: a [`LockedAccounts`] critical
//!   section owns the async lock of each account it touches, so no other
//!   mutation of those accounts can run between its read and its write.
//! - **All or nothing**: the in-memory document only takes a commit's
//!   values after the store write succeeds. Dropping a critical section
//!   without committing discards its working copy.
//! - **Blocking writes**: the store write runs on the committing thread.
//!   Commits queue on a dedicated write lock, while the committed document
//!   stays readable throughout, so `snapshot` and `lock` never wait behind
//!   a disk sync.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use coffer_types::{Account, UserId};

use crate::{AccountStore, LedgerError};

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Persistent mapping from [`UserId`] to [`Account`] with atomic
/// read-modify-write.
pub struct Ledger {
    store: Arc<dyn AccountStore>,
    document: Mutex<BTreeMap<UserId, Account>>,
    writer: Mutex<()>,
    locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl core::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ledger")
            .field("accounts", &self.document().len())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Load the document from `store` and wrap it in a ledger.
    pub fn open(store: Arc<dyn AccountStore>) -> Result<Self, LedgerError> {
        let document = store.load()?;
        tracing::info!(accounts = document.len(), "ledger loaded");
        Ok(Self {
            store,
            document: Mutex::new(document),
            writer: Mutex::new(()),
            locks: Mutex::new(HashMap::new()),
        })
    }

    fn document(&self) -> MutexGuard<'_, BTreeMap<UserId, Account>> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock handles for `ids`. Handles nobody holds or waits on are
    /// dropped first, so the table only tracks accounts in use.
    fn slots(&self, ids: &[UserId]) -> Vec<Arc<AsyncMutex<()>>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        ids.iter().map(|id| Arc::clone(locks.entry(*id).or_default())).collect()
    }

    /// Open a critical section over `ids`.
    ///
    /// Locks are taken lowest id first and duplicates are ignored. Ids with
    /// no stored account get a default account in the working copy, which
    /// is only persisted if the section commits.
    pub async fn lock(&self, ids: &[UserId]) -> LockedAccounts<'_> {
        let mut ordered = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let mut guards = Vec::with_capacity(ordered.len());
        for slot in self.slots(&ordered) {
            guards.push(slot.lock_owned().await);
        }

        let document = self.document();
        let mut accounts = BTreeMap::new();
        let mut created = BTreeSet::new();
        for id in ordered {
            if let Some(existing) = document.get(&id) {
                accounts.insert(id, existing.clone());
            } else {
                accounts.insert(id, Account::default());
                created.insert(id);
            }
        }
        drop(document);

        LockedAccounts {
            ledger: self,
            accounts,
            created,
            _guards: guards,
        }
    }

    /// Open a critical section over every account currently in the ledger.
    pub async fn lock_all(&self) -> LockedAccounts<'_> {
        let ids: Vec<UserId> = self.document().keys().copied().collect();
        self.lock(&ids).await
    }

    /// Run `f` against the account `id` and persist its changes if it
    /// returns `Ok`. An `Err` leaves the ledger untouched.
    pub async fn with_account<T, E, F>(&self, id: UserId, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Account) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let mut locked = self.lock(&[id]).await;
        let value = f(locked.account_mut(id)?)?;
        locked.commit()?;
        Ok(value)
    }

    /// Run `f` against two distinct accounts in one critical section and
    /// persist both in a single write if it returns `Ok`.
    pub async fn with_accounts<T, E, F>(&self, first: UserId, second: UserId, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Account, &mut Account) -> Result<T, E>,
        E: From<LedgerError>,
    {
        if first == second {
            return Err(LedgerError::DuplicateAccount(first).into());
        }
        let mut locked = self.lock(&[first, second]).await;
        let value = {
            let (a, b) = locked.pair_mut(first, second)?;
            f(a, b)?
        };
        locked.commit()?;
        Ok(value)
    }

    /// Return the account `id`, creating and persisting it if absent.
    /// An existing account is returned unchanged and nothing is written.
    pub async fn ensure(&self, id: UserId) -> Result<Account, LedgerError> {
        let locked = self.lock(&[id]).await;
        let account = locked.account(id)?.clone();
        if locked.was_created(id) {
            locked.commit()?;
            tracing::debug!(user = %id, "account created");
        }
        Ok(account)
    }

    /// Reinitialize an existing account to the starting defaults.
    pub async fn reset(&self, id: UserId) -> Result<(), LedgerError> {
        let mut locked = self.lock(&[id]).await;
        if locked.was_created(id) {
            return Err(LedgerError::NotFound(id));
        }
        *locked.account_mut(id)? = Account::default();
        locked.commit()?;
        tracing::info!(user = %id, "account reset");
        Ok(())
    }

    /// Committed state of `id`, if the account exists. Does not lock.
    pub fn snapshot(&self, id: UserId) -> Option<Account> {
        self.document().get(&id).cloned()
    }

    /// Copy of every committed account. Does not lock.
    pub fn accounts(&self) -> BTreeMap<UserId, Account> {
        self.document().clone()
    }

    /// Number of accounts in the ledger.
    pub fn len(&self) -> usize {
        self.document().len()
    }

    /// Whether the ledger holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.document().is_empty()
    }
}

// ---------------------------------------------------------------------------
// LockedAccounts
// ---------------------------------------------------------------------------

/// A critical section over a fixed set of accounts.
///
/// Holds the lock of every account it covers until dropped. Changes made
/// through [`account_mut`](Self::account_mut) are private to the section
/// until [`commit`](Self::commit) succeeds.
pub struct LockedAccounts<'a> {
    ledger: &'a Ledger,
    accounts: BTreeMap<UserId, Account>,
    created: BTreeSet<UserId>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl core::fmt::Debug for LockedAccounts<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LockedAccounts")
            .field("ids", &self.accounts.keys().collect::<Vec<_>>())
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

impl LockedAccounts<'_> {
    /// Working copy of `id`.
    pub fn account(&self, id: UserId) -> Result<&Account, LedgerError> {
        self.accounts.get(&id).ok_or(LedgerError::NotLocked(id))
    }

    /// Mutable working copy of `id`.
    pub fn account_mut(&mut self, id: UserId) -> Result<&mut Account, LedgerError> {
        self.accounts.get_mut(&id).ok_or(LedgerError::NotLocked(id))
    }

    /// Mutable working copies of two distinct accounts.
    pub fn pair_mut(
        &mut self,
        first: UserId,
        second: UserId,
    ) -> Result<(&mut Account, &mut Account), LedgerError> {
        if first == second {
            return Err(LedgerError::DuplicateAccount(first));
        }
        let mut a = None;
        let mut b = None;
        for (id, account) in &mut self.accounts {
            if *id == first {
                a = Some(account);
            } else if *id == second {
                b = Some(account);
            }
        }
        match (a, b) {
            (Some(a), Some(b)) => Ok((a, b)),
            (None, _) => Err(LedgerError::NotLocked(first)),
            (_, None) => Err(LedgerError::NotLocked(second)),
        }
    }

    /// Whether `id` had no stored account when the section opened.
    pub fn was_created(&self, id: UserId) -> bool {
        self.created.contains(&id)
    }

    /// Ids covered by this section, ascending.
    pub fn ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.accounts.keys().copied()
    }

    /// Iterate every working copy mutably, ascending by id.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (UserId, &mut Account)> + '_ {
        self.accounts.iter_mut().map(|(id, account)| (*id, account))
    }

    /// Number of accounts covered.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the section covers no accounts.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Persist every working copy in a single store write, then release
    /// the locks.
    ///
    /// The store write blocks the calling thread. Other commits wait for it,
    /// but readers keep seeing the previous committed values until it
    /// succeeds. On a store failure the committed document is left as it
    /// was and [`LedgerError::Store`] is returned.
    pub fn commit(self) -> Result<(), LedgerError> {
        let ledger = self.ledger;
        let _writer = ledger.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = ledger.document().clone();
        next.extend(self.accounts.iter().map(|(id, account)| (*id, account.clone())));

        if let Err(err) = ledger.store.save(&next) {
            tracing::warn!(error = %err, accounts = self.accounts.len(), "ledger commit failed");
            return Err(LedgerError::Store(err));
        }

        let touched = self.accounts.len();
        ledger.document().extend(self.accounts);
        tracing::debug!(accounts = touched, "ledger commit");
        Ok(())
    }
}
