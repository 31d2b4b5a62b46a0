//! Account ledger for the Coffer economy.
//!
//! The ledger holds exactly one [`Account`] per [`UserId`] and is the only
//! path by which account state changes. Every mutation happens inside a
//! per-account critical section and is persisted before the caller sees
//! its result.
//!
//! # Architecture
//!
//! - [`store`] -- The [`AccountStore`] and [`RatesStore`] persistence
//!   contracts plus in-memory implementations.
//! - [`ledger`] -- The [`Ledger`] and its [`LockedAccounts`] critical
//!   section.
//!
//! # Locking
//!
//! Each account id owns one `tokio::sync::Mutex`. Multi-account operations
//! acquire the locks of every id involved in ascending id order, so two
//! operations over overlapping sets of accounts never deadlock. The shared
//! in-memory document sits behind a short synchronous mutex that is never
//! held across an `.await` or a store write. Store writes are synchronous
//! and queue on their own lock.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use coffer_ledger::{Ledger, LedgerError, MemoryStore};
//! use coffer_types::UserId;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), LedgerError> {
//! let ledger = Ledger::open(Arc::new(MemoryStore::new()))?;
//! let alice = UserId(1);
//!
//! ledger
//!     .with_account(alice, |account| {
//!         account.wallet = account.wallet.saturating_add(50);
//!         Ok::<_, LedgerError>(())
//!     })
//!     .await?;
//!
//! assert_eq!(ledger.snapshot(alice).map(|a| a.wallet), Some(150));
//! # Ok(())
//! # }
//! ```
//!
//! [`Account`]: coffer_types::Account
//! [`UserId`]: coffer_types::UserId

pub mod ledger;
pub mod store;

// Re-export primary types at crate root.
pub use ledger::{Ledger, LockedAccounts};
pub use store::{AccountStore, MemoryRatesStore, MemoryStore, RatesStore};

use std::path::PathBuf;

use coffer_types::UserId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures of a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing a backing file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A stored document could not be encoded or decoded.
    #[error("corrupt document {}: {source}", path.display())]
    Serialization {
        /// The document being encoded or decoded.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },

    /// A stored value was well-formed JSON but not a valid field value.
    #[error("invalid value for {field} in {}: {reason}", path.display())]
    InvalidValue {
        /// The document holding the value.
        path: PathBuf,
        /// The offending key.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the [`Ledger`].
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The persistence backend failed. Nothing was written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An account was accessed through a critical section that does not
    /// hold its lock.
    #[error("account {0} is not locked by this critical section")]
    NotLocked(UserId),

    /// The account does not exist in the ledger.
    #[error("account {0} not found")]
    NotFound(UserId),

    /// A two-account operation named the same account twice.
    #[error("account {0} named twice in a two-account operation")]
    DuplicateAccount(UserId),
}
