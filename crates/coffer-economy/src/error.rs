//! Error types for the coffer-economy crate.
//!
//! Every economy operation validates its inputs before touching an account,
//! so each variant except [`EconomyError::StoreUnavailable`] means nothing
//! changed. Unmet prerequisites also mean the activity's cooldown was not
//! started.

use std::time::Duration;

use coffer_ledger::LedgerError;
use coffer_types::Activity;

/// Errors returned by economy operations.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    /// The ledger could not be read or written. The operation was aborted
    /// with no partial write.
    #[error("ledger unavailable: {0}")]
    StoreUnavailable(#[from] LedgerError),

    /// The activity was used too recently.
    #[error("{activity} is on cooldown for another {}s", remaining.as_secs())]
    OnCooldown {
        /// The activity attempted.
        activity: Activity,
        /// Time until the activity may be used again.
        remaining: Duration,
    },

    /// A precondition of the operation does not hold (missing item, level,
    /// job, or a target not worth robbing).
    #[error("requirement not met: {requirement}")]
    PrerequisiteUnmet {
        /// What was missing.
        requirement: String,
    },

    /// The wallet or bank does not cover the amount.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        /// Amount required.
        needed: i64,
        /// Amount held.
        available: i64,
    },

    /// A catalog entry or account does not exist.
    #[error("unknown {kind}: {name}")]
    NotFound {
        /// What kind of thing was looked up (`"item"`, `"pet"`, ...).
        kind: &'static str,
        /// The name or id that was looked up.
        name: String,
    },

    /// The caller supplied an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl EconomyError {
    /// Shorthand for [`EconomyError::PrerequisiteUnmet`].
    pub fn unmet(requirement: impl Into<String>) -> Self {
        Self::PrerequisiteUnmet {
            requirement: requirement.into(),
        }
    }

    /// Shorthand for [`EconomyError::NotFound`].
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for [`EconomyError::InvalidArgument`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// Fail with [`EconomyError::InsufficientFunds`] unless `available`
    /// covers `needed`.
    pub const fn require_funds(needed: i64, available: i64) -> Result<(), Self> {
        if available < needed {
            Err(Self::InsufficientFunds { needed, available })
        } else {
            Ok(())
        }
    }
}
