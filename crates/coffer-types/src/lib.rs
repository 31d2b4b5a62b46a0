//! Shared type definitions for the Coffer economy ledger.
//!
//! This crate is the single source of truth for the data model shared by
//! the ledger, the persistence backends, the economy rules, and the
//! maintenance scheduler.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier types ([`UserId`] for accounts, [`TransferId`]
//!   for confirmation requests)
//! - [`enums`] -- Enumeration types (pets, jobs, activities, leaderboard keys)
//! - [`structs`] -- The [`Account`] record and [`MaintenanceRates`]

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Activity, CoinFace, Job, LeaderboardKey, ParseNameError, Pet};
pub use ids::{TransferId, UserId};
pub use structs::{
    Account, DEFAULT_INTEREST_RATE_BPS, DEFAULT_TAX_RATE_BPS, MaintenanceRates, STARTING_WALLET,
};
