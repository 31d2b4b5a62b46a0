//! File-backed persistence for the Coffer economy.
//!
//! Two documents live on disk, both plain JSON:
//!
//! ```text
//! data/users.json   { "<user id>": { wallet, bank, level, ... }, ... }
//! config.json       { "interest_rate": 0.01, "tax_rate": 0.02, ... }
//! ```
//!
//! Every write goes to a sibling temporary file which is then renamed over
//! the document, so a crash mid-write leaves the previous document intact.
//!
//! # Modules
//!
//! - [`account_store`] -- [`JsonAccountStore`], the ledger document
//! - [`rates_store`] -- [`JsonRatesStore`], the interest/tax rates document
//! - [`file`] -- Shared read and atomic-replace helpers

pub mod account_store;
pub mod file;
pub mod rates_store;

// Re-export primary types for convenience.
pub use account_store::JsonAccountStore;
pub use rates_store::JsonRatesStore;
