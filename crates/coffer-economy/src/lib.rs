//! Rules of the Coffer economy.
//!
//! This crate is everything that decides how account state changes:
//! progression arithmetic, the catalogs, the activity resolvers, the
//! market, transfers, and trivia. It reaches storage only through
//! `coffer-ledger`, and everything the outside world calls goes through the
//! [`Economy`] facade.
//!
//! # Modules
//!
//! - [`actions`] -- Activity resolvers and the [`ActionRequest`] dispatch
//! - [`catalog`] -- Shop items, sell prices, pets, and jobs
//! - [`clock`] -- Wall-clock source ([`Clock`])
//! - [`cooldown`] -- Per-account, per-activity cooldowns ([`CooldownBook`])
//! - [`dice`] -- Random draws for outcome tables ([`Dice`])
//! - [`economy`] -- The [`Economy`] facade
//! - [`error`] -- Error type for every economy operation ([`EconomyError`])
//! - [`leaderboard`] -- Ranking of committed accounts
//! - [`market`] -- Buying, selling, banking, pets, jobs, upgrades, item use
//! - [`progression`] -- XP thresholds, level-ups, daily streaks
//! - [`transfer`] -- Confirm-or-cancel transfers between accounts
//! - [`trivia`] -- Timed trivia questions

pub mod actions;
pub mod catalog;
pub mod clock;
pub mod cooldown;
pub mod dice;
pub mod economy;
pub mod error;
pub mod leaderboard;
pub mod market;
pub mod progression;
pub mod transfer;
pub mod trivia;

// Re-export primary types at crate root for convenience.
pub use actions::{ActionOutcome, ActionRequest, OutcomeDetail};
pub use catalog::{JobInfo, PetInfo, PriceBook, ShopItem};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cooldown::CooldownBook;
pub use dice::{Dice, LoadedDice, RandomDice};
pub use economy::{BalanceView, Economy, XpAward};
pub use error::EconomyError;
pub use market::{Amount, Sale, SaleLine, SellScope, UseEffect};
pub use progression::{LevelUp, ProgressionTrack};
pub use transfer::{Decision, PendingTransfer, TransferOutcome, TransferResponder};
pub use trivia::{TriviaQuestion, TriviaRound};
