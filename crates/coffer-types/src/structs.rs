//! Core record types: the persistent [`Account`] and the sweep
//! [`MaintenanceRates`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::enums::{Job, Pet};

/// Wallet balance of a freshly created account.
pub const STARTING_WALLET: i64 = 100;

/// Default daily interest rate on bank balances, in basis points (1%).
pub const DEFAULT_INTEREST_RATE_BPS: u32 = 100;

/// Default daily tax rate on wallet balances, in basis points (2%).
pub const DEFAULT_TAX_RATE_BPS: u32 = 200;

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// The persistent per-user record.
///
/// Every field has a serde default, so a stored record that predates a
/// field is backfilled on read instead of failing to load. Currency is
/// signed: fines and taxes subtract without clamping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// Liquid currency. Subject to tax, theft, and fines.
    pub wallet: i64,
    /// Banked currency. Earns interest, untouched by tax.
    pub bank: i64,
    /// Progression level, always at least 1.
    pub level: u32,
    /// Experience toward the next level.
    pub xp: u64,
    /// Held items by display name. Duplicates allowed.
    pub inventory: Vec<String>,
    /// Consecutive days the daily reward was claimed.
    pub daily_streak: u32,
    /// Calendar day of the last daily claim.
    pub last_daily: Option<NaiveDate>,
    /// Adopted pet, if any.
    pub pet: Option<Pet>,
    /// Current job, if any.
    pub job: Option<Job>,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            wallet: STARTING_WALLET,
            bank: 0,
            level: 1,
            xp: 0,
            inventory: Vec::new(),
            daily_streak: 0,
            last_daily: None,
            pet: None,
            job: None,
        }
    }
}

impl Account {
    /// Whether the inventory holds at least one `item` (case-insensitive).
    pub fn holds(&self, item: &str) -> bool {
        self.inventory
            .iter()
            .any(|held| held.eq_ignore_ascii_case(item))
    }

    /// Append one copy of `item`.
    pub fn add_item(&mut self, item: impl Into<String>) {
        self.inventory.push(item.into());
    }

    /// Remove one copy of `item` (case-insensitive). Returns `false` when
    /// nothing matched.
    pub fn remove_item(&mut self, item: &str) -> bool {
        match self
            .inventory
            .iter()
            .position(|held| held.eq_ignore_ascii_case(item))
        {
            Some(index) => {
                self.inventory.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every copy of `item` (case-insensitive), returning how many
    /// were taken out.
    pub fn remove_all(&mut self, item: &str) -> usize {
        let before = self.inventory.len();
        self.inventory.retain(|held| !held.eq_ignore_ascii_case(item));
        before.saturating_sub(self.inventory.len())
    }
}

// ---------------------------------------------------------------------------
// MaintenanceRates
// ---------------------------------------------------------------------------

/// Interest and tax rates applied by the daily sweeps.
///
/// Rates are fractions (`0.01` is one percent) held as [`Decimal`] so the
/// floor of `balance * rate` is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceRates {
    /// Fraction of each positive bank balance credited per sweep.
    pub interest_rate: Decimal,
    /// Fraction of each positive wallet balance withdrawn per sweep.
    pub tax_rate: Decimal,
}

impl Default for MaintenanceRates {
    fn default() -> Self {
        Self {
            interest_rate: Decimal::new(i64::from(DEFAULT_INTEREST_RATE_BPS), 4),
            tax_rate: Decimal::new(i64::from(DEFAULT_TAX_RATE_BPS), 4),
        }
    }
}

impl MaintenanceRates {
    /// Whether `rate` is an acceptable fraction (`0 <= rate <= 1`).
    pub fn is_valid_rate(rate: Decimal) -> bool {
        rate >= Decimal::ZERO && rate <= Decimal::ONE
    }

    /// `floor(bank * interest_rate)` for a positive balance, else zero.
    pub fn interest_on(&self, bank: i64) -> i64 {
        floor_share(bank, self.interest_rate)
    }

    /// `floor(wallet * tax_rate)` for a positive balance, else zero.
    pub fn tax_on(&self, wallet: i64) -> i64 {
        floor_share(wallet, self.tax_rate)
    }
}

fn floor_share(amount: i64, rate: Decimal) -> i64 {
    if amount <= 0 {
        return 0;
    }
    Decimal::from(amount)
        .checked_mul(rate)
        .and_then(|share| share.floor().to_i64())
        .unwrap_or(0)
}
