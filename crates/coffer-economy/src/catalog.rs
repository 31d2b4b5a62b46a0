//! Static reference data: shop items, sell prices, pets, and jobs.
//!
//! Everything here is immutable except the sell-price table, which an
//! administrator may reprice at runtime through [`PriceBook::set`]. Lookups
//! are case-insensitive exact matches.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use coffer_types::{Job, Pet};

use crate::error::EconomyError;

// ---------------------------------------------------------------------------
// Item names
// ---------------------------------------------------------------------------

/// Needed to `fish`.
pub const FISHING_ROD: &str = "Fishing Rod";
/// Needed for `upgraded_fish`. Made from a [`FISHING_ROD`] by upgrading.
pub const UPGRADED_FISHING_ROD: &str = "Upgraded Fishing Rod";
/// Needed to `hunt`.
pub const HUNTING_RIFLE: &str = "Hunting Rifle";
/// Needed to `dig`.
pub const SHOVEL: &str = "Shovel";
/// Needed to `hack`.
pub const LAPTOP: &str = "Laptop";
/// Needed to `mine`.
pub const PICKAXE: &str = "Pickaxe";
/// Consumable that resets the `work` cooldown.
pub const ENERGY_DRINK: &str = "Energy Drink";
/// Consumable that waives one failed-robbery fine.
pub const MEDKIT: &str = "Medkit";

/// Price of turning a [`FISHING_ROD`] into an [`UPGRADED_FISHING_ROD`].
pub const ROD_UPGRADE_COST: i64 = 500;

// ---------------------------------------------------------------------------
// Shop
// ---------------------------------------------------------------------------

/// An item for sale in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopItem {
    /// Display name, as stored in inventories.
    pub name: &'static str,
    /// Purchase price in coins.
    pub price: i64,
    /// One-line description.
    pub description: &'static str,
    /// Whether using the item consumes it.
    pub consumable: bool,
}

/// Every item the shop sells.
pub const SHOP: [ShopItem; 7] = [
    ShopItem {
        name: FISHING_ROD,
        price: 250,
        description: "Use to go fishing.",
        consumable: false,
    },
    ShopItem {
        name: HUNTING_RIFLE,
        price: 500,
        description: "Use to go hunting.",
        consumable: false,
    },
    ShopItem {
        name: SHOVEL,
        price: 100,
        description: "Use to dig for treasure.",
        consumable: false,
    },
    ShopItem {
        name: LAPTOP,
        price: 1000,
        description: "Use to hack for money.",
        consumable: false,
    },
    ShopItem {
        name: PICKAXE,
        price: 300,
        description: "Use to mine for gems.",
        consumable: false,
    },
    ShopItem {
        name: ENERGY_DRINK,
        price: 50,
        description: "Resets your work cooldown.",
        consumable: true,
    },
    ShopItem {
        name: MEDKIT,
        price: 150,
        description: "Waives the fine after a failed robbery.",
        consumable: true,
    },
];

/// Look up a shop item by name.
pub fn shop_item(name: &str) -> Option<&'static ShopItem> {
    let wanted = name.trim();
    SHOP.iter().find(|item| item.name.eq_ignore_ascii_case(wanted))
}

// ---------------------------------------------------------------------------
// Sell prices
// ---------------------------------------------------------------------------

/// Initial sell price of every sellable item, keyed by lowercase name.
pub const DEFAULT_SELL_PRICES: [(&str, i64); 24] = [
    ("rare pelt", 250),
    ("old relic", 150),
    ("shiny bracelet", 200),
    ("rare gem", 700),
    ("gold ore", 300),
    ("diamond", 1200),
    ("upgraded fishing rod", 200),
    ("hunting rifle", 250),
    ("laptop", 500),
    ("pickaxe", 150),
    ("shovel", 50),
    ("fishing rod", 100),
    ("salmon", 40),
    ("tuna", 60),
    ("cod", 30),
    ("sardine", 15),
    ("rare salmon", 80),
    ("giant tuna", 120),
    ("deep sea cod", 70),
    ("golden fish", 500),
    ("diamond ring", 1000),
    ("apple", 20),
    ("orange", 25),
    ("banana", 15),
];

/// Items that `sell all fish` sells, lowercase.
pub const FISH_TYPES: [&str; 10] = [
    "salmon",
    "tuna",
    "cod",
    "sardine",
    "rare salmon",
    "giant tuna",
    "deep sea cod",
    "golden fish",
    "shiny bracelet",
    "diamond ring",
];

/// Whether `item` counts as fish for `sell all fish`.
pub fn is_fish(item: &str) -> bool {
    FISH_TYPES.iter().any(|fish| fish.eq_ignore_ascii_case(item))
}

/// The mutable sell-price table, guarded by its own lock.
#[derive(Debug)]
pub struct PriceBook {
    prices: RwLock<BTreeMap<String, i64>>,
}

impl Default for PriceBook {
    fn default() -> Self {
        Self {
            prices: RwLock::new(
                DEFAULT_SELL_PRICES
                    .iter()
                    .map(|(name, price)| ((*name).to_owned(), *price))
                    .collect(),
            ),
        }
    }
}

impl PriceBook {
    /// Sell price of `item`, if it can be sold.
    pub fn price(&self, item: &str) -> Option<i64> {
        self.prices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&item.trim().to_lowercase())
            .copied()
    }

    /// Reprice an existing sellable item. New items cannot be added.
    pub fn set(&self, item: &str, price: i64) -> Result<(), EconomyError> {
        if price < 0 {
            return Err(EconomyError::invalid("price cannot be negative"));
        }
        let key = item.trim().to_lowercase();
        let mut prices = self.prices.write().unwrap_or_else(PoisonError::into_inner);
        match prices.get_mut(&key) {
            Some(slot) => {
                *slot = price;
                Ok(())
            }
            None => Err(EconomyError::not_found("sellable item", item.trim())),
        }
    }

    /// Every sellable item and its price, sorted by name.
    pub fn list(&self) -> Vec<(String, i64)> {
        self.prices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, price)| (name.clone(), *price))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Pets
// ---------------------------------------------------------------------------

/// Adoption terms and bonus of a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PetInfo {
    /// The pet.
    pub pet: Pet,
    /// Adoption price in coins.
    pub price: i64,
    /// Percentage bonus on the boosted activity.
    pub bonus_pct: i64,
    /// One-line description.
    pub description: &'static str,
}

/// Terms for `pet`.
pub const fn pet_info(pet: Pet) -> PetInfo {
    match pet {
        Pet::Dog => PetInfo {
            pet,
            price: 750,
            bonus_pct: 5,
            description: "Earn 5% more from work.",
        },
        Pet::Cat => PetInfo {
            pet,
            price: 600,
            bonus_pct: 3,
            description: "Earn 3% more from daily.",
        },
        Pet::Parrot => PetInfo {
            pet,
            price: 400,
            bonus_pct: 2,
            description: "Find 2% more coins while begging.",
        },
    }
}

/// `amount` boosted by `pct` percent, floored.
pub fn with_bonus(amount: i64, pct: i64) -> i64 {
    amount
        .saturating_mul(pct.saturating_add(100))
        .checked_div(100)
        .unwrap_or(amount)
}

/// `amount` with `pet`'s bonus applied when the account's pet is `pet`.
pub fn pet_bonus(owned: Option<Pet>, pet: Pet, amount: i64) -> i64 {
    if owned == Some(pet) {
        with_bonus(amount, pet_info(pet).bonus_pct)
    } else {
        amount
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Pay and cooldown of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobInfo {
    /// The job.
    pub job: Job,
    /// Smallest paycheck.
    pub payout_min: i64,
    /// Largest paycheck.
    pub payout_max: i64,
    /// Seconds between paychecks.
    pub cooldown_secs: i64,
}

/// Terms for `job`.
pub const fn job_info(job: Job) -> JobInfo {
    match job {
        Job::Programmer => JobInfo {
            job,
            payout_min: 300,
            payout_max: 700,
            cooldown_secs: 3600,
        },
        Job::Chef => JobInfo {
            job,
            payout_min: 200,
            payout_max: 500,
            cooldown_secs: 2400,
        },
        Job::Gamer => JobInfo {
            job,
            payout_min: 100,
            payout_max: 300,
            cooldown_secs: 1800,
        },
    }
}
