//! Shop, sell-back, banking, pets, jobs, upgrades, and item use.
//!
//! Every function here mutates one account's working copy and validates
//! everything before the first write, so an `Err` leaves the account as
//! it was. [`Economy`](crate::Economy) wraps each one in a ledger critical
//! section.

use core::str::FromStr;

use coffer_types::{Account, Job, ParseNameError, Pet};

use crate::catalog::{
    ENERGY_DRINK, FISHING_ROD, JobInfo, MEDKIT, PetInfo, PriceBook, ROD_UPGRADE_COST, ShopItem,
    UPGRADED_FISHING_ROD, is_fish, job_info, pet_info, shop_item,
};
use crate::error::EconomyError;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// How much to move between wallet and bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// A fixed number of coins.
    Exact(i64),
    /// Everything in the source balance.
    Max,
}

impl Amount {
    const fn resolve(self, available: i64) -> i64 {
        match self {
            Self::Exact(amount) => amount,
            Self::Max => available,
        }
    }
}

impl FromStr for Amount {
    type Err = EconomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("max") {
            return Ok(Self::Max);
        }
        trimmed
            .parse::<i64>()
            .map(Self::Exact)
            .map_err(|err| EconomyError::invalid(format!("not an amount: {trimmed} ({err})")))
    }
}

/// Which inventory items a bulk sale covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SellScope {
    /// Every item with a sell price.
    All,
    /// Every fish (and fishing treasure) with a sell price.
    Fish,
    /// Every copy of one named item.
    Item(String),
}

impl SellScope {
    /// Interpret the optional argument of `sell all`.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg.map(str::trim) {
            None | Some("") => Self::All,
            Some(name) if name.eq_ignore_ascii_case("fish") => Self::Fish,
            Some(name) => Self::Item(name.to_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Shop
// ---------------------------------------------------------------------------

/// Buy one `name` from the shop.
pub fn buy(account: &mut Account, name: &str) -> Result<&'static ShopItem, EconomyError> {
    let item = shop_item(name).ok_or_else(|| EconomyError::not_found("shop item", name.trim()))?;
    EconomyError::require_funds(item.price, account.wallet)?;
    account.wallet = account.wallet.saturating_sub(item.price);
    account.add_item(item.name);
    Ok(item)
}

/// One item kind in a [`Sale`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    /// Item name as it was held.
    pub item: String,
    /// Copies sold.
    pub count: usize,
    /// Price per copy at the time of sale.
    pub unit_price: i64,
}

/// What a sell operation sold and earned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sale {
    /// Items sold, in inventory order of first appearance.
    pub lines: Vec<SaleLine>,
    /// Coins credited to the wallet.
    pub total: i64,
}

impl Sale {
    fn record(&mut self, item: &str, unit_price: i64) {
        self.total = self.total.saturating_add(unit_price);
        match self
            .lines
            .iter_mut()
            .find(|line| line.item.eq_ignore_ascii_case(item))
        {
            Some(line) => line.count = line.count.saturating_add(1),
            None => self.lines.push(SaleLine {
                item: item.to_owned(),
                count: 1,
                unit_price,
            }),
        }
    }

    /// Total copies sold.
    pub fn count(&self) -> usize {
        self.lines.iter().map(|line| line.count).sum()
    }
}

/// Sell one copy of `name` at the current sell price.
pub fn sell(account: &mut Account, name: &str, prices: &PriceBook) -> Result<Sale, EconomyError> {
    let wanted = name.trim();
    let held = account
        .inventory
        .iter()
        .find(|item| item.eq_ignore_ascii_case(wanted))
        .cloned()
        .ok_or_else(|| EconomyError::unmet(format!("you don't have a {wanted}")))?;
    let price = prices
        .price(&held)
        .ok_or_else(|| EconomyError::not_found("sellable item", held.as_str()))?;

    account.remove_item(&held);
    account.wallet = account.wallet.saturating_add(price);

    let mut sale = Sale::default();
    sale.record(&held, price);
    Ok(sale)
}

/// Sell every held item that `scope` covers.
pub fn sell_all(account: &mut Account, scope: &SellScope, prices: &PriceBook) -> Result<Sale, EconomyError> {
    let fish_only = match scope {
        SellScope::Item(name) => return sell_copies(account, name.trim(), prices),
        SellScope::All => false,
        SellScope::Fish => true,
    };

    let selected: Vec<(String, i64)> = account
        .inventory
        .iter()
        .filter(|item| !fish_only || is_fish(item))
        .filter_map(|item| prices.price(item).map(|price| (item.clone(), price)))
        .collect();

    if selected.is_empty() {
        return Err(EconomyError::unmet(if fish_only {
            "no fish in inventory"
        } else {
            "nothing sellable in inventory"
        }));
    }

    let mut sale = Sale::default();
    for (item, price) in selected {
        account.remove_item(&item);
        sale.record(&item, price);
    }
    account.wallet = account.wallet.saturating_add(sale.total);
    Ok(sale)
}

/// Sell every copy of one priced item.
fn sell_copies(account: &mut Account, name: &str, prices: &PriceBook) -> Result<Sale, EconomyError> {
    let price = prices
        .price(name)
        .ok_or_else(|| EconomyError::not_found("sellable item", name))?;
    let Some(held) = account
        .inventory
        .iter()
        .find(|held| held.eq_ignore_ascii_case(name))
        .cloned()
    else {
        return Err(EconomyError::unmet(format!("no {name} in inventory")));
    };

    let mut sale = Sale::default();
    for _ in 0..account.remove_all(name) {
        sale.record(&held, price);
    }
    account.wallet = account.wallet.saturating_add(sale.total);
    Ok(sale)
}

// ---------------------------------------------------------------------------
// Bank
// ---------------------------------------------------------------------------

/// Move coins from wallet to bank. Returns the amount moved.
pub fn deposit(account: &mut Account, amount: Amount) -> Result<i64, EconomyError> {
    let moved = amount.resolve(account.wallet);
    if moved <= 0 {
        return Err(EconomyError::invalid("deposit must be positive"));
    }
    EconomyError::require_funds(moved, account.wallet)?;
    account.wallet = account.wallet.saturating_sub(moved);
    account.bank = account.bank.saturating_add(moved);
    Ok(moved)
}

/// Move coins from bank to wallet. Returns the amount moved.
pub fn withdraw(account: &mut Account, amount: Amount) -> Result<i64, EconomyError> {
    let moved = amount.resolve(account.bank);
    if moved <= 0 {
        return Err(EconomyError::invalid("withdrawal must be positive"));
    }
    EconomyError::require_funds(moved, account.bank)?;
    account.bank = account.bank.saturating_sub(moved);
    account.wallet = account.wallet.saturating_add(moved);
    Ok(moved)
}

// ---------------------------------------------------------------------------
// Pets and jobs
// ---------------------------------------------------------------------------

/// Adopt the pet called `name`. An account keeps at most one pet.
pub fn adopt(account: &mut Account, name: &str) -> Result<PetInfo, EconomyError> {
    if let Some(current) = account.pet {
        return Err(EconomyError::unmet(format!("already has a pet ({})", current.name())));
    }
    let pet: Pet = name
        .parse()
        .map_err(|err: ParseNameError| EconomyError::not_found(err.kind, err.name))?;
    let terms = pet_info(pet);
    EconomyError::require_funds(terms.price, account.wallet)?;
    account.wallet = account.wallet.saturating_sub(terms.price);
    account.pet = Some(pet);
    Ok(terms)
}

/// Take the job called `name`. An account holds at most one job.
pub fn apply_job(account: &mut Account, name: &str) -> Result<JobInfo, EconomyError> {
    if let Some(current) = account.job {
        return Err(EconomyError::unmet(format!("already works as a {}", current.name())));
    }
    let job: Job = name
        .parse()
        .map_err(|err: ParseNameError| EconomyError::not_found(err.kind, err.name))?;
    account.job = Some(job);
    Ok(job_info(job))
}

/// Leave the current job.
pub fn quit_job(account: &mut Account) -> Result<Job, EconomyError> {
    account.job.take().ok_or_else(|| EconomyError::unmet("no job to quit"))
}

// ---------------------------------------------------------------------------
// Upgrades and item use
// ---------------------------------------------------------------------------

/// Upgrade `name`. Only the fishing rod can be upgraded. Returns the cost.
pub fn upgrade(account: &mut Account, name: &str) -> Result<i64, EconomyError> {
    if !name.trim().eq_ignore_ascii_case(FISHING_ROD) {
        return Err(EconomyError::not_found("upgrade", name.trim()));
    }
    if !account.holds(FISHING_ROD) {
        return Err(EconomyError::unmet(format!("requires a {FISHING_ROD}")));
    }
    if account.holds(UPGRADED_FISHING_ROD) {
        return Err(EconomyError::unmet("fishing rod is already upgraded"));
    }
    EconomyError::require_funds(ROD_UPGRADE_COST, account.wallet)?;

    account.wallet = account.wallet.saturating_sub(ROD_UPGRADE_COST);
    account.remove_item(FISHING_ROD);
    account.add_item(UPGRADED_FISHING_ROD);
    Ok(ROD_UPGRADE_COST)
}

/// What using an item did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseEffect {
    /// An Energy Drink was consumed; the `work` cooldown is cleared.
    WorkCooldownReset,
    /// Medkits only act when a robbery fails. Nothing was consumed.
    Passive,
    /// The item has no active use. Nothing was consumed.
    NoEffect {
        /// The held item.
        item: String,
    },
}

/// Use one held item.
///
/// Clearing the cooldown is left to the caller, which owns the cooldown
/// book.
pub fn use_item(account: &mut Account, name: &str) -> Result<UseEffect, EconomyError> {
    let wanted = name.trim();
    let held = account
        .inventory
        .iter()
        .find(|item| item.eq_ignore_ascii_case(wanted))
        .cloned()
        .ok_or_else(|| EconomyError::unmet(format!("you don't have a {wanted}")))?;

    if held.eq_ignore_ascii_case(ENERGY_DRINK) {
        account.remove_item(ENERGY_DRINK);
        Ok(UseEffect::WorkCooldownReset)
    } else if held.eq_ignore_ascii_case(MEDKIT) {
        Ok(UseEffect::Passive)
    } else {
        Ok(UseEffect::NoEffect { item: held })
    }
}
