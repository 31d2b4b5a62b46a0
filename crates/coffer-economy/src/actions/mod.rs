//! Activity resolvers.
//!
//! Each gated activity is a pure function over the working copies of the
//! accounts it touches plus a [`Dice`]. A resolver first checks its
//! prerequisites and only mutates once they hold, so an `Err` always means
//! the working copy is untouched. Cooldown checks, persistence, and
//! cooldown stamping are done by the caller around [`resolve`] inside one
//! ledger critical section.
//!
//! # Submodules
//!
//! - [`earning`] -- work, daily, beg, explore, paycheck
//! - [`gathering`] -- fish, upgraded fish, hunt, dig, mine
//! - [`risk`] -- hack, crime, rob
//! - [`gambling`] -- slots, coinflip, gamble

pub mod earning;
pub mod gambling;
pub mod gathering;
pub mod risk;

use chrono::{DateTime, Utc};

use coffer_ledger::LockedAccounts;
use coffer_types::{Account, Activity, CoinFace, Pet, UserId};

use crate::catalog::pet_bonus;
use crate::dice::Dice;
use crate::error::EconomyError;

// ---------------------------------------------------------------------------
// ActionRequest
// ---------------------------------------------------------------------------

/// A request to perform one gated activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionRequest {
    /// Work a shift.
    Work,
    /// Claim the daily reward.
    Daily,
    /// Fish with a basic rod.
    Fish,
    /// Fish with an upgraded rod.
    UpgradedFish,
    /// Hunt with a rifle.
    Hunt,
    /// Dig with a shovel.
    Dig,
    /// Mine with a pickaxe.
    Mine,
    /// Hack with a laptop.
    Hack,
    /// Rob another account's wallet.
    Rob {
        /// The account to rob.
        target: UserId,
    },
    /// Commit a crime.
    Crime,
    /// Beg for coins.
    Beg,
    /// Explore the wilderness.
    Explore,
    /// Collect a paycheck from the current job.
    Paycheck,
    /// Spin the slot machine.
    Slots {
        /// Coins wagered.
        bet: i64,
    },
    /// Bet on a coin toss.
    Coinflip {
        /// Coins wagered.
        bet: i64,
        /// Called face. `None` lets the coin choose for the player.
        call: Option<CoinFace>,
    },
    /// Double or nothing.
    Gamble {
        /// Coins wagered.
        bet: i64,
    },
}

impl ActionRequest {
    /// The activity this request performs.
    pub const fn activity(&self) -> Activity {
        match self {
            Self::Work => Activity::Work,
            Self::Daily => Activity::Daily,
            Self::Fish => Activity::Fish,
            Self::UpgradedFish => Activity::UpgradedFish,
            Self::Hunt => Activity::Hunt,
            Self::Dig => Activity::Dig,
            Self::Mine => Activity::Mine,
            Self::Hack => Activity::Hack,
            Self::Rob { .. } => Activity::Rob,
            Self::Crime => Activity::Crime,
            Self::Beg => Activity::Beg,
            Self::Explore => Activity::Explore,
            Self::Paycheck => Activity::Paycheck,
            Self::Slots { .. } => Activity::Slots,
            Self::Coinflip { .. } => Activity::Coinflip,
            Self::Gamble { .. } => Activity::Gamble,
        }
    }

    /// Every account the request reads or writes, `actor` first.
    pub fn accounts(&self, actor: UserId) -> Vec<UserId> {
        match self {
            Self::Rob { target } => vec![actor, *target],
            _ => vec![actor],
        }
    }
}

// ---------------------------------------------------------------------------
// ActionOutcome
// ---------------------------------------------------------------------------

/// Activity-specific detail of a resolved action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeDetail {
    /// A plain payout (work, paycheck).
    Paid,
    /// The daily reward was claimed.
    Daily {
        /// Streak after this claim.
        streak: u32,
        /// Fixed part of the reward.
        base: i64,
        /// Streak part of the reward.
        streak_bonus: i64,
    },
    /// The named entry of the activity's outcome table came up.
    Drew {
        /// Which entry (`"Salmon"`, `"heist"`, `"nothing"`, ...).
        entry: &'static str,
    },
    /// A robbery succeeded.
    Stole {
        /// The robbed account.
        victim: UserId,
    },
    /// A robbery failed.
    Caught {
        /// The account that was targeted.
        victim: UserId,
        /// Fine drawn (zero when a Medkit waived it).
        fine: i64,
        /// Whether a Medkit was consumed to waive the fine.
        medkit_used: bool,
    },
    /// The slot machine stopped.
    Slots {
        /// Symbols on the three reels, left to right.
        reels: [&'static str; 3],
    },
    /// The coin landed.
    Coinflip {
        /// The face the player called.
        call: CoinFace,
        /// The face that came up.
        landed: CoinFace,
    },
    /// Double or nothing resolved.
    Gamble {
        /// Whether the bet was doubled.
        won: bool,
    },
    /// A trivia question was answered or ran out of time.
    Trivia {
        /// Whether the answer was accepted.
        correct: bool,
        /// Whether the answer window closed before an answer arrived.
        timed_out: bool,
        /// The expected answer.
        answer: &'static str,
    },
}

/// Structured result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// The activity performed.
    pub activity: Activity,
    /// Net change of the actor's wallet (negative for fines and losses).
    pub wallet_delta: i64,
    /// Items added to the actor's inventory.
    pub items_gained: Vec<String>,
    /// Items removed from the actor's inventory.
    pub items_consumed: Vec<String>,
    /// Levels the actor gained.
    pub levels_gained: u32,
    /// Activity-specific detail.
    pub detail: OutcomeDetail,
}

impl ActionOutcome {
    /// An outcome with no effects yet.
    pub const fn new(activity: Activity, detail: OutcomeDetail) -> Self {
        Self {
            activity,
            wallet_delta: 0,
            items_gained: Vec::new(),
            items_consumed: Vec::new(),
            levels_gained: 0,
            detail,
        }
    }

    /// Credit (or, if negative, debit) `amount` to `account` and record it.
    pub(crate) fn pay(&mut self, account: &mut Account, amount: i64) {
        account.wallet = account.wallet.saturating_add(amount);
        self.wallet_delta = self.wallet_delta.saturating_add(amount);
    }

    /// Give `item` to `account` and record it.
    pub(crate) fn grant(&mut self, account: &mut Account, item: &str) {
        account.add_item(item);
        self.items_gained.push(item.to_owned());
    }

    /// Take one `item` from `account` and record it.
    pub(crate) fn consume(&mut self, account: &mut Account, item: &str) -> bool {
        let removed = account.remove_item(item);
        if removed {
            self.items_consumed.push(item.to_owned());
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Inputs shared by every resolver.
pub struct Resolution<'a> {
    /// The acting account.
    pub actor: UserId,
    /// Invocation time.
    pub now: DateTime<Utc>,
    /// Random source.
    pub dice: &'a mut dyn Dice,
}

impl core::fmt::Debug for Resolution<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Resolution")
            .field("actor", &self.actor)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

/// Run the resolver for `request` against the working copies in `section`.
pub fn resolve(
    request: ActionRequest,
    resolution: &mut Resolution<'_>,
    section: &mut LockedAccounts<'_>,
) -> Result<ActionOutcome, EconomyError> {
    let actor = resolution.actor;
    let dice = &mut *resolution.dice;

    if let ActionRequest::Rob { target } = request {
        if target == actor {
            return Err(EconomyError::invalid("you cannot rob yourself"));
        }
        let (thief, victim) = section.pair_mut(actor, target)?;
        return risk::rob(thief, victim, target, dice);
    }

    let account = section.account_mut(actor)?;
    match request {
        ActionRequest::Work => Ok(earning::work(account, dice)),
        ActionRequest::Daily => earning::daily(account, resolution.now),
        ActionRequest::Beg => Ok(earning::beg(account, dice)),
        ActionRequest::Explore => Ok(earning::explore(account, dice)),
        ActionRequest::Paycheck => earning::paycheck(account, dice),
        ActionRequest::Fish => gathering::fish(account, dice),
        ActionRequest::UpgradedFish => gathering::upgraded_fish(account, dice),
        ActionRequest::Hunt => gathering::hunt(account, dice),
        ActionRequest::Dig => gathering::dig(account, dice),
        ActionRequest::Mine => gathering::mine(account, dice),
        ActionRequest::Hack => risk::hack(account, dice),
        ActionRequest::Crime => risk::crime(account, dice),
        ActionRequest::Slots { bet } => gambling::slots(account, bet, dice),
        ActionRequest::Coinflip { bet, call } => gambling::coinflip(account, bet, call, dice),
        ActionRequest::Gamble { bet } => gambling::gamble(account, bet, dice),
        ActionRequest::Rob { .. } => Err(EconomyError::invalid("rob needs a target")),
    }
}

/// Draw one entry of `table` uniformly.
pub(crate) fn draw<T: Copy>(table: &[T], dice: &mut dyn Dice) -> Option<T> {
    table.get(dice.pick(table.len())).copied()
}

// ---------------------------------------------------------------------------
// Prize tables
// ---------------------------------------------------------------------------

/// What one entry of an outcome table pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prize {
    /// Nothing at all.
    Nothing,
    /// A uniform coin amount in `min..=max`.
    Coins {
        /// Smallest amount.
        min: i64,
        /// Largest amount.
        max: i64,
    },
    /// One copy of an item.
    Item(&'static str),
}

/// Draw from a labelled prize table and apply the prize to `account`.
///
/// Coin prizes get `boost`'s pet bonus when the account owns that pet.
pub(crate) fn award_from(
    activity: Activity,
    table: &[(&'static str, Prize)],
    account: &mut Account,
    dice: &mut dyn Dice,
    boost: Option<Pet>,
) -> ActionOutcome {
    let (entry, prize) = draw(table, dice).unwrap_or(("nothing", Prize::Nothing));
    let mut outcome = ActionOutcome::new(activity, OutcomeDetail::Drew { entry });
    match prize {
        Prize::Nothing => {}
        Prize::Coins { min, max } => {
            let drawn = dice.between(min, max);
            let amount = boost.map_or(drawn, |pet| pet_bonus(account.pet, pet, drawn));
            outcome.pay(account, amount);
        }
        Prize::Item(item) => outcome.grant(account, item),
    }
    outcome
}

/// Fail with [`EconomyError::PrerequisiteUnmet`] unless `account` holds
/// `item`.
pub(crate) fn require_item(account: &Account, item: &str) -> Result<(), EconomyError> {
    if account.holds(item) {
        Ok(())
    } else {
        Err(EconomyError::unmet(format!("requires a {item}")))
    }
}
