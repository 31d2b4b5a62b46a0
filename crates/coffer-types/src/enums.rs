//! Enumeration types shared across the workspace.
//!
//! Names parse case-insensitively. Pets and jobs persist under their
//! display names (`"Dog"`, `"Programmer"`) so existing ledger documents keep
//! loading.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A name did not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {name}")]
pub struct ParseNameError {
    /// What was being parsed (`"pet"`, `"job"`, ...).
    pub kind: &'static str,
    /// The rejected input.
    pub name: String,
}

impl ParseNameError {
    fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pet
// ---------------------------------------------------------------------------

/// Companion animal. An account holds at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pet {
    /// Boosts `work` earnings.
    Dog,
    /// Boosts the `daily` reward.
    Cat,
    /// Boosts coins found while begging.
    Parrot,
}

impl Pet {
    /// Every pet, in catalog order.
    pub const ALL: [Self; 3] = [Self::Dog, Self::Cat, Self::Parrot];

    /// Display name, also the persisted form.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dog => "Dog",
            Self::Cat => "Cat",
            Self::Parrot => "Parrot",
        }
    }
}

impl FromStr for Pet {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|pet| pet.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseNameError::new("pet", wanted))
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// Profession enabling the `paycheck` activity. An account holds at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Job {
    /// Highest payout, longest cooldown.
    Programmer,
    /// Mid-range payout.
    Chef,
    /// Lowest payout, shortest cooldown.
    Gamer,
}

impl Job {
    /// Every job, in catalog order.
    pub const ALL: [Self; 3] = [Self::Programmer, Self::Chef, Self::Gamer];

    /// Display name, also the persisted form.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Programmer => "Programmer",
            Self::Chef => "Chef",
            Self::Gamer => "Gamer",
        }
    }
}

impl FromStr for Job {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|job| job.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseNameError::new("job", wanted))
    }
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// A gated activity handled by the action resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Regular shift, small payout plus command-track XP.
    Work,
    /// Once-a-day reward with streak bonus.
    Daily,
    /// Catch a fish (needs a Fishing Rod).
    Fish,
    /// Catch a rare fish (needs an Upgraded Fishing Rod).
    UpgradedFish,
    /// Hunt game (needs a Hunting Rifle).
    Hunt,
    /// Dig for treasure (needs a Shovel).
    Dig,
    /// Mine minerals (needs a Pickaxe).
    Mine,
    /// Hack a server (needs a Laptop).
    Hack,
    /// Steal from another account's wallet.
    Rob,
    /// Commit a serious crime (needs level 5).
    Crime,
    /// Ask strangers for coins.
    Beg,
    /// Wander the wilderness.
    Explore,
    /// Answer a trivia question.
    Trivia,
    /// Collect a job's pay.
    Paycheck,
    /// Three-reel slot machine.
    Slots,
    /// Bet on a coin toss.
    Coinflip,
    /// Double-or-nothing.
    Gamble,
}

impl Activity {
    /// Every activity.
    pub const ALL: [Self; 17] = [
        Self::Work,
        Self::Daily,
        Self::Fish,
        Self::UpgradedFish,
        Self::Hunt,
        Self::Dig,
        Self::Mine,
        Self::Hack,
        Self::Rob,
        Self::Crime,
        Self::Beg,
        Self::Explore,
        Self::Trivia,
        Self::Paycheck,
        Self::Slots,
        Self::Coinflip,
        Self::Gamble,
    ];

    /// Canonical command name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Daily => "daily",
            Self::Fish => "fish",
            Self::UpgradedFish => "upgraded_fish",
            Self::Hunt => "hunt",
            Self::Dig => "dig",
            Self::Mine => "mine",
            Self::Hack => "hack",
            Self::Rob => "rob",
            Self::Crime => "crime",
            Self::Beg => "beg",
            Self::Explore => "explore",
            Self::Trivia => "trivia",
            Self::Paycheck => "paycheck",
            Self::Slots => "slots",
            Self::Coinflip => "coinflip",
            Self::Gamble => "gamble",
        }
    }

    /// Short command aliases accepted alongside the canonical name.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Work => &["wrk"],
            Self::Daily => &["dly"],
            Self::Fish => &["fsh"],
            Self::UpgradedFish => &["upgfish"],
            Self::Hunt => &["hnt"],
            Self::Dig => &["dg"],
            Self::Mine => &["mn"],
            Self::Hack => &["hk"],
            Self::Rob => &["rb"],
            Self::Crime => &["crm"],
            Self::Beg => &[],
            Self::Explore => &["exp"],
            Self::Trivia => &["triv"],
            Self::Paycheck => &["collect"],
            Self::Slots => &["bet"],
            Self::Coinflip => &["cf"],
            Self::Gamble => &["gbl"],
        }
    }
}

impl core::fmt::Display for Activity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activity {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|activity| {
                activity.name().eq_ignore_ascii_case(wanted)
                    || activity
                        .aliases()
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| ParseNameError::new("activity", wanted))
    }
}

// ---------------------------------------------------------------------------
// CoinFace
// ---------------------------------------------------------------------------

/// One side of a coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoinFace {
    /// Heads (`h`).
    Heads,
    /// Tails (`t`).
    Tails,
}

impl FromStr for CoinFace {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "heads" => Ok(Self::Heads),
            "t" | "tails" => Ok(Self::Tails),
            other => Err(ParseNameError::new("coin face", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// LeaderboardKey
// ---------------------------------------------------------------------------

/// Field the leaderboard ranks accounts by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardKey {
    /// Liquid currency.
    #[default]
    Wallet,
    /// Banked currency.
    Bank,
    /// Progression level.
    Level,
}

impl FromStr for LeaderboardKey {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wallet" => Ok(Self::Wallet),
            "bank" => Ok(Self::Bank),
            "level" => Ok(Self::Level),
            other => Err(ParseNameError::new("leaderboard key", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pets_parse_case_insensitively() {
        assert_eq!("dog".parse::<Pet>().ok(), Some(Pet::Dog));
        assert_eq!(" PARROT ".parse::<Pet>().ok(), Some(Pet::Parrot));
        assert!("hamster".parse::<Pet>().is_err());
    }

    #[test]
    fn pet_persists_under_display_name() {
        let json = serde_json::to_string(&Pet::Cat).unwrap_or_default();
        assert_eq!(json, "\"Cat\"");
    }

    #[test]
    fn jobs_parse_case_insensitively() {
        assert_eq!("chef".parse::<Job>().ok(), Some(Job::Chef));
        assert!("astronaut".parse::<Job>().is_err());
    }

    #[test]
    fn activities_parse_names_and_aliases() {
        assert_eq!("Work".parse::<Activity>().ok(), Some(Activity::Work));
        assert_eq!("upgfish".parse::<Activity>().ok(), Some(Activity::UpgradedFish));
        assert_eq!("collect".parse::<Activity>().ok(), Some(Activity::Paycheck));
        assert_eq!("cf".parse::<Activity>().ok(), Some(Activity::Coinflip));
        assert!("dance".parse::<Activity>().is_err());
    }

    #[test]
    fn activity_names_round_trip() {
        for activity in Activity::ALL {
            assert_eq!(activity.name().parse::<Activity>().ok(), Some(activity));
        }
    }

    #[test]
    fn coin_faces_accept_short_and_long_forms() {
        assert_eq!("h".parse::<CoinFace>().ok(), Some(CoinFace::Heads));
        assert_eq!("Tails".parse::<CoinFace>().ok(), Some(CoinFace::Tails));
        assert!("edge".parse::<CoinFace>().is_err());
    }

    #[test]
    fn leaderboard_keys_parse() {
        assert_eq!("BANK".parse::<LeaderboardKey>().ok(), Some(LeaderboardKey::Bank));
        assert_eq!(" wallet".parse::<LeaderboardKey>().ok(), Some(LeaderboardKey::Wallet));
        assert_eq!("Level".parse::<LeaderboardKey>().ok(), Some(LeaderboardKey::Level));
        assert!("xp".parse::<LeaderboardKey>().is_err());
        assert!("networth".parse::<LeaderboardKey>().is_err());
    }
}
