//! Steady income: work, daily, beg, explore, and paycheck.

use chrono::{DateTime, Utc};

use coffer_types::{Account, Activity, Pet};

use super::{ActionOutcome, OutcomeDetail, Prize, award_from};
use crate::catalog::{job_info, pet_bonus};
use crate::dice::Dice;
use crate::error::EconomyError;
use crate::progression::{ProgressionTrack, WORK_XP, apply_xp, continue_streak};

/// Smallest `work` payout.
pub const WORK_MIN: i64 = 50;
/// Largest `work` payout.
pub const WORK_MAX: i64 = 200;
/// Fixed part of the daily reward.
pub const DAILY_BASE: i64 = 1000;
/// Daily reward added per streak day.
pub const DAILY_PER_STREAK_DAY: i64 = 100;

const BEG_TABLE: [(&str, Prize); 4] = [
    ("kind stranger", Prize::Coins { min: 10, max: 50 }),
    ("ignored", Prize::Nothing),
    ("moved along", Prize::Nothing),
    ("coins on the ground", Prize::Coins { min: 20, max: 70 }),
];

const EXPLORE_TABLE: [(&str, Prize); 5] = [
    ("hidden cave", Prize::Coins { min: 200, max: 500 }),
    ("Old Relic", Prize::Item("Old Relic")),
    ("nothing", Prize::Nothing),
    ("Rare Pelt", Prize::Item("Rare Pelt")),
    ("forgotten chest", Prize::Coins { min: 300, max: 700 }),
];

/// Work a shift: 50 to 200 coins (Dog +5%) and command-track XP.
pub fn work(account: &mut Account, dice: &mut dyn Dice) -> ActionOutcome {
    let earned = pet_bonus(account.pet, Pet::Dog, dice.between(WORK_MIN, WORK_MAX));
    let mut outcome = ActionOutcome::new(Activity::Work, OutcomeDetail::Paid);
    outcome.pay(account, earned);
    outcome.levels_gained = apply_xp(account, ProgressionTrack::Command, WORK_XP).levels_gained;
    outcome
}

/// Claim the daily reward: `1000 + 100 × streak` (Cat +3%).
///
/// A second claim on the same UTC day is refused as on cooldown until the
/// next day begins.
pub fn daily(account: &mut Account, now: DateTime<Utc>) -> Result<ActionOutcome, EconomyError> {
    let today = now.date_naive();
    if account.last_daily == Some(today) {
        let remaining = today
            .succ_opt()
            .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
            .and_then(|midnight| midnight.and_utc().signed_duration_since(now).to_std().ok())
            .unwrap_or_default();
        return Err(EconomyError::OnCooldown {
            activity: Activity::Daily,
            remaining,
        });
    }

    let streak = continue_streak(account.daily_streak, account.last_daily, today);
    let streak_bonus = DAILY_PER_STREAK_DAY.saturating_mul(i64::from(streak));
    let total = pet_bonus(account.pet, Pet::Cat, DAILY_BASE.saturating_add(streak_bonus));

    account.daily_streak = streak;
    account.last_daily = Some(today);

    let mut outcome = ActionOutcome::new(
        Activity::Daily,
        OutcomeDetail::Daily {
            streak,
            base: DAILY_BASE,
            streak_bonus,
        },
    );
    outcome.pay(account, total);
    Ok(outcome)
}

/// Beg: one of four equally likely outcomes, two paying coins (Parrot +2%).
pub fn beg(account: &mut Account, dice: &mut dyn Dice) -> ActionOutcome {
    award_from(Activity::Beg, &BEG_TABLE, account, dice, Some(Pet::Parrot))
}

/// Explore: coins, a relic, a pelt, or nothing.
pub fn explore(account: &mut Account, dice: &mut dyn Dice) -> ActionOutcome {
    award_from(Activity::Explore, &EXPLORE_TABLE, account, dice, None)
}

/// Collect a paycheck from the current job.
pub fn paycheck(account: &mut Account, dice: &mut dyn Dice) -> Result<ActionOutcome, EconomyError> {
    let job = account
        .job
        .ok_or_else(|| EconomyError::unmet("requires a job"))?;
    let terms = job_info(job);
    let mut outcome = ActionOutcome::new(Activity::Paycheck, OutcomeDetail::Paid);
    outcome.pay(account, dice.between(terms.payout_min, terms.payout_max));
    Ok(outcome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use coffer_types::Job;

    use super::*;
    use crate::dice::LoadedDice;

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn work_pays_and_grants_xp() {
        let mut account = Account::default();
        let mut dice = LoadedDice::new(0).with_amounts([120]);
        let outcome = work(&mut account, &mut dice);
        assert_eq!(outcome.wallet_delta, 120);
        assert_eq!(account.wallet, 220);
        assert_eq!(account.xp, 10);
    }

    #[test]
    fn dog_boosts_work() {
        let mut account = Account {
            pet: Some(Pet::Dog),
            ..Account::default()
        };
        let mut dice = LoadedDice::new(0).with_amounts([200]);
        assert_eq!(work(&mut account, &mut dice).wallet_delta, 210);
    }

    #[test]
    fn work_can_level_on_command_track() {
        let mut account = Account {
            xp: 145,
            ..Account::default()
        };
        let mut dice = LoadedDice::new(0).with_amounts([50]);
        assert_eq!(work(&mut account, &mut dice).levels_gained, 1);
        assert_eq!(account.level, 2);
    }

    #[test]
    fn first_daily_pays_base_plus_one_day() {
        let mut account = Account::default();
        let outcome = daily(&mut account, noon(2024, 3, 1)).unwrap();
        assert_eq!(outcome.wallet_delta, 1100);
        assert_eq!(account.daily_streak, 1);
        assert_eq!(account.last_daily, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn consecutive_daily_grows_streak_with_cat_bonus() {
        let mut account = Account {
            daily_streak: 4,
            last_daily: NaiveDate::from_ymd_opt(2024, 2, 29),
            pet: Some(Pet::Cat),
            ..Account::default()
        };
        let outcome = daily(&mut account, noon(2024, 3, 1)).unwrap();
        // (1000 + 500) * 103 / 100
        assert_eq!(outcome.wallet_delta, 1545);
        assert_eq!(account.daily_streak, 5);
    }

    #[test]
    fn same_day_daily_is_refused() {
        let mut account = Account {
            daily_streak: 2,
            last_daily: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Account::default()
        };
        let result = daily(&mut account, noon(2024, 3, 1));
        match result {
            Err(EconomyError::OnCooldown { remaining, .. }) => {
                assert_eq!(remaining.as_secs(), 12 * 60 * 60);
            }
            other => panic!("expected cooldown, got {other:?}"),
        }
        assert_eq!(account.wallet, 100);
    }

    #[test]
    fn beg_nothing_branches_pay_nothing() {
        let mut account = Account::default();
        let mut dice = LoadedDice::new(0).with_picks([1, 2]);
        assert_eq!(beg(&mut account, &mut dice).wallet_delta, 0);
        assert_eq!(beg(&mut account, &mut dice).wallet_delta, 0);
        assert_eq!(account.wallet, 100);
    }

    #[test]
    fn parrot_boosts_begging() {
        let mut account = Account {
            pet: Some(Pet::Parrot),
            ..Account::default()
        };
        let mut dice = LoadedDice::new(0).with_picks([3]).with_amounts([70]);
        assert_eq!(beg(&mut account, &mut dice).wallet_delta, 71);
    }

    #[test]
    fn explore_can_find_items() {
        let mut account = Account::default();
        let mut dice = LoadedDice::new(0).with_picks([3]);
        let outcome = explore(&mut account, &mut dice);
        assert_eq!(outcome.items_gained, vec!["Rare Pelt".to_owned()]);
        assert!(account.holds("rare pelt"));
    }

    #[test]
    fn paycheck_requires_job() {
        let mut account = Account::default();
        let mut dice = LoadedDice::new(0);
        assert!(matches!(
            paycheck(&mut account, &mut dice),
            Err(EconomyError::PrerequisiteUnmet { .. })
        ));
        assert_eq!(account.wallet, 100);
    }

    #[test]
    fn paycheck_pays_within_job_range() {
        let mut account = Account {
            job: Some(Job::Gamer),
            ..Account::default()
        };
        let mut dice = LoadedDice::new(11);
        let paid = paycheck(&mut account, &mut dice).unwrap().wallet_delta;
        assert!((100..=300).contains(&paid));
    }
}
