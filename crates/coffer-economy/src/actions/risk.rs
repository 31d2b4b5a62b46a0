//! High-stakes activities: hack, crime, and rob.
//!
//! Each rolls a percentile and either pays out or fines the actor. Fines
//! may push the wallet negative.

use coffer_types::{Account, Activity, UserId};

use super::{ActionOutcome, OutcomeDetail, require_item};
use crate::catalog::{LAPTOP, MEDKIT};
use crate::dice::Dice;
use crate::error::EconomyError;

/// Level needed before `crime` is allowed.
pub const CRIME_MIN_LEVEL: u32 = 5;

/// Smallest victim wallet worth robbing.
pub const ROB_MIN_VICTIM_WALLET: i64 = 200;

/// Percent chance a robbery succeeds.
pub const ROB_SUCCESS_PCT: u32 = 40;

/// Percent chance a hack succeeds.
pub const HACK_SUCCESS_PCT: u32 = 60;

/// Hack with a laptop: win 300 to 800 or be fined 100 to 300.
pub fn hack(account: &mut Account, dice: &mut dyn Dice) -> Result<ActionOutcome, EconomyError> {
    require_item(account, LAPTOP)?;

    let (entry, amount) = if dice.percent() < HACK_SUCCESS_PCT {
        ("breached", dice.between(300, 800))
    } else {
        ("traced", dice.between(100, 300).saturating_neg())
    };
    let mut outcome = ActionOutcome::new(Activity::Hack, OutcomeDetail::Drew { entry });
    outcome.pay(account, amount);
    Ok(outcome)
}

/// Commit a crime. Requires level 5.
///
/// | Roll | Outcome |
/// |------|---------|
/// | 0..30 | heist, +1000 to 5000 |
/// | 30..60 | back alley, +500 to 1500 |
/// | 60..85 | caught, -300 to 800 |
/// | 85..100 | injured, -200 to 600 |
pub fn crime(account: &mut Account, dice: &mut dyn Dice) -> Result<ActionOutcome, EconomyError> {
    if account.level < CRIME_MIN_LEVEL {
        return Err(EconomyError::unmet(format!(
            "requires level {CRIME_MIN_LEVEL} (currently {})",
            account.level
        )));
    }

    let roll = dice.percent();
    let (entry, amount) = match roll {
        0..30 => ("heist", dice.between(1000, 5000)),
        30..60 => ("back alley", dice.between(500, 1500)),
        60..85 => ("caught", dice.between(300, 800).saturating_neg()),
        _ => ("injured", dice.between(200, 600).saturating_neg()),
    };
    let mut outcome = ActionOutcome::new(Activity::Crime, OutcomeDetail::Drew { entry });
    outcome.pay(account, amount);
    Ok(outcome)
}

/// Try to rob `victim_id`.
///
/// Success moves 20% to 50% of the victim's wallet to the thief. Failure
/// fines the thief 50 to 150, unless a Medkit is held, which is consumed
/// instead.
pub fn rob(
    thief: &mut Account,
    victim: &mut Account,
    victim_id: UserId,
    dice: &mut dyn Dice,
) -> Result<ActionOutcome, EconomyError> {
    if victim.wallet < ROB_MIN_VICTIM_WALLET {
        return Err(EconomyError::unmet(format!(
            "target needs at least {ROB_MIN_VICTIM_WALLET} coins in their wallet"
        )));
    }

    if dice.percent() < ROB_SUCCESS_PCT {
        let low = victim.wallet.checked_div(5).unwrap_or(0);
        let high = victim.wallet.checked_div(2).unwrap_or(0);
        let stolen = dice.between(low, high).min(victim.wallet);
        victim.wallet = victim.wallet.saturating_sub(stolen);

        let mut outcome = ActionOutcome::new(Activity::Rob, OutcomeDetail::Stole { victim: victim_id });
        outcome.pay(thief, stolen);
        return Ok(outcome);
    }

    let fine = dice.between(50, 150);
    let mut outcome = ActionOutcome::new(Activity::Rob, OutcomeDetail::Paid);
    let medkit_used = outcome.consume(thief, MEDKIT);
    if !medkit_used {
        outcome.pay(thief, fine.saturating_neg());
    }
    outcome.detail = OutcomeDetail::Caught {
        victim: victim_id,
        fine,
        medkit_used,
    };
    Ok(outcome)
}
