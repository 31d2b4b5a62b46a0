//! Wagers: slots, coinflip, and double-or-nothing.
//!
//! The bet must be positive and covered by the wallet. A loss debits
//! exactly the bet.

use coffer_types::{Account, Activity, CoinFace};

use super::{ActionOutcome, OutcomeDetail, draw};
use crate::dice::Dice;
use crate::error::EconomyError;

/// Symbols on each slot reel.
pub const REEL: [&str; 5] = ["cherry", "bell", "money bag", "diamond", "lemon"];

const FACES: [CoinFace; 2] = [CoinFace::Heads, CoinFace::Tails];

fn check_bet(account: &Account, bet: i64) -> Result<(), EconomyError> {
    if bet <= 0 {
        return Err(EconomyError::invalid("bet must be positive"));
    }
    EconomyError::require_funds(bet, account.wallet)
}

fn spin(dice: &mut dyn Dice) -> &'static str {
    draw(&REEL, dice).unwrap_or("lemon")
}

fn toss(dice: &mut dyn Dice) -> CoinFace {
    draw(&FACES, dice).unwrap_or(CoinFace::Heads)
}

/// Spin three reels.
///
/// Three of a kind pays 3× the bet. Two adjacent matching reels pay 1.5×,
/// floored. Anything else loses the bet.
pub fn slots(account: &mut Account, bet: i64, dice: &mut dyn Dice) -> Result<ActionOutcome, EconomyError> {
    check_bet(account, bet)?;

    let reels = [spin(dice), spin(dice), spin(dice)];
    let [left, middle, right] = reels;
    let delta = if left == middle && middle == right {
        bet.saturating_mul(3)
    } else if left == middle || middle == right {
        bet.saturating_mul(3).checked_div(2).unwrap_or(bet)
    } else {
        bet.saturating_neg()
    };

    let mut outcome = ActionOutcome::new(Activity::Slots, OutcomeDetail::Slots { reels });
    outcome.pay(account, delta);
    Ok(outcome)
}

/// Call a coin toss. With no call, the coin picks one for the player.
pub fn coinflip(
    account: &mut Account,
    bet: i64,
    call: Option<CoinFace>,
    dice: &mut dyn Dice,
) -> Result<ActionOutcome, EconomyError> {
    check_bet(account, bet)?;

    let call = call.unwrap_or_else(|| toss(dice));
    let landed = toss(dice);
    let delta = if call == landed { bet } else { bet.saturating_neg() };

    let mut outcome = ActionOutcome::new(Activity::Coinflip, OutcomeDetail::Coinflip { call, landed });
    outcome.pay(account, delta);
    Ok(outcome)
}

/// Double or nothing at even odds.
pub fn gamble(account: &mut Account, bet: i64, dice: &mut dyn Dice) -> Result<ActionOutcome, EconomyError> {
    check_bet(account, bet)?;

    let won = dice.pick(2) == 0;
    let delta = if won { bet } else { bet.saturating_neg() };

    let mut outcome = ActionOutcome::new(Activity::Gamble, OutcomeDetail::Gamble { won });
    outcome.pay(account, delta);
    Ok(outcome)
}
