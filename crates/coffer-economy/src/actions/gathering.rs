//! Tool-gated gathering: fish, upgraded fish, hunt, dig, and mine.
//!
//! Every activity here requires one tool in the inventory and draws one
//! entry uniformly from its table. Tools are never consumed.

use coffer_types::{Account, Activity};

use super::{ActionOutcome, Prize, award_from, require_item};
use crate::catalog::{FISHING_ROD, HUNTING_RIFLE, PICKAXE, SHOVEL, UPGRADED_FISHING_ROD};
use crate::dice::Dice;
use crate::error::EconomyError;

const FISH_TABLE: [(&str, Prize); 6] = [
    ("Salmon", Prize::Item("Salmon")),
    ("Tuna", Prize::Item("Tuna")),
    ("Cod", Prize::Item("Cod")),
    ("Sardine", Prize::Item("Sardine")),
    ("Old Boot", Prize::Item("Old Boot")),
    ("Shiny Bracelet", Prize::Item("Shiny Bracelet")),
];

const UPGRADED_FISH_TABLE: [(&str, Prize); 5] = [
    ("Rare Salmon", Prize::Item("Rare Salmon")),
    ("Giant Tuna", Prize::Item("Giant Tuna")),
    ("Deep Sea Cod", Prize::Item("Deep Sea Cod")),
    ("Golden Fish", Prize::Item("Golden Fish")),
    ("Diamond Ring", Prize::Item("Diamond Ring")),
];

const HUNT_REWARD: Prize = Prize::Coins { min: 50, max: 250 };

const HUNT_TABLE: [(&str, Prize); 6] = [
    ("Rabbit", HUNT_REWARD),
    ("Deer", HUNT_REWARD),
    ("Boar", HUNT_REWARD),
    ("Fox", HUNT_REWARD),
    ("Squirrel", HUNT_REWARD),
    ("Rare Pelt", Prize::Item("Rare Pelt")),
];

const DIG_TABLE: [(&str, Prize); 4] = [
    ("nothing", Prize::Nothing),
    ("coins", Prize::Coins { min: 30, max: 80 }),
    ("Old Relic", Prize::Item("Old Relic")),
    ("Rare Gem", Prize::Item("Rare Gem")),
];

const MINE_TABLE: [(&str, Prize); 5] = [
    ("Stone", Prize::Nothing),
    ("Iron Ore", Prize::Item("Iron Ore")),
    ("Copper Ore", Prize::Item("Copper Ore")),
    ("Gold Ore", Prize::Item("Gold Ore")),
    ("Diamond", Prize::Item("Diamond")),
];

/// Go fishing with a basic rod.
pub fn fish(account: &mut Account, dice: &mut dyn Dice) -> Result<ActionOutcome, EconomyError> {
    require_item(account, FISHING_ROD)?;
    Ok(award_from(Activity::Fish, &FISH_TABLE, account, dice, None))
}

/// Go fishing with an upgraded rod for rarer catches.
pub fn upgraded_fish(account: &mut Account, dice: &mut dyn Dice) -> Result<ActionOutcome, EconomyError> {
    require_item(account, UPGRADED_FISHING_ROD)?;
    Ok(award_from(
        Activity::UpgradedFish,
        &UPGRADED_FISH_TABLE,
        account,
        dice,
        None,
    ))
}

/// Go hunting. Game pays coins; a pelt is kept.
pub fn hunt(account: &mut Account, dice: &mut dyn Dice) -> Result<ActionOutcome, EconomyError> {
    require_item(account, HUNTING_RIFLE)?;
    Ok(award_from(Activity::Hunt, &HUNT_TABLE, account, dice, None))
}

/// Dig for treasure.
pub fn dig(account: &mut Account, dice: &mut dyn Dice) -> Result<ActionOutcome, EconomyError> {
    require_item(account, SHOVEL)?;
    Ok(award_from(Activity::Dig, &DIG_TABLE, account, dice, None))
}

/// Mine for ore and gems. Stone is worthless and not kept.
pub fn mine(account: &mut Account, dice: &mut dyn Dice) -> Result<ActionOutcome, EconomyError> {
    require_item(account, PICKAXE)?;
    Ok(award_from(Activity::Mine, &MINE_TABLE, account, dice, None))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::actions::OutcomeDetail;
    use crate::dice::LoadedDice;

    fn holding(item: &str) -> Account {
        let mut account = Account::default();
        account.add_item(item);
        account
    }

    #[test]
    fn fishing_without_rod_is_unmet_and_untouched() {
        let mut account = Account::default();
        let before = account.clone();
        let mut dice = LoadedDice::new(0);
        assert!(matches!(
            fish(&mut account, &mut dice),
            Err(EconomyError::PrerequisiteUnmet { .. })
        ));
        assert_eq!(account, before);
    }

    #[test]
    fn fishing_keeps_the_catch() {
        let mut account = holding(FISHING_ROD);
        let mut dice = LoadedDice::new(0).with_picks([4]);
        let outcome = fish(&mut account, &mut dice).unwrap();
        assert_eq!(outcome.detail, OutcomeDetail::Drew { entry: "Old Boot" });
        assert!(account.holds("Old Boot"));
        assert!(account.holds(FISHING_ROD));
    }

    #[test]
    fn basic_rod_does_not_unlock_upgraded_fishing() {
        let mut account = holding(FISHING_ROD);
        let mut dice = LoadedDice::new(0);
        assert!(upgraded_fish(&mut account, &mut dice).is_err());
    }

    #[test]
    fn upgraded_rod_catches_rarities() {
        let mut account = holding(UPGRADED_FISHING_ROD);
        let mut dice = LoadedDice::new(0).with_picks([3]);
        let outcome = upgraded_fish(&mut account, &mut dice).unwrap();
        assert_eq!(outcome.items_gained, vec!["Golden Fish".to_owned()]);
    }

    #[test]
    fn hunting_game_pays_coins() {
        let mut account = holding(HUNTING_RIFLE);
        let mut dice = LoadedDice::new(0).with_picks([1]).with_amounts([180]);
        let outcome = hunt(&mut account, &mut dice).unwrap();
        assert_eq!(outcome.wallet_delta, 180);
        assert!(outcome.items_gained.is_empty());
    }

    #[test]
    fn hunting_pelt_is_kept() {
        let mut account = holding(HUNTING_RIFLE);
        let mut dice = LoadedDice::new(0).with_picks([5]);
        let outcome = hunt(&mut account, &mut dice).unwrap();
        assert_eq!(outcome.wallet_delta, 0);
        assert!(account.holds("Rare Pelt"));
    }

    #[test]
    fn digging_can_come_up_empty() {
        let mut account = holding(SHOVEL);
        let before = account.clone();
        let mut dice = LoadedDice::new(0).with_picks([0]);
        let outcome = dig(&mut account, &mut dice).unwrap();
        assert_eq!(outcome.detail, OutcomeDetail::Drew { entry: "nothing" });
        assert_eq!(account, before);
    }

    #[test]
    fn mining_stone_is_not_kept() {
        let mut account = holding(PICKAXE);
        let mut dice = LoadedDice::new(0).with_picks([0, 4]);
        assert!(mine(&mut account, &mut dice).unwrap().items_gained.is_empty());
        mine(&mut account, &mut dice).unwrap();
        assert!(account.holds("diamond"));
    }
}
