//! End-to-end flows through the [`Economy`] facade.
//!
//! Each test builds an economy over an in-memory ledger, a manual clock,
//! and loaded dice, then checks both the returned outcome and the state
//! that reached the store.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{TimeDelta, TimeZone, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;

use coffer_economy::{
    ActionRequest, Amount, Clock, Economy, EconomyError, LoadedDice, ManualClock, OutcomeDetail,
    SellScope, TransferOutcome, UseEffect,
};
use coffer_ledger::{AccountStore, Ledger, MemoryRatesStore, MemoryStore, RatesStore};
use coffer_types::{Account, Activity, Job, LeaderboardKey, UserId};

const ALICE: UserId = UserId(1);
const BOB: UserId = UserId(2);

struct Harness {
    economy: Arc<Economy>,
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
}

fn harness(accounts: impl IntoIterator<Item = (UserId, Account)>, dice: LoadedDice) -> Harness {
    let store = Arc::new(MemoryStore::with_accounts(accounts));
    let ledger = Arc::new(Ledger::open(Arc::clone(&store) as Arc<dyn AccountStore>).expect("open ledger"));
    let rates: Arc<dyn RatesStore> = Arc::new(MemoryRatesStore::default());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().unwrap(),
    ));
    let economy = Economy::new(ledger, rates)
        .with_dice(dice)
        .with_clock(Arc::clone(&clock) as Arc<dyn Clock>);
    Harness {
        economy: Arc::new(economy),
        store,
        clock,
    }
}

fn with_wallet(wallet: i64) -> Account {
    Account {
        wallet,
        ..Account::default()
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ensure_account_is_idempotent() {
    let h = harness([], LoadedDice::new(0));

    let first = h.economy.ensure_account(ALICE).await.unwrap();
    let stored = h.store.contents();
    let second = h.economy.ensure_account(ALICE).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.store.contents(), stored);
    assert_eq!(h.store.save_count(), 1);
    assert_eq!(first.wallet, 100);
    assert_eq!(first.level, 1);
}

#[tokio::test]
async fn balance_reports_command_track_progress() {
    let h = harness([(ALICE, Account { level: 3, ..Account::default() })], LoadedDice::new(0));
    let view = h.economy.balance(ALICE).await.unwrap();
    assert_eq!(view.level, 3);
    assert_eq!(view.xp_needed, 350);
}

#[tokio::test]
async fn resetting_an_unknown_account_is_not_found() {
    let h = harness([(ALICE, with_wallet(9000))], LoadedDice::new(0));
    assert!(matches!(
        h.economy.reset_account(BOB).await,
        Err(EconomyError::NotFound { kind: "account", .. })
    ));
    h.economy.reset_account(ALICE).await.unwrap();
    assert_eq!(h.economy.snapshot(ALICE).unwrap(), Account::default());
}

#[tokio::test]
async fn admin_wallet_adjustments_touch_existing_accounts_only() {
    let h = harness([(ALICE, with_wallet(100))], LoadedDice::new(0));

    assert_eq!(h.economy.add_money(ALICE, 250).await.unwrap(), 350);
    assert_eq!(h.economy.remove_money(ALICE, 500).await.unwrap(), -150);
    assert_eq!(h.store.contents().get(&ALICE).unwrap().wallet, -150);

    let saves = h.store.save_count();
    assert!(matches!(
        h.economy.add_money(BOB, 10).await,
        Err(EconomyError::NotFound { kind: "account", .. })
    ));
    assert!(matches!(
        h.economy.remove_money(BOB, 10).await,
        Err(EconomyError::NotFound { kind: "account", .. })
    ));
    assert!(h.economy.snapshot(BOB).is_none());
    assert_eq!(h.store.save_count(), saves);
}

#[tokio::test]
async fn failed_wallet_adjustment_leaves_the_ledger_unchanged() {
    let h = harness([(ALICE, with_wallet(100))], LoadedDice::new(0));
    h.store.fail_writes(true);

    assert!(matches!(
        h.economy.add_money(ALICE, 50).await,
        Err(EconomyError::StoreUnavailable(_))
    ));
    assert_eq!(h.economy.snapshot(ALICE).unwrap().wallet, 100);
}

// ---------------------------------------------------------------------------
// Cooldowns and prerequisites
// ---------------------------------------------------------------------------

#[tokio::test]
async fn work_is_gated_by_its_cooldown() {
    let h = harness([], LoadedDice::new(0).with_amounts([100, 100]));

    let outcome = h.economy.perform(ALICE, ActionRequest::Work).await.unwrap();
    assert_eq!(outcome.wallet_delta, 100);

    match h.economy.perform(ALICE, ActionRequest::Work).await {
        Err(EconomyError::OnCooldown { activity, remaining }) => {
            assert_eq!(activity, Activity::Work);
            assert_eq!(remaining.as_secs(), 30 * 60);
        }
        other => panic!("expected cooldown, got {other:?}"),
    }

    h.clock.advance(TimeDelta::minutes(30));
    h.economy.perform(ALICE, ActionRequest::Work).await.unwrap();
    assert_eq!(h.store.contents().get(&ALICE).unwrap().wallet, 300);
}

#[tokio::test]
async fn unmet_prerequisite_releases_the_cooldown() {
    let h = harness([], LoadedDice::new(0));

    assert!(matches!(
        h.economy.perform(ALICE, ActionRequest::Fish).await,
        Err(EconomyError::PrerequisiteUnmet { .. })
    ));
    assert_eq!(h.economy.cooldown_remaining(ALICE, Activity::Fish), None);
    // The account still exists after the rejected attempt.
    assert_eq!(h.store.contents().get(&ALICE), Some(&Account::default()));

    h.economy.buy(ALICE, "fishing rod").await.expect_err("cannot afford a rod");
    h.economy.deposit(ALICE, Amount::Exact(50)).await.unwrap();
    assert_eq!(h.economy.snapshot(ALICE).unwrap().bank, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_work_passes_the_cooldown_once() {
    let h = harness([], LoadedDice::new(3));

    let tasks = (0..16).map(|_| {
        let economy = Arc::clone(&h.economy);
        tokio::spawn(async move { economy.perform(ALICE, ActionRequest::Work).await })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let succeeded = results.iter().filter(|result| result.is_ok()).count();
    let cooling = results
        .iter()
        .filter(|result| matches!(result, Err(EconomyError::OnCooldown { .. })))
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(cooling, 15);
    assert_eq!(h.store.contents().get(&ALICE).unwrap().xp, 10);
}

#[tokio::test]
async fn failed_write_leaves_no_trace() {
    let h = harness([(ALICE, with_wallet(500))], LoadedDice::new(0));
    h.store.fail_writes(true);

    assert!(matches!(
        h.economy.perform(ALICE, ActionRequest::Work).await,
        Err(EconomyError::StoreUnavailable(_))
    ));
    assert_eq!(h.economy.snapshot(ALICE).unwrap().wallet, 500);
    assert_eq!(h.economy.cooldown_remaining(ALICE, Activity::Work), None);

    h.store.fail_writes(false);
    h.economy.perform(ALICE, ActionRequest::Work).await.unwrap();
}

#[tokio::test]
async fn daily_is_once_per_calendar_day() {
    let h = harness([], LoadedDice::new(0));

    let first = h.economy.perform(ALICE, ActionRequest::Daily).await.unwrap();
    assert_eq!(first.wallet_delta, 1100);
    assert!(h.economy.perform(ALICE, ActionRequest::Daily).await.is_err());

    h.clock.advance(TimeDelta::hours(24));
    let second = h.economy.perform(ALICE, ActionRequest::Daily).await.unwrap();
    assert_eq!(
        second.detail,
        OutcomeDetail::Daily {
            streak: 2,
            base: 1000,
            streak_bonus: 200,
        }
    );
}

#[tokio::test]
async fn paycheck_follows_the_job_cooldown() {
    let h = harness(
        [(ALICE, Account { job: Some(Job::Gamer), ..Account::default() })],
        LoadedDice::new(0),
    );
    h.economy.perform(ALICE, ActionRequest::Paycheck).await.unwrap();
    let remaining = h.economy.cooldown_remaining(ALICE, Activity::Paycheck).unwrap();
    assert_eq!(remaining.as_secs(), 1800);
}

// ---------------------------------------------------------------------------
// Rob
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forced_rob_steals_a_fifth_to_a_half() {
    let h = harness(
        [(ALICE, with_wallet(0)), (BOB, with_wallet(1000))],
        LoadedDice::new(17).with_percents([0]),
    );

    let outcome = h.economy.perform(ALICE, ActionRequest::Rob { target: BOB }).await.unwrap();
    assert_eq!(outcome.detail, OutcomeDetail::Stole { victim: BOB });
    assert!((200..=500).contains(&outcome.wallet_delta));

    let stored = h.store.contents();
    assert_eq!(stored.get(&ALICE).unwrap().wallet, outcome.wallet_delta);
    assert_eq!(stored.get(&BOB).unwrap().wallet, 1000 - outcome.wallet_delta);
}

#[tokio::test]
async fn poor_target_is_refused_without_cooldown() {
    let h = harness([(ALICE, with_wallet(300)), (BOB, with_wallet(100))], LoadedDice::new(0));
    let before = h.store.contents();

    assert!(matches!(
        h.economy.perform(ALICE, ActionRequest::Rob { target: BOB }).await,
        Err(EconomyError::PrerequisiteUnmet { .. })
    ));
    assert_eq!(h.store.contents(), before);
    assert_eq!(h.economy.cooldown_remaining(ALICE, Activity::Rob), None);
}

#[tokio::test]
async fn robbing_yourself_is_invalid() {
    let h = harness([(ALICE, with_wallet(5000))], LoadedDice::new(0));
    assert!(matches!(
        h.economy.perform(ALICE, ActionRequest::Rob { target: ALICE }).await,
        Err(EconomyError::InvalidArgument(_))
    ));
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

#[tokio::test]
async fn buy_fish_and_sell_the_catch() {
    let h = harness([(ALICE, with_wallet(1000))], LoadedDice::new(0).with_picks([1]));

    h.economy.buy(ALICE, "Fishing Rod").await.unwrap();
    let outcome = h.economy.perform(ALICE, ActionRequest::Fish).await.unwrap();
    assert_eq!(outcome.items_gained, vec!["Tuna".to_owned()]);

    let sale = h.economy.sell_all(ALICE, &SellScope::Fish).await.unwrap();
    assert_eq!(sale.total, 60);
    let account = h.economy.snapshot(ALICE).unwrap();
    assert_eq!(account.wallet, 1000 - 250 + 60);
    assert_eq!(account.inventory, vec!["Fishing Rod".to_owned()]);
}

#[tokio::test]
async fn repriced_items_sell_at_the_new_price() {
    let mut account = with_wallet(0);
    account.add_item("Diamond");
    let h = harness([(ALICE, account)], LoadedDice::new(0));

    h.economy.set_sell_price("diamond", 2000).unwrap();
    assert_eq!(h.economy.sell(ALICE, "diamond").await.unwrap().total, 2000);
    assert!(h.economy.sell_prices().contains(&("diamond".to_owned(), 2000)));
}

#[tokio::test]
async fn energy_drink_clears_the_work_cooldown() {
    let h = harness([(ALICE, with_wallet(500))], LoadedDice::new(0));

    h.economy.perform(ALICE, ActionRequest::Work).await.unwrap();
    h.economy.buy(ALICE, "energy drink").await.unwrap();
    assert_eq!(
        h.economy.use_item(ALICE, "Energy Drink").await.unwrap(),
        UseEffect::WorkCooldownReset
    );
    assert_eq!(h.economy.cooldown_remaining(ALICE, Activity::Work), None);
    h.economy.perform(ALICE, ActionRequest::Work).await.unwrap();
}

// ---------------------------------------------------------------------------
// Transfers
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn confirmed_transfer_moves_the_whole_wallet() {
    let h = harness([(ALICE, with_wallet(500))], LoadedDice::new(0));

    let (responder, pending) = h.economy.request_transfer(ALICE, BOB, 500).await.unwrap();
    assert!(matches!(responder.confirm(BOB), Err(EconomyError::InvalidArgument(_))));
    responder.confirm(ALICE).unwrap();

    assert_eq!(pending.settle().await.unwrap(), TransferOutcome::Confirmed);
    let stored = h.store.contents();
    assert_eq!(stored.get(&ALICE).unwrap().wallet, 0);
    assert_eq!(stored.get(&BOB).unwrap().wallet, 600);
}

#[tokio::test(start_paused = true)]
async fn cancelled_transfer_moves_nothing() {
    let h = harness([(ALICE, with_wallet(500))], LoadedDice::new(0));

    let (responder, pending) = h.economy.request_transfer(ALICE, BOB, 200).await.unwrap();
    responder.cancel(ALICE).unwrap();
    assert!(responder.confirm(ALICE).is_err());

    assert_eq!(pending.settle().await.unwrap(), TransferOutcome::Cancelled);
    assert_eq!(h.economy.snapshot(ALICE).unwrap().wallet, 500);
    assert_eq!(h.economy.snapshot(BOB).unwrap().wallet, 100);
}

#[tokio::test(start_paused = true)]
async fn unanswered_transfer_times_out() {
    let h = harness([(ALICE, with_wallet(500))], LoadedDice::new(0));

    let (responder, pending) = h.economy.request_transfer(ALICE, BOB, 200).await.unwrap();
    let issued = tokio::time::Instant::now();
    assert_eq!(pending.settle().await.unwrap(), TransferOutcome::TimedOut);
    assert!(issued.elapsed() >= std::time::Duration::from_secs(60));

    assert!(responder.confirm(ALICE).is_err());
    assert_eq!(h.economy.snapshot(ALICE).unwrap().wallet, 500);
}

#[tokio::test(start_paused = true)]
async fn confirmation_after_the_window_is_refused() {
    let h = harness([(ALICE, with_wallet(500))], LoadedDice::new(0));

    let (responder, pending) = h.economy.request_transfer(ALICE, BOB, 200).await.unwrap();
    tokio::time::advance(std::time::Duration::from_secs(120)).await;
    assert!(tokio::time::Instant::now() >= responder.deadline());

    assert!(matches!(
        responder.confirm(ALICE),
        Err(EconomyError::InvalidArgument(_))
    ));
    assert_eq!(pending.settle().await.unwrap(), TransferOutcome::TimedOut);
    assert_eq!(h.economy.snapshot(ALICE).unwrap().wallet, 500);
    assert_eq!(h.economy.snapshot(BOB).unwrap().wallet, 100);
}

#[tokio::test(start_paused = true)]
async fn confirmation_rechecks_funds() {
    let h = harness([(ALICE, with_wallet(500))], LoadedDice::new(0));

    let (responder, pending) = h.economy.request_transfer(ALICE, BOB, 400).await.unwrap();
    h.economy.deposit(ALICE, Amount::Max).await.unwrap();
    responder.confirm(ALICE).unwrap();

    assert!(matches!(
        pending.settle().await,
        Err(EconomyError::InsufficientFunds { needed: 400, available: 0 })
    ));
    assert_eq!(h.economy.snapshot(BOB).unwrap().wallet, 100);
}

#[tokio::test]
async fn transfer_requests_are_validated_up_front() {
    let h = harness([(ALICE, with_wallet(50))], LoadedDice::new(0));
    assert!(matches!(
        h.economy.request_transfer(ALICE, BOB, 0).await,
        Err(EconomyError::InvalidArgument(_))
    ));
    assert!(matches!(
        h.economy.request_transfer(ALICE, ALICE, 10).await,
        Err(EconomyError::InvalidArgument(_))
    ));
    assert!(matches!(
        h.economy.request_transfer(ALICE, BOB, 51).await,
        Err(EconomyError::InsufficientFunds { .. })
    ));
}

// ---------------------------------------------------------------------------
// Trivia and passive XP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn correct_trivia_answer_pays_and_starts_cooldown() {
    let h = harness([], LoadedDice::new(0).with_picks([0]));

    let round = h.economy.start_trivia(ALICE).await.unwrap();
    assert_eq!(round.question().answer, "Paris");
    assert!(matches!(
        h.economy.start_trivia(ALICE).await,
        Err(EconomyError::OnCooldown { activity: Activity::Trivia, .. })
    ));

    h.clock.advance(TimeDelta::seconds(10));
    let outcome = h.economy.answer_trivia(round, Some("paris")).await.unwrap();
    assert_eq!(outcome.wallet_delta, 75);
    assert_eq!(h.economy.snapshot(ALICE).unwrap().wallet, 175);
}

#[tokio::test]
async fn late_trivia_answer_pays_nothing() {
    let h = harness([], LoadedDice::new(0).with_picks([0]));

    let round = h.economy.start_trivia(ALICE).await.unwrap();
    h.clock.advance(TimeDelta::seconds(16));
    let outcome = h.economy.answer_trivia(round, Some("Paris")).await.unwrap();
    assert!(matches!(outcome.detail, OutcomeDetail::Trivia { timed_out: true, .. }));
    assert_eq!(h.economy.snapshot(ALICE).unwrap().wallet, 100);
}

#[tokio::test(start_paused = true)]
async fn silent_player_times_out() {
    let h = harness([], LoadedDice::new(0).with_picks([2]));

    let round = h.economy.start_trivia(ALICE).await.unwrap();
    let outcome = h
        .economy
        .await_trivia_answer(round, std::future::pending::<Option<String>>())
        .await
        .unwrap();
    assert!(matches!(
        outcome.detail,
        OutcomeDetail::Trivia {
            timed_out: true,
            answer: "Mars",
            ..
        }
    ));
}

#[tokio::test]
async fn chat_level_up_pays_a_reward() {
    let h = harness(
        [(ALICE, Account { xp: 150, ..Account::default() })],
        LoadedDice::new(0).with_amounts([20]),
    );

    let award = h.economy.record_message(ALICE).await.unwrap();
    assert_eq!(award.xp, 20);
    assert_eq!(award.level_up.new_level, 2);
    assert_eq!(award.reward, 200);

    let account = h.economy.snapshot(ALICE).unwrap();
    assert_eq!((account.level, account.xp, account.wallet), (2, 15, 300));
}

#[tokio::test]
async fn command_xp_is_drawn_from_its_range() {
    let h = harness([], LoadedDice::new(9));
    let award = h.economy.record_command(ALICE).await.unwrap();
    assert!((20..=40).contains(&award.xp));
    assert_eq!(award.reward, 0);
}

// ---------------------------------------------------------------------------
// Reads and administration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn leaderboard_ranks_committed_accounts() {
    let h = harness(
        [(ALICE, with_wallet(50)), (BOB, with_wallet(700)), (UserId(3), with_wallet(700))],
        LoadedDice::new(0),
    );
    assert_eq!(
        h.economy.leaderboard(LeaderboardKey::Wallet, 2),
        vec![(BOB, 700), (UserId(3), 700)]
    );
}

#[tokio::test]
async fn rate_updates_are_validated_and_persisted() {
    let h = harness([], LoadedDice::new(0));

    assert!(matches!(
        h.economy.set_tax_rate(Decimal::from_str("1.5").unwrap()),
        Err(EconomyError::InvalidArgument(_))
    ));

    let updated = h.economy.set_tax_rate(Decimal::from_str("0.05").unwrap()).unwrap();
    assert_eq!(updated.tax_rate, Decimal::from_str("0.05").unwrap());
    assert_eq!(h.economy.rates().unwrap().tax_rate, Decimal::from_str("0.05").unwrap());
    assert_eq!(h.economy.rates().unwrap().interest_rate, Decimal::from_str("0.01").unwrap());
}
