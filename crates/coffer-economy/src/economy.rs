//! The [`Economy`] facade: every operation the outside world calls.
//!
//! Each mutating operation runs inside one ledger critical section. The
//! account is created on first touch, validation happens before the first
//! write, and the section commits exactly once. Gated activities also check
//! and stamp their cooldown inside the same section, so two concurrent
//! invocations by one account cannot both get past the cooldown.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use coffer_ledger::{Ledger, LedgerError, LockedAccounts, RatesStore};
use coffer_types::{Account, Activity, Job, LeaderboardKey, MaintenanceRates, Pet, UserId};

use crate::actions::{ActionOutcome, ActionRequest, Resolution, resolve};
use crate::catalog::{JobInfo, PetInfo, PriceBook, ShopItem};
use crate::clock::{Clock, SystemClock};
use crate::cooldown::{CooldownBook, cooldown_window};
use crate::dice::{Dice, RandomDice};
use crate::error::EconomyError;
use crate::leaderboard;
use crate::market::{self, Amount, Sale, SellScope, UseEffect};
use crate::progression::{
    COMMAND_XP, LevelUp, MESSAGE_XP, ProgressionTrack, apply_xp, level_up_reward, xp_threshold,
};
use crate::transfer::{self, PendingTransfer, TransferResponder};
use crate::trivia::{ANSWER_WINDOW, QUESTIONS, TriviaRound};

/// What the balance view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceView {
    /// Liquid coins.
    pub wallet: i64,
    /// Banked coins.
    pub bank: i64,
    /// Current level.
    pub level: u32,
    /// XP toward the next level.
    pub xp: u64,
    /// XP the next level needs on the command track.
    pub xp_needed: u64,
    /// Adopted pet, if any.
    pub pet: Option<Pet>,
    /// Current job, if any.
    pub job: Option<Job>,
}

/// XP granted for chat activity and any level-up reward it triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    /// XP added.
    pub xp: u64,
    /// Levels reached by the gain.
    pub level_up: LevelUp,
    /// Coins paid for the levels reached.
    pub reward: i64,
}

/// Entry point for every ledger operation.
pub struct Economy {
    ledger: Arc<Ledger>,
    rates: Arc<dyn RatesStore>,
    rates_update: Mutex<()>,
    prices: PriceBook,
    cooldowns: CooldownBook,
    dice: Mutex<Box<dyn Dice>>,
    clock: Arc<dyn Clock>,
}

impl core::fmt::Debug for Economy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Economy")
            .field("ledger", &self.ledger)
            .field("prices", &self.prices)
            .field("cooldowns", &self.cooldowns)
            .finish_non_exhaustive()
    }
}

impl Economy {
    /// An economy over `ledger` with OS-seeded dice and the system clock.
    pub fn new(ledger: Arc<Ledger>, rates: Arc<dyn RatesStore>) -> Self {
        Self {
            ledger,
            rates,
            rates_update: Mutex::new(()),
            prices: PriceBook::default(),
            cooldowns: CooldownBook::new(),
            dice: Mutex::new(Box::new(RandomDice::from_os())),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the random source.
    #[must_use]
    pub fn with_dice(mut self, dice: impl Dice + 'static) -> Self {
        self.dice = Mutex::new(Box::new(dice));
        self
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying ledger.
    pub const fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    fn dice(&self) -> MutexGuard<'_, Box<dyn Dice>> {
        self.dice.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Commit `section` if `result` is `Ok`. On `Err` nothing was changed,
    /// so the section is only committed to persist accounts it created.
    fn finish<T>(section: LockedAccounts<'_>, result: Result<T, EconomyError>) -> Result<T, EconomyError> {
        match result {
            Ok(value) => {
                section.commit()?;
                Ok(value)
            }
            Err(err) => {
                if section.ids().any(|id| section.was_created(id)) {
                    section.commit()?;
                }
                Err(err)
            }
        }
    }

    /// Like [`finish`](Self::finish) for a gated activity: on success the
    /// cooldown is stamped before the section releases its locks, and
    /// withdrawn again if the commit fails.
    fn finish_gated<T>(
        &self,
        section: LockedAccounts<'_>,
        result: Result<T, EconomyError>,
        actor: UserId,
        activity: Activity,
        job: Option<Job>,
        invoked_at: DateTime<Utc>,
    ) -> Result<T, EconomyError> {
        let value = match result {
            Ok(value) => value,
            Err(err) => return Self::finish(section, Err(err)),
        };
        let Some(window) = cooldown_window(activity, job) else {
            section.commit()?;
            return Ok(value);
        };
        self.cooldowns.start(actor, activity, window, invoked_at);
        if let Err(err) = section.commit() {
            self.cooldowns.clear(actor, activity);
            return Err(err.into());
        }
        Ok(value)
    }

    async fn mutate<T, F>(&self, id: UserId, f: F) -> Result<T, EconomyError>
    where
        F: FnOnce(&mut Account) -> Result<T, EconomyError>,
    {
        let mut section = self.ledger.lock(&[id]).await;
        let result = section.account_mut(id).map_err(EconomyError::from).and_then(f);
        Self::finish(section, result)
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// Return the account `id`, creating it on first use.
    pub async fn ensure_account(&self, id: UserId) -> Result<Account, EconomyError> {
        Ok(self.ledger.ensure(id).await?)
    }

    /// Committed state of `id`, if it exists.
    pub fn snapshot(&self, id: UserId) -> Option<Account> {
        self.ledger.snapshot(id)
    }

    /// Balances and progress of `id`.
    pub async fn balance(&self, id: UserId) -> Result<BalanceView, EconomyError> {
        let account = self.ensure_account(id).await?;
        Ok(BalanceView {
            wallet: account.wallet,
            bank: account.bank,
            level: account.level,
            xp: account.xp,
            xp_needed: xp_threshold(ProgressionTrack::Command, account.level),
            pet: account.pet,
            job: account.job,
        })
    }

    /// Time before `id` may use `activity` again, if it is cooling down.
    pub fn cooldown_remaining(&self, id: UserId, activity: Activity) -> Option<Duration> {
        self.cooldowns.remaining(id, activity, self.clock.now())
    }

    // -----------------------------------------------------------------------
    // Gated activities
    // -----------------------------------------------------------------------

    /// Perform one gated activity for `actor`.
    pub async fn perform(&self, actor: UserId, request: ActionRequest) -> Result<ActionOutcome, EconomyError> {
        let activity = request.activity();
        let mut section = self.ledger.lock(&request.accounts(actor)).await;
        let now = self.clock.now();

        let result = self.cooldowns.check(actor, activity, now).and_then(|()| {
            let mut dice = self.dice();
            let mut resolution = Resolution {
                actor,
                now,
                dice: &mut **dice,
            };
            resolve(request, &mut resolution, &mut section)
        });

        let job = section.account(actor).ok().and_then(|account| account.job);
        let outcome = self.finish_gated(section, result, actor, activity, job, now)?;
        tracing::debug!(
            user = %actor,
            activity = %activity,
            wallet_delta = outcome.wallet_delta,
            "activity resolved"
        );
        Ok(outcome)
    }

    /// Ask `actor` a trivia question. Starts the trivia cooldown.
    pub async fn start_trivia(&self, actor: UserId) -> Result<TriviaRound, EconomyError> {
        let section = self.ledger.lock(&[actor]).await;
        let now = self.clock.now();

        let result = self.cooldowns.check(actor, Activity::Trivia, now).and_then(|()| {
            let index = self.dice().pick(QUESTIONS.len());
            QUESTIONS
                .get(index)
                .copied()
                .ok_or_else(|| EconomyError::not_found("trivia question", index.to_string()))
        });
        let question = self.finish_gated(section, result, actor, Activity::Trivia, None, now)?;
        Ok(TriviaRound::new(actor, question, now))
    }

    /// Grade the answer to `round`. `None` means no answer arrived.
    pub async fn answer_trivia(&self, round: TriviaRound, answer: Option<&str>) -> Result<ActionOutcome, EconomyError> {
        let user = round.user();
        let outcome = round.grade(answer, self.clock.now());
        if outcome.wallet_delta != 0 {
            let reward = outcome.wallet_delta;
            self.mutate(user, |account| {
                account.wallet = account.wallet.saturating_add(reward);
                Ok(())
            })
            .await?;
        }
        Ok(outcome)
    }

    /// Wait up to the answer window for `reply`, then grade it.
    pub async fn await_trivia_answer<F>(&self, round: TriviaRound, reply: F) -> Result<ActionOutcome, EconomyError>
    where
        F: Future<Output = Option<String>>,
    {
        let answer = tokio::time::timeout(ANSWER_WINDOW, reply).await.ok().flatten();
        self.answer_trivia(round, answer.as_deref()).await
    }

    // -----------------------------------------------------------------------
    // Transfers
    // -----------------------------------------------------------------------

    /// Open a transfer of `amount` from `from` to `to`.
    pub async fn request_transfer(
        &self,
        from: UserId,
        to: UserId,
        amount: i64,
    ) -> Result<(TransferResponder, PendingTransfer), EconomyError> {
        transfer::open(Arc::clone(&self.ledger), from, to, amount).await
    }

    // -----------------------------------------------------------------------
    // Market
    // -----------------------------------------------------------------------

    /// Buy one shop item.
    pub async fn buy(&self, id: UserId, item: &str) -> Result<ShopItem, EconomyError> {
        self.mutate(id, |account| market::buy(account, item).copied()).await
    }

    /// Sell one held item.
    pub async fn sell(&self, id: UserId, item: &str) -> Result<Sale, EconomyError> {
        self.mutate(id, |account| market::sell(account, item, &self.prices)).await
    }

    /// Sell every held item in `scope`.
    pub async fn sell_all(&self, id: UserId, scope: &SellScope) -> Result<Sale, EconomyError> {
        self.mutate(id, |account| market::sell_all(account, scope, &self.prices))
            .await
    }

    /// Move coins into the bank.
    pub async fn deposit(&self, id: UserId, amount: Amount) -> Result<i64, EconomyError> {
        self.mutate(id, |account| market::deposit(account, amount)).await
    }

    /// Move coins out of the bank.
    pub async fn withdraw(&self, id: UserId, amount: Amount) -> Result<i64, EconomyError> {
        self.mutate(id, |account| market::withdraw(account, amount)).await
    }

    /// Adopt a pet.
    pub async fn adopt(&self, id: UserId, pet: &str) -> Result<PetInfo, EconomyError> {
        self.mutate(id, |account| market::adopt(account, pet)).await
    }

    /// Take a job.
    pub async fn apply_job(&self, id: UserId, job: &str) -> Result<JobInfo, EconomyError> {
        self.mutate(id, |account| market::apply_job(account, job)).await
    }

    /// Leave the current job.
    pub async fn quit_job(&self, id: UserId) -> Result<Job, EconomyError> {
        self.mutate(id, market::quit_job).await
    }

    /// Upgrade a held item.
    pub async fn upgrade(&self, id: UserId, item: &str) -> Result<i64, EconomyError> {
        self.mutate(id, |account| market::upgrade(account, item)).await
    }

    /// Use a held item.
    pub async fn use_item(&self, id: UserId, item: &str) -> Result<UseEffect, EconomyError> {
        let effect = self.mutate(id, |account| market::use_item(account, item)).await?;
        if effect == UseEffect::WorkCooldownReset {
            self.cooldowns.clear(id, Activity::Work);
        }
        Ok(effect)
    }

    // -----------------------------------------------------------------------
    // Passive progression
    // -----------------------------------------------------------------------

    async fn award_chat_xp(&self, id: UserId, range: (i64, i64)) -> Result<XpAward, EconomyError> {
        let (low, high) = range;
        let drawn = self.dice().between(low, high);
        let xp = u64::try_from(drawn).unwrap_or(0);
        let award = self
            .mutate(id, |account| {
                let level_up = apply_xp(account, ProgressionTrack::Chat, xp);
                let reward = level_up_reward(level_up);
                account.wallet = account.wallet.saturating_add(reward);
                Ok(XpAward { xp, level_up, reward })
            })
            .await?;
        if award.level_up.leveled_up() {
            tracing::info!(user = %id, level = award.level_up.new_level, reward = award.reward, "level up");
        }
        Ok(award)
    }

    /// Grant XP for a chat message.
    pub async fn record_message(&self, id: UserId) -> Result<XpAward, EconomyError> {
        self.award_chat_xp(id, MESSAGE_XP).await
    }

    /// Grant XP for a completed command.
    pub async fn record_command(&self, id: UserId) -> Result<XpAward, EconomyError> {
        self.award_chat_xp(id, COMMAND_XP).await
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Top `limit` accounts by `key`.
    pub fn leaderboard(&self, key: LeaderboardKey, limit: usize) -> Vec<(UserId, i64)> {
        leaderboard::rank(&self.ledger.accounts(), key, limit)
    }

    /// Current sell price of every sellable item.
    pub fn sell_prices(&self) -> Vec<(String, i64)> {
        self.prices.list()
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    /// Reprice a sellable item.
    pub fn set_sell_price(&self, item: &str, price: i64) -> Result<(), EconomyError> {
        self.prices.set(item, price)?;
        tracing::info!(item = item.trim(), price, "sell price updated");
        Ok(())
    }

    /// Reinitialize an existing account.
    pub async fn reset_account(&self, id: UserId) -> Result<(), EconomyError> {
        match self.ledger.reset(id).await {
            Ok(()) => Ok(()),
            Err(LedgerError::NotFound(_)) => Err(EconomyError::not_found("account", id.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    /// Add `amount` coins to the wallet of an existing account.
    pub async fn add_money(&self, id: UserId, amount: i64) -> Result<i64, EconomyError> {
        self.adjust_wallet(id, amount).await
    }

    /// Take `amount` coins from the wallet of an existing account. The
    /// wallet may go negative.
    pub async fn remove_money(&self, id: UserId, amount: i64) -> Result<i64, EconomyError> {
        let delta = amount
            .checked_neg()
            .ok_or_else(|| EconomyError::invalid(format!("cannot remove {amount} coins")))?;
        self.adjust_wallet(id, delta).await
    }

    /// Shift the wallet of an existing account by `delta` and return the new
    /// wallet. Unknown ids fail with [`EconomyError::NotFound`] and no account
    /// is created for them.
    pub async fn adjust_wallet(&self, id: UserId, delta: i64) -> Result<i64, EconomyError> {
        let mut section = self.ledger.lock(&[id]).await;
        if section.was_created(id) {
            return Err(EconomyError::not_found("account", id.to_string()));
        }
        let account = section.account_mut(id)?;
        account.wallet = account.wallet.saturating_add(delta);
        let wallet = account.wallet;
        section.commit()?;
        tracing::info!(user = %id, delta, wallet, "wallet adjusted");
        Ok(wallet)
    }

    /// Current maintenance rates.
    pub fn rates(&self) -> Result<MaintenanceRates, EconomyError> {
        Ok(self.rates.load_rates().map_err(LedgerError::from)?)
    }

    /// Set the daily interest rate on bank balances.
    pub fn set_interest_rate(&self, rate: Decimal) -> Result<MaintenanceRates, EconomyError> {
        self.update_rates(rate, |rates| rates.interest_rate = rate)
    }

    /// Set the daily tax rate on wallet balances.
    pub fn set_tax_rate(&self, rate: Decimal) -> Result<MaintenanceRates, EconomyError> {
        self.update_rates(rate, |rates| rates.tax_rate = rate)
    }

    fn update_rates(
        &self,
        rate: Decimal,
        apply: impl FnOnce(&mut MaintenanceRates),
    ) -> Result<MaintenanceRates, EconomyError> {
        if !MaintenanceRates::is_valid_rate(rate) {
            return Err(EconomyError::invalid(format!("rate {rate} is outside 0..=1")));
        }
        let _serialized = self.rates_update.lock().unwrap_or_else(PoisonError::into_inner);
        let mut rates = self.rates.load_rates().map_err(LedgerError::from)?;
        apply(&mut rates);
        self.rates.save_rates(&rates).map_err(LedgerError::from)?;
        Ok(rates)
    }
}
