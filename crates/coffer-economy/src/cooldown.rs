//! Per-account, per-activity cooldown tracking.
//!
//! The book records when each (account, activity) pair becomes usable
//! again. A stamp is only written after an activity succeeds, so an
//! activity rejected for an unmet prerequisite leaves the account free to
//! retry immediately.
//!
//! Cooldowns live in memory and are forgotten on restart. Expired stamps
//! are dropped when they are next looked up, and every new stamp sweeps out
//! the ones that have lapsed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use coffer_types::{Activity, Job, UserId};

use crate::catalog::job_info;
use crate::error::EconomyError;

/// Seconds an activity stays locked after use. `None` for activities
/// without a cooldown. `paycheck` uses the job's own period.
pub fn cooldown_secs(activity: Activity, job: Option<Job>) -> Option<i64> {
    match activity {
        Activity::Work => Some(30 * 60),
        Activity::Daily => Some(24 * 60 * 60),
        Activity::Fish | Activity::UpgradedFish | Activity::Beg | Activity::Trivia => Some(10 * 60),
        Activity::Hunt => Some(20 * 60),
        Activity::Dig => Some(30 * 60),
        Activity::Mine => Some(40 * 60),
        Activity::Hack | Activity::Rob => Some(60 * 60),
        Activity::Crime => Some(12 * 60 * 60),
        Activity::Explore => Some(6 * 60 * 60),
        Activity::Paycheck => job.map(|job| job_info(job).cooldown_secs),
        Activity::Slots | Activity::Coinflip | Activity::Gamble => None,
    }
}

/// Cooldown window of `activity` as a [`TimeDelta`].
pub fn cooldown_window(activity: Activity, job: Option<Job>) -> Option<TimeDelta> {
    cooldown_secs(activity, job).and_then(TimeDelta::try_seconds)
}

/// When each (account, activity) pair may next be used.
#[derive(Debug, Default)]
pub struct CooldownBook {
    ready_at: Mutex<HashMap<(UserId, Activity), DateTime<Utc>>>,
}

impl CooldownBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<(UserId, Activity), DateTime<Utc>>> {
        self.ready_at.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Time left before `user` may use `activity` again, if any.
    pub fn remaining(&self, user: UserId, activity: Activity, now: DateTime<Utc>) -> Option<Duration> {
        let mut entries = self.entries();
        let ready_at = *entries.get(&(user, activity))?;
        let left = ready_at
            .signed_duration_since(now)
            .to_std()
            .ok()
            .filter(|left| !left.is_zero());
        if left.is_none() {
            entries.remove(&(user, activity));
        }
        left
    }

    /// Fail with [`EconomyError::OnCooldown`] if `activity` is still locked.
    pub fn check(&self, user: UserId, activity: Activity, now: DateTime<Utc>) -> Result<(), EconomyError> {
        match self.remaining(user, activity, now) {
            Some(remaining) => Err(EconomyError::OnCooldown { activity, remaining }),
            None => Ok(()),
        }
    }

    /// Lock `activity` for `window` starting at `invoked_at`. Stamps that
    /// lapsed by `invoked_at` are dropped.
    pub fn start(&self, user: UserId, activity: Activity, window: TimeDelta, invoked_at: DateTime<Utc>) {
        let mut entries = self.entries();
        entries.retain(|_, ready_at| *ready_at > invoked_at);
        if let Some(ready_at) = invoked_at.checked_add_signed(window) {
            entries.insert((user, activity), ready_at);
        }
    }

    /// Unlock `activity` immediately.
    pub fn clear(&self, user: UserId, activity: Activity) {
        self.entries().remove(&(user, activity));
    }
}
