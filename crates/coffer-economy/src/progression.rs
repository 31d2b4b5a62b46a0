//! XP thresholds, level-up transitions, and daily streaks.
//!
//! Two progression tracks share an account's `level` and `xp` fields but
//! use different threshold curves:
//!
//! | Track | Threshold at level `l` | Fed by |
//! |-------|------------------------|--------|
//! | [`ProgressionTrack::Chat`] | `5l² + 50l + 100` | chat messages, command completions |
//! | [`ProgressionTrack::Command`] | `100l + 50` | `work` |
//!
//! All functions here are pure.

use chrono::NaiveDate;

use coffer_types::Account;

/// XP granted by one `work` shift (command track).
pub const WORK_XP: u64 = 10;

/// Inclusive XP range granted per chat message (chat track).
pub const MESSAGE_XP: (i64, i64) = (15, 30);

/// Inclusive XP range granted per completed command (chat track).
pub const COMMAND_XP: (i64, i64) = (20, 40);

/// Coins paid per level reached on the chat track, times the new level.
pub const LEVEL_UP_REWARD_PER_LEVEL: i64 = 100;

/// Which threshold curve a gain is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressionTrack {
    /// Message-driven XP with a quadratic curve.
    Chat,
    /// Command-driven XP with a linear curve.
    Command,
}

/// Result of applying an XP gain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelUp {
    /// Number of levels gained (0 if none).
    pub levels_gained: u32,
    /// Level after the gain.
    pub new_level: u32,
}

impl LevelUp {
    /// Whether at least one level was gained.
    pub const fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// XP needed to advance from `level` to `level + 1` on `track`.
pub fn xp_threshold(track: ProgressionTrack, level: u32) -> u64 {
    let l = u64::from(level);
    match track {
        ProgressionTrack::Chat => 5_u64
            .saturating_mul(l.saturating_mul(l))
            .saturating_add(50_u64.saturating_mul(l))
            .saturating_add(100),
        ProgressionTrack::Command => l.saturating_mul(100).saturating_add(50),
    }
}

/// Add `amount` XP to `account` and level it up as many times as the total
/// allows, carrying the excess each time.
///
/// Afterwards `account.xp < xp_threshold(track, account.level)`.
pub fn apply_xp(account: &mut Account, track: ProgressionTrack, amount: u64) -> LevelUp {
    account.level = account.level.max(1);
    account.xp = account.xp.saturating_add(amount);

    let mut levels_gained = 0_u32;
    loop {
        let needed = xp_threshold(track, account.level);
        if account.xp < needed || account.level == u32::MAX {
            break;
        }
        account.xp = account.xp.saturating_sub(needed);
        account.level = account.level.saturating_add(1);
        levels_gained = levels_gained.saturating_add(1);
    }

    LevelUp {
        levels_gained,
        new_level: account.level,
    }
}

/// Coins owed for a chat-track level-up: `100 × level` for every level
/// reached.
pub fn level_up_reward(level_up: LevelUp) -> i64 {
    let first = level_up
        .new_level
        .saturating_sub(level_up.levels_gained)
        .saturating_add(1);
    (first..=level_up.new_level)
        .map(|level| LEVEL_UP_REWARD_PER_LEVEL.saturating_mul(i64::from(level)))
        .fold(0_i64, i64::saturating_add)
}

/// Streak after claiming the daily reward on `today`.
///
/// Claimed yesterday continues the streak. A gap or no previous claim
/// starts over at 1. A second claim on the same day leaves it unchanged.
pub fn continue_streak(current: u32, last_claim: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(last) = last_claim else {
        return 1;
    };
    if last >= today {
        return current;
    }
    if today.pred_opt() == Some(last) {
        current.saturating_add(1)
    } else {
        1
    }
}
