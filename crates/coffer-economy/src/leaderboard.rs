//! Ranking of committed accounts.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use coffer_types::{Account, LeaderboardKey, UserId};

/// Default number of leaderboard rows.
pub const DEFAULT_LIMIT: usize = 10;

/// The value `key` ranks `account` by.
pub fn rank_value(account: &Account, key: LeaderboardKey) -> i64 {
    match key {
        LeaderboardKey::Wallet => account.wallet,
        LeaderboardKey::Bank => account.bank,
        LeaderboardKey::Level => i64::from(account.level),
    }
}

/// Top `limit` accounts by `key`, highest first. Ties go to the lower id.
pub fn rank(accounts: &BTreeMap<UserId, Account>, key: LeaderboardKey, limit: usize) -> Vec<(UserId, i64)> {
    let mut rows: Vec<(UserId, i64)> = accounts
        .iter()
        .map(|(id, account)| (*id, rank_value(account, key)))
        .collect();
    rows.sort_by_key(|(id, value)| (Reverse(*value), *id));
    rows.truncate(limit);
    rows
}
