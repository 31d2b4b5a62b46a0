//! Random draws for the outcome tables.
//!
//! Resolvers never touch an RNG directly. They ask a [`Dice`] for three
//! kinds of draw: an inclusive amount, a uniform index into a table, and a
//! percentile roll. Production uses [`RandomDice`]; tests use
//! [`LoadedDice`] to force particular branches.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the random draws used by every resolver.
pub trait Dice: Send {
    /// Uniform integer in `low..=high`. Returns `low` when `high <= low`.
    fn between(&mut self, low: i64, high: i64) -> i64;

    /// Uniform index in `0..len`. Returns 0 when `len` is 0.
    fn pick(&mut self, len: usize) -> usize;

    /// Percentile roll in `0..100`.
    fn percent(&mut self) -> u32;
}

// ---------------------------------------------------------------------------
// RandomDice
// ---------------------------------------------------------------------------

/// [`Dice`] backed by a real RNG.
#[derive(Debug)]
pub struct RandomDice<R = StdRng> {
    rng: R,
}

impl RandomDice<StdRng> {
    /// Dice seeded from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic dice for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng + Send> RandomDice<R> {
    /// Wrap an existing RNG.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> Dice for RandomDice<R> {
    fn between(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..=high)
    }

    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    fn percent(&mut self) -> u32 {
        self.rng.random_range(0..100)
    }
}

// ---------------------------------------------------------------------------
// LoadedDice
// ---------------------------------------------------------------------------

/// [`Dice`] that replays scripted draws, then falls back to a seeded RNG.
///
/// Each kind of draw has its own queue. Scripted amounts are clamped into
/// the requested range and scripted picks are reduced modulo the table
/// length, so a script can never produce an out-of-table result.
#[derive(Debug)]
pub struct LoadedDice {
    amounts: VecDeque<i64>,
    picks: VecDeque<usize>,
    percents: VecDeque<u32>,
    fallback: RandomDice<StdRng>,
}

impl LoadedDice {
    /// Empty script over a fallback RNG seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            amounts: VecDeque::new(),
            picks: VecDeque::new(),
            percents: VecDeque::new(),
            fallback: RandomDice::seeded(seed),
        }
    }

    /// Queue amounts returned by [`Dice::between`].
    #[must_use]
    pub fn with_amounts(mut self, amounts: impl IntoIterator<Item = i64>) -> Self {
        self.amounts.extend(amounts);
        self
    }

    /// Queue indices returned by [`Dice::pick`].
    #[must_use]
    pub fn with_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    /// Queue rolls returned by [`Dice::percent`].
    #[must_use]
    pub fn with_percents(mut self, percents: impl IntoIterator<Item = u32>) -> Self {
        self.percents.extend(percents);
        self
    }
}

impl Dice for LoadedDice {
    fn between(&mut self, low: i64, high: i64) -> i64 {
        match self.amounts.pop_front() {
            Some(amount) if high > low => amount.clamp(low, high),
            Some(_) => low,
            None => self.fallback.between(low, high),
        }
    }

    fn pick(&mut self, len: usize) -> usize {
        match self.picks.pop_front() {
            Some(index) => index.checked_rem(len).unwrap_or(0),
            None => self.fallback.pick(len),
        }
    }

    fn percent(&mut self) -> u32 {
        match self.percents.pop_front() {
            Some(roll) => roll.min(99),
            None => self.fallback.percent(),
        }
    }
}
