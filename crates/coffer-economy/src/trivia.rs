//! Timed trivia questions.
//!
//! A round is opened by [`Economy::start_trivia`](crate::Economy::start_trivia),
//! which starts the cooldown immediately, and closed by
//! [`Economy::answer_trivia`](crate::Economy::answer_trivia). An answer
//! arriving after the deadline counts as no answer.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use coffer_types::{Activity, UserId};

use crate::actions::{ActionOutcome, OutcomeDetail};

/// Time allowed to answer.
pub const ANSWER_WINDOW: Duration = Duration::from_secs(15);

/// A question, its accepted answer, and the coins it pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriviaQuestion {
    /// The prompt shown to the player.
    pub question: &'static str,
    /// The accepted answer, matched case-insensitively.
    pub answer: &'static str,
    /// Coins paid for a correct answer.
    pub reward: i64,
}

const fn q(question: &'static str, answer: &'static str, reward: i64) -> TriviaQuestion {
    TriviaQuestion {
        question,
        answer,
        reward,
    }
}

/// The question pool.
pub const QUESTIONS: [TriviaQuestion; 15] = [
    q("What is the capital of France?", "Paris", 75),
    q("What is 2 + 2?", "4", 50),
    q("Which planet is known as the Red Planet?", "Mars", 100),
    q("How many continents are there?", "7", 60),
    q("What is the largest ocean on Earth?", "Pacific Ocean", 120),
    q("What is the chemical symbol for water?", "H2O", 80),
    q("Who wrote 'Romeo and Juliet'?", "William Shakespeare", 90),
    q("What is the tallest mountain in the world?", "Mount Everest", 110),
    q("What is the currency of Japan?", "Yen", 70),
    q("Who painted the Mona Lisa?", "Leonardo da Vinci", 100),
    q("What is the largest country in the world by area?", "Russia", 110),
    q("What is the main ingredient in guacamole?", "Avocado", 60),
    q("How many states are in the United States of America?", "50", 70),
    q("What is the name of the galaxy we live in?", "Milky Way", 90),
    q("What is the most spoken language in the world?", "Mandarin Chinese", 100),
];

/// An open trivia question awaiting one answer.
///
/// Grading consumes the round, so each round pays out at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct TriviaRound {
    user: UserId,
    question: TriviaQuestion,
    issued_at: DateTime<Utc>,
    deadline: DateTime<Utc>,
}

impl TriviaRound {
    pub(crate) fn new(user: UserId, question: TriviaQuestion, issued_at: DateTime<Utc>) -> Self {
        let deadline = TimeDelta::from_std(ANSWER_WINDOW)
            .ok()
            .and_then(|window| issued_at.checked_add_signed(window))
            .unwrap_or(issued_at);
        Self {
            user,
            question,
            issued_at,
            deadline,
        }
    }

    /// The player the question was asked of.
    pub const fn user(&self) -> UserId {
        self.user
    }

    /// The question asked.
    pub const fn question(&self) -> &TriviaQuestion {
        &self.question
    }

    /// When the question was asked.
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Last instant an answer is accepted.
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Whether `answer` matches, ignoring case and surrounding space.
    pub fn accepts(&self, answer: &str) -> bool {
        answer.trim().eq_ignore_ascii_case(self.question.answer)
    }

    /// Whether an answer at `now` would arrive too late.
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }

    /// Grade `answer` given at `now`, closing the round.
    ///
    /// `None` means no answer arrived. A correct answer's reward is reported
    /// in `wallet_delta` for the caller to credit. A late or missing answer
    /// is a timeout and pays nothing.
    pub fn grade(self, answer: Option<&str>, now: DateTime<Utc>) -> ActionOutcome {
        let given = answer.filter(|_| !self.expired(now));
        let correct = given.is_some_and(|given| self.accepts(given));

        let mut outcome = ActionOutcome::new(
            Activity::Trivia,
            OutcomeDetail::Trivia {
                correct,
                timed_out: given.is_none(),
                answer: self.question.answer,
            },
        );
        if correct {
            outcome.wallet_delta = self.question.reward;
        }
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn round() -> TriviaRound {
        let issued = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).single().unwrap();
        TriviaRound::new(UserId(1), QUESTIONS[0], issued)
    }

    #[test]
    fn deadline_is_fifteen_seconds_out() {
        let round = round();
        assert_eq!(round.deadline() - round.issued_at(), TimeDelta::seconds(15));
    }

    #[test]
    fn correct_answer_ignores_case() {
        let round = round();
        let at = round.issued_at() + TimeDelta::seconds(5);
        let outcome = round.grade(Some("  pARIS "), at);
        assert_eq!(outcome.wallet_delta, 75);
    }

    #[test]
    fn wrong_answer_pays_nothing() {
        let round = round();
        let at = round.issued_at();
        let outcome = round.grade(Some("Lyon"), at);
        assert_eq!(
            outcome.detail,
            OutcomeDetail::Trivia {
                correct: false,
                timed_out: false,
                answer: "Paris",
            }
        );
        assert_eq!(outcome.wallet_delta, 0);
    }

    #[test]
    fn late_answer_counts_as_timeout() {
        let round = round();
        let at = round.deadline() + TimeDelta::seconds(1);
        let outcome = round.grade(Some("Paris"), at);
        assert!(matches!(outcome.detail, OutcomeDetail::Trivia { timed_out: true, .. }));
        assert_eq!(outcome.wallet_delta, 0);
    }

    #[test]
    fn missing_answer_counts_as_timeout() {
        let round = round();
        let at = round.issued_at();
        let outcome = round.grade(None, at);
        assert!(matches!(
            outcome.detail,
            OutcomeDetail::Trivia {
                correct: false,
                timed_out: true,
                ..
            }
        ));
    }

    #[test]
    fn answer_on_the_deadline_is_accepted() {
        let round = round();
        let at = round.deadline();
        assert_eq!(round.grade(Some("paris"), at).wallet_delta, 75);
    }

    #[test]
    fn rewards_are_positive() {
        assert!(QUESTIONS.iter().all(|question| question.reward > 0));
    }
}
