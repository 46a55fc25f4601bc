//! Pure guess evaluation.
//!
//! Each function maps the current session (or its absence) and an input
//! to the next session state and an outcome, without side effects.

use crate::config::{GAME_ATTEMPTS, GAME_MAX, GAME_MIN};
use crate::game::session::GameSession;

/// Result of one game transition, rendered for the user by
/// [`crate::bot::replies::guess_reply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// A fresh session was created
    Started,
    /// A start was requested while a session already exists; no change
    AlreadyRunning,
    /// The guess did not parse or fell outside the valid range; the
    /// attempt was not consumed
    InvalidGuess,
    /// A counted wrong guess with attempts still remaining
    Wrong {
        /// Attempts the player still has
        attempts_left: u8,
    },
    /// The last attempt was wrong; the session is over
    Lost {
        /// The number that was never found
        answer: u8,
    },
    /// The guess matched; the session is over
    Won {
        /// The number that was found
        answer: u8,
    },
    /// A guess arrived with no active session
    NoGameInProgress,
}

/// Start transition: create a session unless one already exists
///
/// This is the only place a session is ever created. `drawn` must come
/// from a uniform draw over `GAME_MIN..=GAME_MAX`.
pub fn start(
    current: Option<GameSession>,
    drawn: u8,
) -> (Option<GameSession>, GuessOutcome) {
    match current {
        Some(existing) => (Some(existing), GuessOutcome::AlreadyRunning),
        None => (
            Some(GameSession {
                correct_number: drawn,
                attempts_left: GAME_ATTEMPTS,
            }),
            GuessOutcome::Started,
        ),
    }
}

/// Guess transition: validate the raw input and play one attempt
///
/// Validation failures leave the session untouched. A counted attempt
/// decrements `attempts_left` first and compares afterwards, so the
/// decisive third attempt can still win in the same call that would
/// otherwise exhaust the session.
pub fn evaluate(
    current: Option<GameSession>,
    raw_guess: &str,
) -> (Option<GameSession>, GuessOutcome) {
    let Some(mut session) = current else {
        return (None, GuessOutcome::NoGameInProgress);
    };

    let guess = match raw_guess.trim().parse::<i64>() {
        Ok(n) if (i64::from(GAME_MIN)..=i64::from(GAME_MAX)).contains(&n) => n as u8,
        _ => return (Some(session), GuessOutcome::InvalidGuess),
    };

    session.attempts_left -= 1;

    if guess == session.correct_number {
        (
            None,
            GuessOutcome::Won {
                answer: session.correct_number,
            },
        )
    } else if session.attempts_left > 0 {
        (
            Some(session),
            GuessOutcome::Wrong {
                attempts_left: session.attempts_left,
            },
        )
    } else {
        (
            None,
            GuessOutcome::Lost {
                answer: session.correct_number,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(correct: u8, left: u8) -> Option<GameSession> {
        Some(GameSession {
            correct_number: correct,
            attempts_left: left,
        })
    }

    #[test]
    fn test_start_creates_full_session() {
        let (next, outcome) = start(None, 7);
        assert_eq!(outcome, GuessOutcome::Started);
        assert_eq!(next, active(7, GAME_ATTEMPTS));
    }

    #[test]
    fn test_start_is_idempotent_guard() {
        let existing = active(4, 2);
        let (next, outcome) = start(existing, 9);
        assert_eq!(outcome, GuessOutcome::AlreadyRunning);
        // Neither the number nor the remaining attempts change
        assert_eq!(next, existing);
    }

    #[test]
    fn test_invalid_guess_does_not_consume_attempt() {
        for raw in ["0", "11", "-1", "abc", "3.5", "", "7abc"] {
            let (next, outcome) = evaluate(active(7, 3), raw);
            assert_eq!(outcome, GuessOutcome::InvalidGuess, "input {raw:?}");
            assert_eq!(next, active(7, 3), "input {raw:?}");
        }
    }

    #[test]
    fn test_wrong_guess_decrements() {
        let (next, outcome) = evaluate(active(7, 3), "3");
        assert_eq!(outcome, GuessOutcome::Wrong { attempts_left: 2 });
        assert_eq!(next, active(7, 2));
    }

    #[test]
    fn test_correct_guess_ends_session() {
        let (next, outcome) = evaluate(active(7, 2), "7");
        assert_eq!(outcome, GuessOutcome::Won { answer: 7 });
        assert_eq!(next, None);
    }

    #[test]
    fn test_decrement_happens_before_compare() {
        // On the last attempt a correct guess must still win: the
        // decrement to zero does not turn the evaluation into a loss.
        let (next, outcome) = evaluate(active(7, 1), "7");
        assert_eq!(outcome, GuessOutcome::Won { answer: 7 });
        assert_eq!(next, None);
    }

    #[test]
    fn test_last_wrong_guess_exhausts_in_same_call() {
        let (next, outcome) = evaluate(active(7, 1), "2");
        assert_eq!(outcome, GuessOutcome::Lost { answer: 7 });
        assert_eq!(next, None);
    }

    #[test]
    fn test_guess_without_session() {
        let (next, outcome) = evaluate(None, "5");
        assert_eq!(outcome, GuessOutcome::NoGameInProgress);
        assert_eq!(next, None);
    }

    #[test]
    fn test_whitespace_is_tolerated() {
        let (_, outcome) = evaluate(active(7, 3), " 7 ");
        assert_eq!(outcome, GuessOutcome::Won { answer: 7 });
    }
}
