//! Number guessing game: session storage, pure evaluation, service API.

/// Pure transition functions and outcomes
pub mod engine;
/// In-memory session store
pub mod session;

use crate::config::{GAME_MAX, GAME_MIN};
use engine::GuessOutcome;
use rand::Rng as _;
use session::SessionStore;

/// Source of secret numbers; injectable so tests can pin the draw
pub type NumberSource = Box<dyn Fn() -> u8 + Send + Sync>;

/// Game façade used by the bot handlers
///
/// Owns the session store and the random number source. Every operation
/// is a single atomic transition against the store.
pub struct GameService {
    store: SessionStore,
    draw: NumberSource,
}

impl GameService {
    /// Create a service drawing uniformly from the configured range
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(Box::new(|| rand::thread_rng().gen_range(GAME_MIN..=GAME_MAX)))
    }

    /// Create a service with a custom number source
    #[must_use]
    pub fn with_source(draw: NumberSource) -> Self {
        Self {
            store: SessionStore::new(),
            draw,
        }
    }

    /// Start a game for the user, or report the one already running
    pub fn start(&self, user_id: i64) -> GuessOutcome {
        let drawn = (self.draw)();
        self.store
            .transition(user_id, |current| engine::start(current, drawn))
    }

    /// Play one guess for the user
    pub fn guess(&self, user_id: i64, raw_guess: &str) -> GuessOutcome {
        self.store
            .transition(user_id, |current| engine::evaluate(current, raw_guess))
    }

    /// Whether the user has a game in progress
    #[must_use]
    pub fn has_active(&self, user_id: i64) -> bool {
        self.store.has(user_id)
    }

    /// Direct access to the session store
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}

impl Default for GameService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GAME_ATTEMPTS;

    fn fixed(n: u8) -> GameService {
        GameService::with_source(Box::new(move || n))
    }

    #[test]
    fn test_start_creates_session_in_range() {
        let game = GameService::new();
        assert_eq!(game.start(1), GuessOutcome::Started);
        let session = game.store().get(1).expect("session exists");
        assert!((GAME_MIN..=GAME_MAX).contains(&session.correct_number));
        assert_eq!(session.attempts_left, GAME_ATTEMPTS);
    }

    #[test]
    fn test_double_start_changes_nothing() {
        let game = fixed(7);
        assert_eq!(game.start(1), GuessOutcome::Started);
        let before = game.store().get(1);
        assert_eq!(game.start(1), GuessOutcome::AlreadyRunning);
        assert_eq!(game.store().get(1), before);
    }

    #[test]
    fn test_win_on_each_attempt_number() {
        for wrong_first in 0..3u8 {
            let game = fixed(7);
            game.start(1);
            for _ in 0..wrong_first {
                game.guess(1, "1");
            }
            assert_eq!(game.guess(1, "7"), GuessOutcome::Won { answer: 7 });
            assert!(!game.has_active(1));
        }
    }

    #[test]
    fn test_three_wrong_guesses_exhaust() {
        let game = fixed(7);
        game.start(1);
        assert_eq!(game.guess(1, "1"), GuessOutcome::Wrong { attempts_left: 2 });
        assert_eq!(game.guess(1, "2"), GuessOutcome::Wrong { attempts_left: 1 });
        assert_eq!(game.guess(1, "3"), GuessOutcome::Lost { answer: 7 });
        assert!(!game.has_active(1));
    }

    #[test]
    fn test_full_round_fixed_seven() {
        let game = fixed(7);
        assert_eq!(game.start(5), GuessOutcome::Started);
        assert_eq!(game.guess(5, "3"), GuessOutcome::Wrong { attempts_left: 2 });
        assert_eq!(game.guess(5, "9"), GuessOutcome::Wrong { attempts_left: 1 });
        assert_eq!(game.guess(5, "7"), GuessOutcome::Won { answer: 7 });
        assert!(!game.has_active(5));
    }

    #[test]
    fn test_users_are_independent() {
        let game = fixed(7);
        game.start(1);
        assert!(!game.has_active(2));
        assert_eq!(game.guess(2, "7"), GuessOutcome::NoGameInProgress);
        assert!(game.has_active(1));
    }
}
