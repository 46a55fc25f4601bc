//! In-memory game sessions, keyed by Telegram user id.
//!
//! Sessions are transient: they exist only between a started game and its
//! resolution, and are lost on restart.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// State of one in-progress guessing game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSession {
    /// The number the player has to find, drawn once at game start
    pub correct_number: u8,
    /// Counted attempts remaining; never increases while the session lives
    pub attempts_left: u8,
}

/// Owned, key-scoped store for active game sessions
///
/// All mutation happens under a single lock. Whole game transitions go
/// through [`SessionStore::transition`] so a read-modify-write is never
/// interleaved with another handler for the same user.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, GameSession>>,
}

impl SessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, HashMap<i64, GameSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the user currently has an active session
    #[must_use]
    pub fn has(&self, user_id: i64) -> bool {
        self.locked().contains_key(&user_id)
    }

    /// The user's active session, if any
    #[must_use]
    pub fn get(&self, user_id: i64) -> Option<GameSession> {
        self.locked().get(&user_id).copied()
    }

    /// Insert or replace the user's session
    pub fn set(&self, user_id: i64, session: GameSession) {
        self.locked().insert(user_id, session);
    }

    /// Remove the user's session, if present
    pub fn delete(&self, user_id: i64) {
        self.locked().remove(&user_id);
    }

    /// Apply an atomic read-modify-write transition for one user
    ///
    /// `f` receives the current session (if any) and returns the session
    /// to keep (`None` deletes it) together with an outcome value. The
    /// whole step runs under the store lock.
    pub fn transition<T>(
        &self,
        user_id: i64,
        f: impl FnOnce(Option<GameSession>) -> (Option<GameSession>, T),
    ) -> T {
        let mut sessions = self.locked();
        let (next, outcome) = f(sessions.get(&user_id).copied());
        match next {
            Some(session) => {
                sessions.insert(user_id, session);
            }
            None => {
                sessions.remove(&user_id);
            }
        }
        outcome
    }
}
