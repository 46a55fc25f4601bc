//! End-to-end flows through the game and moderation services,
//! exercising the same state the bot handlers drive.

use std::sync::Arc;
use warden_bot::game::engine::GuessOutcome;
use warden_bot::game::GameService;
use warden_bot::moderation::{ModerationService, WarnTable, WarnVerdict};
use warden_bot::storage::{JsonFileStore, WARNS_KEY};

#[test]
fn test_full_game_round_with_pinned_number() {
    let game = GameService::with_source(Box::new(|| 7));
    let user = 42;

    assert_eq!(game.start(user), GuessOutcome::Started);
    assert_eq!(game.start(user), GuessOutcome::AlreadyRunning);

    // Invalid input is rejected without costing an attempt
    assert_eq!(game.guess(user, "eleven"), GuessOutcome::InvalidGuess);
    assert_eq!(game.guess(user, "11"), GuessOutcome::InvalidGuess);

    assert_eq!(game.guess(user, "3"), GuessOutcome::Wrong { attempts_left: 2 });
    assert_eq!(game.guess(user, "9"), GuessOutcome::Wrong { attempts_left: 1 });
    assert_eq!(game.guess(user, "7"), GuessOutcome::Won { answer: 7 });

    assert!(!game.has_active(user));
    assert_eq!(game.guess(user, "7"), GuessOutcome::NoGameInProgress);
}

#[test]
fn test_exhaustion_and_replay() {
    let game = GameService::with_source(Box::new(|| 4));
    let user = 1;

    game.start(user);
    game.guess(user, "1");
    game.guess(user, "2");
    assert_eq!(game.guess(user, "3"), GuessOutcome::Lost { answer: 4 });
    assert!(!game.has_active(user));

    // The next start opens a fresh session with full attempts
    assert_eq!(game.start(user), GuessOutcome::Started);
    assert_eq!(
        game.store().get(user).map(|s| s.attempts_left),
        Some(3)
    );
}

#[tokio::test]
async fn test_warn_flow_persists_across_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(JsonFileStore::new(dir.path()).await.expect("store"));
    store.ensure_defaults().await.expect("seed");

    let moderation = ModerationService::new(store.clone());
    assert_eq!(
        moderation.record_violation(100, 5).await.expect("record"),
        WarnVerdict { count: 1, banned: false }
    );
    assert_eq!(
        moderation.record_violation(100, 5).await.expect("record"),
        WarnVerdict { count: 2, banned: false }
    );

    // A new service over the same store continues where the old one left off
    drop(moderation);
    let moderation = ModerationService::new(store.clone());
    assert_eq!(
        moderation.record_violation(100, 5).await.expect("record"),
        WarnVerdict { count: 3, banned: true }
    );

    let table: WarnTable = store
        .load_json(WARNS_KEY)
        .await
        .expect("load")
        .unwrap_or_default();
    assert!(table.get("100").and_then(|chat| chat.get("5")).is_none());
}
