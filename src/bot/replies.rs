//! User-facing reply text.
//!
//! Pure rendering only: every function maps an outcome value to a string
//! and touches no state, so the texts are trivially testable. Messages
//! are sent with HTML parse mode; anything user-provided is escaped here.

use crate::bot::registry::{self, CommandCategory};
use crate::config::{GAME_ATTEMPTS, GAME_MAX, GAME_MIN};
use crate::game::engine::GuessOutcome;
use crate::moderation::{WarnVerdict, WARN_LIMIT};
use crate::storage::BotInfo;
use chrono::Utc;
use std::time::Duration;

/// Render a game outcome
#[must_use]
pub fn guess_reply(outcome: GuessOutcome) -> String {
    match outcome {
        GuessOutcome::Started => format!(
            "Guessing game started! Pick a number from {GAME_MIN}-{GAME_MAX}. \
             You have {GAME_ATTEMPTS} attempts."
        ),
        GuessOutcome::AlreadyRunning => {
            "You already have a game running. Send your guess as a number.".to_string()
        }
        GuessOutcome::InvalidGuess => {
            format!("Please enter a valid number ({GAME_MIN}-{GAME_MAX}).")
        }
        GuessOutcome::Wrong { attempts_left } => {
            format!("❌ Wrong! Attempts left: {attempts_left}.")
        }
        GuessOutcome::Lost { answer } => format!(
            "😔 Out of attempts! The number was {answer}. Send /guess to play again."
        ),
        GuessOutcome::Won { answer } => {
            format!("🎉 Correct! The number was {answer}.")
        }
        GuessOutcome::NoGameInProgress => {
            "No game in progress. Send /guess to start one.".to_string()
        }
    }
}

/// Render a moderation verdict for the offending user
#[must_use]
pub fn violation_reply(first_name: &str, verdict: WarnVerdict) -> String {
    let name = html_escape::encode_text(first_name);
    if verdict.banned {
        format!("{name} has been removed after reaching {WARN_LIMIT} warns.")
    } else {
        format!(
            "{name}, links are not allowed! Warn {count} of {WARN_LIMIT}.",
            count = verdict.count
        )
    }
}

/// Render the `/start` banner
#[must_use]
pub fn start_text(info: &BotInfo, uptime: Duration) -> String {
    let today = Utc::now().format("%A, %d %B %Y");
    format!(
        "🤖 <b>{bot}</b>\n\n\
         👑 <b>Owner:</b> {owner}\n\
         ⏰ <b>Uptime:</b> {uptime}\n\
         📅 <b>Date:</b> {today}\n\n\
         📋 Use /help to list the available commands.",
        bot = html_escape::encode_text(&info.bot_name),
        owner = html_escape::encode_text(&info.owner_name),
        uptime = format_uptime(uptime),
    )
}

/// Render the `/help` command list, grouped by category
#[must_use]
pub fn help_text(info: &BotInfo) -> String {
    const SECTIONS: &[CommandCategory] = &[
        CommandCategory::General,
        CommandCategory::Group,
        CommandCategory::Admin,
        CommandCategory::Premium,
        CommandCategory::Owner,
    ];

    let mut text = format!(
        "📋 <b>Commands of {}</b>\n\n",
        html_escape::encode_text(&info.bot_name)
    );
    for &category in SECTIONS {
        let commands = registry::by_category(category);
        if commands.is_empty() {
            continue;
        }
        text.push_str(&format!("<b>{}:</b>\n", category.heading()));
        for cmd in commands {
            text.push_str(&format!("  /{} - {}\n", cmd.name, cmd.description));
        }
        text.push('\n');
    }
    text.push_str(&format!("🔸 Total: {} commands", registry::COMMANDS.len()));
    text
}

/// Human-readable uptime, largest units first
#[must_use]
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_reply_total_over_variants() {
        let outcomes = [
            GuessOutcome::Started,
            GuessOutcome::AlreadyRunning,
            GuessOutcome::InvalidGuess,
            GuessOutcome::Wrong { attempts_left: 2 },
            GuessOutcome::Lost { answer: 7 },
            GuessOutcome::Won { answer: 7 },
            GuessOutcome::NoGameInProgress,
        ];
        for outcome in outcomes {
            assert!(!guess_reply(outcome).is_empty(), "{outcome:?}");
        }
    }

    #[test]
    fn test_guess_reply_reveals_state() {
        assert!(guess_reply(GuessOutcome::Wrong { attempts_left: 1 }).contains('1'));
        assert!(guess_reply(GuessOutcome::Won { answer: 7 }).contains('7'));
        assert!(guess_reply(GuessOutcome::Lost { answer: 4 }).contains('4'));
    }

    #[test]
    fn test_violation_reply_escapes_name() {
        let verdict = WarnVerdict {
            count: 1,
            banned: false,
        };
        let text = violation_reply("<b>evil</b>", verdict);
        assert!(text.contains("&lt;b&gt;"));
        assert!(text.contains("Warn 1 of 3"));
    }

    #[test]
    fn test_violation_reply_ban() {
        let verdict = WarnVerdict {
            count: 3,
            banned: true,
        };
        let text = violation_reply("Mallory", verdict);
        assert!(text.contains("removed"));
    }

    #[test]
    fn test_help_lists_every_command() {
        let text = help_text(&BotInfo::default());
        for cmd in registry::COMMANDS {
            assert!(text.contains(&format!("/{}", cmd.name)), "/{}", cmd.name);
        }
        assert!(text.contains("Total: 6 commands"));
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0s");
        assert_eq!(format_uptime(Duration::from_secs(61)), "1m 1s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }
}
