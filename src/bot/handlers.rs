//! Command and message handlers.
//!
//! Endpoints receive their shared state through [`BotContext`], injected
//! by the dispatcher. Handlers map every failure to exactly one
//! user-visible message; transport errors bubble up to the endpoint
//! wrappers in `main` where they are logged.

use crate::bot::registry::{self, CommandCategory};
use crate::bot::replies;
use crate::config::Settings;
use crate::game::GameService;
use crate::github::{GitHubClient, GitHubError};
use crate::moderation::{self, ModerationService};
use crate::storage::JsonFileStore;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

const DELREPO_CONFIRM_PREFIX: &str = "delrepo:confirm:";
const DELREPO_CANCEL_PREFIX: &str = "delrepo:cancel:";

/// Supported bot commands; kept in sync with [`registry::COMMANDS`]
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Bot info banner
    #[command(description = "Show bot info.")]
    Start,
    /// Command list
    #[command(description = "List available commands.")]
    Help,
    /// Start a game (no argument) or play a guess (number argument)
    #[command(description = "Guess a number from 1-10 with 3 attempts.")]
    Guess(String),
    /// Create a GitHub repository: `<name> [description]`
    #[command(description = "Create a new GitHub repository.")]
    Crepo(String),
    /// Delete a GitHub repository after confirmation: `<name>`
    #[command(description = "Delete a GitHub repository.")]
    Delrepo(String),
    /// Upload a replied document into a repository: `<repo>`
    #[command(description = "Upload a replied file to a GitHub repository.")]
    Upfile(String),
}

/// Shared handler dependencies, registered once in `dptree::deps`
#[derive(Clone)]
pub struct BotContext {
    /// Application settings
    pub settings: Arc<Settings>,
    /// JSON document store
    pub store: Arc<JsonFileStore>,
    /// Guessing game sessions and evaluation
    pub game: Arc<GameService>,
    /// Link moderation counters
    pub moderation: Arc<ModerationService>,
    /// GitHub client, absent when no token is configured
    pub github: Option<Arc<GitHubClient>>,
    /// Process start time, for the `/start` uptime line
    pub started_at: Instant,
}

/// Sender id of a message, `0` for channel posts without a sender
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

const fn command_name(cmd: &Command) -> &'static str {
    match cmd {
        Command::Start => "start",
        Command::Help => "help",
        Command::Guess(_) => "guess",
        Command::Crepo(_) => "crepo",
        Command::Delrepo(_) => "delrepo",
        Command::Upfile(_) => "upfile",
    }
}

/// Dispatch a parsed command, logging it and enforcing the owner gate
///
/// # Errors
///
/// Returns an error if a Telegram API call fails.
pub async fn handle_command(bot: Bot, msg: Message, cmd: Command, ctx: BotContext) -> Result<()> {
    let name = command_name(&cmd);
    let user_id = get_user_id_safe(&msg);
    let user_name = msg
        .from
        .as_ref()
        .map_or("unknown", |u| u.first_name.as_str());
    info!(
        "Command: /{} | user: {} ({}) | chat: {}",
        name, user_name, user_id, msg.chat.id
    );

    let owner_only =
        registry::find(name).is_some_and(|d| d.category == CommandCategory::Owner);
    if owner_only && !ctx.settings.is_owner(user_id) {
        bot.send_message(msg.chat.id, "⛔️ This command is restricted to bot owners.")
            .await?;
        return Ok(());
    }

    match cmd {
        Command::Start => start(bot, msg, &ctx).await,
        Command::Help => help(bot, msg, &ctx).await,
        Command::Guess(arg) => guess(bot, msg, &ctx, arg.trim()).await,
        Command::Crepo(args) => create_repo(bot, msg, &ctx, args.trim()).await,
        Command::Delrepo(args) => delete_repo(bot, msg, &ctx, args.trim()).await,
        Command::Upfile(args) => upload_file(bot, msg, &ctx, args.trim()).await,
    }
}

async fn start(bot: Bot, msg: Message, ctx: &BotContext) -> Result<()> {
    let info = ctx.store.bot_info().await;
    bot.send_message(
        msg.chat.id,
        replies::start_text(&info, ctx.started_at.elapsed()),
    )
    .parse_mode(ParseMode::Html)
    .await?;
    Ok(())
}

async fn help(bot: Bot, msg: Message, ctx: &BotContext) -> Result<()> {
    let info = ctx.store.bot_info().await;
    bot.send_message(msg.chat.id, replies::help_text(&info))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn guess(bot: Bot, msg: Message, ctx: &BotContext, arg: &str) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let outcome = if arg.is_empty() {
        ctx.game.start(user_id)
    } else {
        ctx.game.guess(user_id, arg)
    };
    bot.send_message(msg.chat.id, replies::guess_reply(outcome))
        .await?;
    Ok(())
}

/// Whether a plain text message should be routed to the game
///
/// A bare number from a player with an active session counts as a guess;
/// anything starting with the command marker never does, so `/7` still
/// reaches command parsing.
#[must_use]
pub fn is_implicit_guess(msg: &Message, game: &GameService) -> bool {
    msg.text().is_some_and(|text| {
        routes_to_game(text, game.has_active(get_user_id_safe(msg)))
    })
}

/// Text-level half of the implicit-guess routing decision
fn routes_to_game(text: &str, has_active: bool) -> bool {
    let text = text.trim();
    !text.starts_with('/') && text.parse::<i64>().is_ok() && has_active
}

/// Treat a bare numeric message as a guess for the sender's active game
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn handle_implicit_guess(bot: Bot, msg: Message, ctx: BotContext) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let text = msg.text().unwrap_or("").trim();
    let outcome = ctx.game.guess(user_id, text);
    bot.send_message(msg.chat.id, replies::guess_reply(outcome))
        .await?;
    Ok(())
}

/// Whether a message falls under link moderation
#[must_use]
pub fn is_link_violation(msg: &Message) -> bool {
    (msg.chat.is_group() || msg.chat.is_supergroup())
        && msg.text().is_some_and(moderation::contains_link)
}

/// Remove a link message, count the violation and ban at the limit
///
/// Chat administrators and the chat owner are exempt. A persistence
/// failure aborts the request after the message deletion; the violation
/// is reported to the log and the counter is left as it was on disk.
///
/// # Errors
///
/// Returns an error if a Telegram API call or the counter update fails.
pub async fn handle_link_message(bot: Bot, msg: Message, ctx: BotContext) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let member = bot.get_chat_member(msg.chat.id, user.id).await?;
    if member.is_privileged() {
        return Ok(());
    }

    bot.delete_message(msg.chat.id, msg.id).await?;
    warn!(
        "Link removed in chat {} from {} ({})",
        msg.chat.id, user.first_name, user.id
    );

    let verdict = ctx
        .moderation
        .record_violation(msg.chat.id.0, user.id.0.cast_signed())
        .await?;
    if verdict.banned {
        bot.ban_chat_member(msg.chat.id, user.id).await?;
    }
    bot.send_message(msg.chat.id, replies::violation_reply(&user.first_name, verdict))
        .await?;
    Ok(())
}

async fn no_github(bot: Bot, chat_id: ChatId) -> Result<()> {
    bot.send_message(
        chat_id,
        "❌ GitHub token is not configured; repository commands are unavailable.",
    )
    .await?;
    Ok(())
}

async fn create_repo(bot: Bot, msg: Message, ctx: &BotContext, args: &str) -> Result<()> {
    let Some(github) = ctx.github.clone() else {
        return no_github(bot, msg.chat.id).await;
    };

    let mut parts = args.splitn(2, char::is_whitespace);
    let Some(name) = parts.next().filter(|s| !s.is_empty()) else {
        bot.send_message(
            msg.chat.id,
            "❌ Usage: /crepo <name> [description]\nExample: /crepo my-bot A short description",
        )
        .await?;
        return Ok(());
    };
    let description = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Created via Warden Bot");

    bot.send_message(msg.chat.id, format!("⏳ Creating repository \"{name}\"..."))
        .await?;

    let reply = match github.create_repo(name, description).await {
        Ok(repo) => format!(
            "✅ <b>Repository created!</b>\n\n\
             📛 <b>Name:</b> {name}\n\
             📝 <b>Description:</b> {description}\n\
             🔗 {url}\n\
             👤 <b>Owner:</b> {owner}\n\
             📅 <b>Created:</b> {created}",
            name = html_escape::encode_text(&repo.name),
            description = html_escape::encode_text(description),
            url = repo.html_url,
            owner = html_escape::encode_text(&repo.owner.login),
            created = repo.created_at.format("%Y-%m-%d %H:%M UTC"),
        ),
        Err(GitHubError::Api { status: 422, .. }) => {
            format!("❌ A repository named \"{name}\" already exists on your account.")
        }
        Err(e) => {
            error!("Failed to create repository {}: {}", name, e);
            format!("❌ Failed to create the repository: {e}")
        }
    };
    bot.send_message(msg.chat.id, reply)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn delete_repo(bot: Bot, msg: Message, ctx: &BotContext, args: &str) -> Result<()> {
    if ctx.github.is_none() {
        return no_github(bot, msg.chat.id).await;
    }
    if args.is_empty() || args.contains(char::is_whitespace) {
        bot.send_message(
            msg.chat.id,
            "❌ Usage: /delrepo <name>\nExample: /delrepo my-old-bot",
        )
        .await?;
        return Ok(());
    }

    let keyboard = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            "✅ Yes, delete now",
            format!("{DELREPO_CONFIRM_PREFIX}{args}"),
        ),
        InlineKeyboardButton::callback("❌ Cancel", format!("{DELREPO_CANCEL_PREFIX}{args}")),
    ]]);
    bot.send_message(
        msg.chat.id,
        format!(
            "❓ Permanently delete the repository \"{args}\"?\n\n⚠️ This cannot be undone!"
        ),
    )
    .reply_markup(keyboard)
    .await?;
    Ok(())
}

/// Handle the delrepo confirmation buttons
///
/// Only configured owners may confirm; presses from anyone else are
/// acknowledged and dropped.
///
/// # Errors
///
/// Returns an error if a Telegram API call fails.
pub async fn handle_callback(bot: Bot, q: CallbackQuery, ctx: BotContext) -> Result<()> {
    let Some(data) = q.data.clone() else {
        return Ok(());
    };
    let _ = bot.answer_callback_query(q.id.clone()).await;

    if !ctx.settings.is_owner(q.from.id.0.cast_signed()) {
        return Ok(());
    }
    let Some((chat_id, message_id)) = q.message.as_ref().map(|m| (m.chat().id, m.id())) else {
        return Ok(());
    };

    if let Some(name) = data.strip_prefix(DELREPO_CONFIRM_PREFIX) {
        confirm_delete_repo(bot, chat_id, message_id, &ctx, name).await?;
    } else if let Some(name) = data.strip_prefix(DELREPO_CANCEL_PREFIX) {
        bot.edit_message_text(
            chat_id,
            message_id,
            format!("☑️ Deletion of \"{name}\" cancelled."),
        )
        .await?;
    }
    Ok(())
}

async fn confirm_delete_repo(
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    ctx: &BotContext,
    name: &str,
) -> Result<()> {
    let Some(github) = ctx.github.clone() else {
        bot.edit_message_text(
            chat_id,
            message_id,
            "❌ GitHub token is not configured; repository commands are unavailable.",
        )
        .await?;
        return Ok(());
    };

    bot.edit_message_text(chat_id, message_id, format!("⏳ Deleting \"{name}\"..."))
        .await?;

    let text = match delete_repo_for_account(&github, name).await {
        Ok(()) => format!("✅ Repository \"{name}\" was deleted permanently."),
        Err(GitHubError::Api { status: 404, .. }) => {
            format!("❌ Repository \"{name}\" was not found on your account.")
        }
        Err(GitHubError::Api { status: 403, .. }) => {
            "❌ The token lacks the 'delete_repo' scope.".to_string()
        }
        Err(e) => {
            error!("Failed to delete repository {}: {}", name, e);
            format!("❌ Failed to delete the repository: {e}")
        }
    };
    bot.edit_message_text(chat_id, message_id, text).await?;
    Ok(())
}

async fn delete_repo_for_account(github: &GitHubClient, name: &str) -> Result<(), GitHubError> {
    let login = github.authenticated_user().await?;
    github.delete_repo(&login, name).await
}

async fn upload_file(bot: Bot, msg: Message, ctx: &BotContext, args: &str) -> Result<()> {
    let Some(github) = ctx.github.clone() else {
        return no_github(bot, msg.chat.id).await;
    };
    if args.is_empty() || args.contains(char::is_whitespace) {
        bot.send_message(msg.chat.id, "❌ Usage: /upfile <repo> (replying to a file)")
            .await?;
        return Ok(());
    }
    let Some(doc) = msg.reply_to_message().and_then(|m| m.document()).cloned() else {
        bot.send_message(msg.chat.id, "❌ Reply to a document to upload it.")
            .await?;
        return Ok(());
    };

    let file_name = doc.file_name.clone().unwrap_or_else(|| "upload.bin".to_string());
    let progress = bot
        .send_message(msg.chat.id, format!("⏳ Downloading {file_name}..."))
        .await?;

    let file = bot.get_file(doc.file.id.clone()).await?;
    let mut buffer = Vec::new();
    bot.download_file(&file.path, &mut buffer).await?;

    bot.edit_message_text(
        msg.chat.id,
        progress.id,
        format!("⏳ Uploading {file_name} to \"{args}\"..."),
    )
    .await?;

    let commit = format!("feat: upload {file_name}");
    let text = match upload_to_account(&github, args, &file_name, &buffer, &commit).await {
        Ok(login) => format!(
            "✅ Uploaded {file_name}.\n🔗 https://github.com/{login}/{args}"
        ),
        Err(GitHubError::Api { status: 404, .. }) => {
            format!("❌ Repository \"{args}\" was not found on your account.")
        }
        Err(e) => {
            error!("Failed to upload {} to {}: {}", file_name, args, e);
            format!("❌ Upload failed: {e}")
        }
    };
    bot.edit_message_text(msg.chat.id, progress.id, text).await?;
    Ok(())
}

async fn upload_to_account(
    github: &GitHubClient,
    repo: &str,
    file_name: &str,
    content: &[u8],
    commit: &str,
) -> Result<String, GitHubError> {
    let login = github.authenticated_user().await?;
    github
        .upload_file(&login, repo, file_name, content, commit)
        .await?;
    Ok(login)
}
