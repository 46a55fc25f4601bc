use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Instant;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};
use warden_bot::bot::handlers::{self, BotContext, Command};
use warden_bot::bot::registry;
use warden_bot::config::Settings;
use warden_bot::game::GameService;
use warden_bot::github::GitHubClient;
use warden_bot::moderation::ModerationService;
use warden_bot::storage::JsonFileStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    init_logging();

    info!("Starting Warden Bot...");

    let settings = init_settings();
    let store = init_store(&settings).await;
    let game = Arc::new(GameService::new());
    let moderation = Arc::new(ModerationService::new(store.clone()));
    let github = init_github(&settings);

    let bot = Bot::new(settings.telegram_token.clone());
    let ctx = BotContext {
        settings,
        store,
        game,
        moderation,
        github,
        started_at: Instant::now(),
    };

    // Publish the command menu so clients can autocomplete
    if let Err(e) = bot.set_my_commands(registry::bot_command_list()).await {
        error!("Failed to register command menu: {}", e);
    }

    info!("Bot is running...");

    Dispatcher::builder(bot, setup_handler())
        .dependencies(dptree::deps![ctx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            Arc::new(s)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

async fn init_store(settings: &Settings) -> Arc<JsonFileStore> {
    match JsonFileStore::new(&settings.data_dir).await {
        Ok(store) => {
            if let Err(e) = store.ensure_defaults().await {
                error!("Failed to seed data documents: {}", e);
                std::process::exit(1);
            }
            info!("Document store initialized at {}/.", settings.data_dir);
            Arc::new(store)
        }
        Err(e) => {
            error!("Failed to initialize document store: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_github(settings: &Settings) -> Option<Arc<GitHubClient>> {
    match settings.github_token.as_ref().filter(|t| !t.is_empty()) {
        Some(token) => {
            info!("GitHub client initialized.");
            Some(Arc::new(GitHubClient::new(token.clone())))
        }
        None => {
            info!("No GitHub token configured; repository commands are disabled.");
            None
        }
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(callback_endpoint))
        .branch(
            Update::filter_message()
                // Registered commands always win, even a bare "/7"
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(command_endpoint),
                )
                // A bare number from a player with an active game is a guess
                .branch(
                    dptree::filter(|msg: Message, ctx: BotContext| {
                        handlers::is_implicit_guess(&msg, &ctx.game)
                    })
                    .endpoint(implicit_guess_endpoint),
                )
                // Remaining group text goes through link moderation
                .branch(
                    dptree::filter(|msg: Message| handlers::is_link_violation(&msg))
                        .endpoint(link_endpoint),
                ),
        )
}

async fn command_endpoint(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: BotContext,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_command(bot, msg, cmd, ctx).await {
        error!("Command handler error: {}", e);
    }
    respond(())
}

async fn implicit_guess_endpoint(
    bot: Bot,
    msg: Message,
    ctx: BotContext,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_implicit_guess(bot, msg, ctx).await {
        error!("Implicit guess handler error: {}", e);
    }
    respond(())
}

async fn link_endpoint(
    bot: Bot,
    msg: Message,
    ctx: BotContext,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_link_message(bot, msg, ctx).await {
        error!("Moderation handler error: {}", e);
    }
    respond(())
}

async fn callback_endpoint(
    bot: Bot,
    q: CallbackQuery,
    ctx: BotContext,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_callback(bot, q, ctx).await {
        error!("Callback handler error: {}", e);
    }
    respond(())
}
