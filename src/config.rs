//! Configuration and settings management
//!
//! Loads settings from environment variables and defines the fixed game
//! parameters.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Comma-separated list of Telegram user IDs with owner privileges
    #[serde(rename = "owner_ids")]
    pub owner_ids_str: Option<String>,

    /// GitHub personal access token for the repository commands
    pub github_token: Option<String>,

    /// Directory holding the JSON data documents
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked into git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of APP)
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Also add settings from environment variables directly (without prefix)
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        s.try_deserialize()
    }

    /// Returns the set of Telegram IDs allowed to run owner-only commands
    #[must_use]
    pub fn owner_ids(&self) -> HashSet<i64> {
        self.owner_ids_str
            .as_ref()
            .map(|s| {
                s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                    .filter(|token| !token.is_empty())
                    .filter_map(|id| id.parse::<i64>().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns true if the given user may run owner-only commands
    #[must_use]
    pub fn is_owner(&self, user_id: i64) -> bool {
        self.owner_ids().contains(&user_id)
    }
}

// Guessing game configuration
/// Lowest number the game can draw
pub const GAME_MIN: u8 = 1;
/// Highest number the game can draw
pub const GAME_MAX: u8 = 10;
/// Attempts granted per game session
pub const GAME_ATTEMPTS: u8 = 3;
