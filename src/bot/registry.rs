//! Static command registry.
//!
//! Built once at compile time; `/help` rendering and Telegram's command
//! menu both read from this table, so the two can never drift apart.

use teloxide::types::BotCommand;

/// Privilege/visibility grouping for `/help`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandCategory {
    /// Available to everyone
    General,
    /// Restricted to configured bot owners
    Owner,
    /// Reserved for paid features
    Premium,
    /// Only meaningful in group chats
    Group,
    /// Requires group admin rights
    Admin,
}

impl CommandCategory {
    /// Section heading used in `/help`
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::General => "General commands",
            Self::Owner => "Owner commands",
            Self::Premium => "Premium commands",
            Self::Group => "Group commands",
            Self::Admin => "Group admin commands",
        }
    }
}

/// One registered command
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    /// Command name without the leading `/`
    pub name: &'static str,
    /// One-line description for `/help` and the Telegram menu
    pub description: &'static str,
    /// Help grouping
    pub category: CommandCategory,
}

/// Every command the bot understands, in registration order
pub const COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "start",
        description: "Show bot info",
        category: CommandCategory::General,
    },
    CommandDescriptor {
        name: "help",
        description: "List available commands",
        category: CommandCategory::General,
    },
    CommandDescriptor {
        name: "guess",
        description: "Guess a number from 1-10 with 3 attempts",
        category: CommandCategory::General,
    },
    CommandDescriptor {
        name: "crepo",
        description: "Create a new GitHub repository",
        category: CommandCategory::Owner,
    },
    CommandDescriptor {
        name: "delrepo",
        description: "Delete a GitHub repository",
        category: CommandCategory::Owner,
    },
    CommandDescriptor {
        name: "upfile",
        description: "Upload a replied file to a GitHub repository",
        category: CommandCategory::Owner,
    },
];

/// Look up a command by its exact name
#[must_use]
pub fn find(name: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|cmd| cmd.name == name)
}

/// Commands of one category, sorted by name
#[must_use]
pub fn by_category(category: CommandCategory) -> Vec<&'static CommandDescriptor> {
    let mut commands: Vec<_> = COMMANDS
        .iter()
        .filter(|cmd| cmd.category == category)
        .collect();
    commands.sort_by_key(|cmd| cmd.name);
    commands
}

/// The registry as Telegram `BotCommand`s for `set_my_commands`
#[must_use]
pub fn bot_command_list() -> Vec<BotCommand> {
    COMMANDS
        .iter()
        .map(|cmd| BotCommand::new(cmd.name, cmd.description))
        .collect()
}
