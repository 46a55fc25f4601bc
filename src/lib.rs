#![deny(missing_docs)]
//! Warden Bot
//!
//! A Telegram group assistant: command dispatch, a number guessing game,
//! link moderation with persistent warn counters, and GitHub repository
//! management for bot owners.

/// Telegram bot implementation
pub mod bot;
/// Configuration management
pub mod config;
/// Number guessing game
pub mod game;
/// GitHub REST client
pub mod github;
/// Link moderation and warn counters
pub mod moderation;
/// JSON document storage
pub mod storage;
