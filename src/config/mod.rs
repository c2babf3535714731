//! Configuration module for Penelope.
//!
//! Loads configuration from environment variables.

use std::env;

use anyhow::Context;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Discord
    pub discord_token: String,

    /// Prefix for chat commands, `?` unless set.
    pub command_prefix: String,

    /// Owner user IDs (comma-separated)
    /// These users bypass permission checks on every command.
    pub owner_ids: Vec<u64>,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if any).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let command_prefix = env::var("COMMAND_PREFIX")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "?".to_string());

        Ok(Self {
            discord_token: env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?,
            command_prefix,
            owner_ids: parse_owner_ids(&env::var("OWNER_IDS").unwrap_or_default()),
            mongodb_uri: env::var("MONGODB_URI").context("MONGODB_URI must be set")?,
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "penelope".to_string()),
        })
    }
}

/// Comma-separated ids; entries that are not numbers are skipped.
fn parse_owner_ids(raw: &str) -> Vec<u64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .collect()
}
