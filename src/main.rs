//! Penelope - Modular Discord Bot
//!
//! A Discord bot whose features ("cogs") keep per-guild settings in one
//! MongoDB document per guild.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB integration and the document store
//! - `cache` - Named memo caches with Moka
//! - `platform` - Discord entities and their lookup
//! - `schema` - Typed cog config schemas and loaded configs
//! - `cogs` - Registered features and their config caches
//! - `commands` - The generic `config` command
//! - `bot` - Discord client and framework

mod bot;
mod cache;
mod cogs;
mod commands;
mod config;
mod database;
mod error;
mod platform;
mod schema;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use cache::CacheRegistry;
use config::Config;
use database::{Database, DocumentStore, MongoStore};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("penelope=info,serenity=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting Penelope bot...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    let store: Arc<dyn DocumentStore> = Arc::new(MongoStore::new(&db));
    info!("Database connected");

    let cache = Arc::new(CacheRegistry::new());
    info!("Cache registry initialized");

    bot::run(config, store, cache).await
}
