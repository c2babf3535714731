//! Bot module - Discord client, framework and commands.

mod commands;
mod framework;

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::cache::CacheRegistry;
use crate::config::Config;
use crate::database::DocumentStore;

/// Gateway events the bot needs: guild and channel state for the cache,
/// message content for prefix commands, members for user lookups.
fn intents() -> serenity::GatewayIntents {
    serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS
}

/// Connect to the gateway and run until the client stops.
pub async fn run(
    config: Config,
    store: Arc<dyn DocumentStore>,
    cache: Arc<CacheRegistry>,
) -> anyhow::Result<()> {
    let token = config.discord_token.clone();
    let framework = framework::build(config, store, cache);

    let mut client = serenity::ClientBuilder::new(&token, intents())
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            shard_manager.shutdown_all().await;
        }
    });

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
        return Err(why.into());
    }

    Ok(())
}
