//! Poise framework setup and shared command state.

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use super::commands;
use crate::cache::CacheRegistry;
use crate::cogs::CogSet;
use crate::commands::MentionParser;
use crate::config::Config;
use crate::database::DocumentStore;
use crate::platform::DiscordResolver;

/// Shared state handed to every command.
pub struct Data {
    /// Registered cogs and their config caches.
    pub cogs: CogSet,

    /// Argument parser backed by the gateway cache.
    pub parser: MentionParser,
}

pub type Context<'a> = poise::Context<'a, Data, anyhow::Error>;

/// Build the framework. Cogs are created once the gateway cache exists.
pub fn build(
    config: Config,
    store: Arc<dyn DocumentStore>,
    cache: Arc<CacheRegistry>,
) -> poise::Framework<Data, anyhow::Error> {
    if config.owner_ids.is_empty() {
        info!("No owner IDs configured (OWNER_IDS is empty)");
    } else {
        info!("Bot owners: {:?}", config.owner_ids);
    }

    let options = poise::FrameworkOptions {
        commands: vec![commands::config()],
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(config.command_prefix.clone()),
            ..Default::default()
        },
        owners: config.owner_ids.iter().copied().map(serenity::UserId::new).collect(),
        skip_checks_for_owners: true,
        on_error: |error| {
            Box::pin(async move {
                match error {
                    poise::FrameworkError::Command { error, ctx, .. } => {
                        error!("Command {} failed: {:#}", ctx.command().qualified_name, error);
                        if let Err(e) = ctx.say("Something went wrong while running that command.").await {
                            warn!("Failed to report command error: {}", e);
                        }
                    }
                    other => {
                        if let Err(e) = poise::builtins::on_error(other).await {
                            error!("Error while handling error: {}", e);
                        }
                    }
                }
            })
        },
        event_handler: |_ctx, event, _framework, data| {
            Box::pin(async move {
                if let serenity::FullEvent::GuildDelete { incomplete, .. } = event {
                    if !incomplete.unavailable {
                        commands::forget_guild(data, incomplete.id.get()).await;
                    }
                }
                Ok(())
            })
        },
        ..Default::default()
    };

    poise::Framework::builder()
        .options(options)
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);

                let resolver = Arc::new(DiscordResolver::new(ctx.cache.clone(), ctx.http.clone()));
                let cogs = CogSet::standard(&cache, store, resolver.clone());
                info!("Config caches: {}", cache.cache_names().join(", "));

                Ok(Data {
                    cogs,
                    parser: MentionParser::new(resolver),
                })
            })
        })
        .build()
}
