//! Cogs - independently registered bot features with per-guild config.
//!
//! Add a new cog by:
//! 1. Creating a new file in this directory with its `Schema`
//! 2. Adding `pub mod your_cog;` below
//! 3. Registering it in `CogSet::standard()`

pub mod dew;
pub mod log;
pub mod minecraft;
pub mod modqueue;
pub mod reddiscord;

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, info_span, Instrument, Span};

use crate::cache::{CacheRegistry, MemoCache};
use crate::commands::{ArgumentParser, ConfigCommand};
use crate::database::DocumentStore;
use crate::error::{Error, Result};
use crate::platform::EntityResolver;
use crate::schema::{CogConfig, Schema};

/// A feature whose per-guild config follows schema `S`.
///
/// Owns the memo cache of loaded configs (one entry per guild, dropped only
/// by invalidation) and the per-guild write locks.
pub struct Cog<S: Schema> {
    store: Arc<dyn DocumentStore>,
    resolver: Arc<dyn EntityResolver>,
    configs: MemoCache<u64, Arc<CogConfig<S>>>,
    locks: DashMap<u64, Arc<Mutex<()>>>,
    span: Span,
}

impl<S: Schema> Cog<S> {
    pub fn new(
        registry: &CacheRegistry,
        store: Arc<dyn DocumentStore>,
        resolver: Arc<dyn EntityResolver>,
    ) -> Self {
        Self {
            store,
            resolver,
            configs: registry.get_or_create(S::NAME),
            locks: DashMap::new(),
            span: info_span!("cog", name = S::NAME),
        }
    }

    /// Config for `guild_id`, loaded from the store on first use.
    ///
    /// Concurrent first uses share one load. A failed load is not cached.
    pub async fn get_config(&self, guild_id: u64) -> Result<Arc<CogConfig<S>>> {
        let store = Arc::clone(&self.store);
        let resolver = Arc::clone(&self.resolver);

        self.configs
            .get_or_try_insert_with(guild_id, async move {
                CogConfig::from_db(guild_id, store, resolver).await.map(Arc::new)
            })
            .instrument(self.span.clone())
            .await
            .map_err(Error::Shared)
    }

    /// Forget the cached config for `guild_id`; the next read reloads it.
    pub async fn invalidate(&self, guild_id: u64) {
        self.configs.invalidate(&guild_id).await;
    }

    /// Swap in a config that was just persisted.
    pub(crate) async fn replace(&self, guild_id: u64, config: Arc<CogConfig<S>>) {
        self.configs.insert(guild_id, config).await;
    }

    /// Serialise writers for one guild.
    pub(crate) async fn lock(&self, guild_id: u64) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.entry(guild_id).or_default().value());
        lock.lock_owned().await
    }
}

/// Type-erased view of a [`Cog`] for name-based dispatch.
#[async_trait]
pub trait ConfigurableCog: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run `config` with the given tokens and return the reply text.
    async fn configure(
        &self,
        guild_id: u64,
        tokens: &[&str],
        parser: &dyn ArgumentParser,
    ) -> Result<String>;

    /// Whether the feature is enabled and fully configured for the guild.
    async fn is_enabled(&self, guild_id: u64) -> Result<bool>;

    async fn invalidate(&self, guild_id: u64);
}

#[async_trait]
impl<S: Schema> ConfigurableCog for Cog<S> {
    fn name(&self) -> &'static str {
        S::NAME
    }

    async fn configure(
        &self,
        guild_id: u64,
        tokens: &[&str],
        parser: &dyn ArgumentParser,
    ) -> Result<String> {
        ConfigCommand::new(self, parser)
            .handle(guild_id, tokens)
            .instrument(self.span.clone())
            .await
    }

    async fn is_enabled(&self, guild_id: u64) -> Result<bool> {
        Ok(self.get_config(guild_id).await?.check())
    }

    async fn invalidate(&self, guild_id: u64) {
        Cog::invalidate(self, guild_id).await;
    }
}

/// All registered cogs, addressed by config namespace.
#[derive(Clone, Default)]
pub struct CogSet {
    cogs: Vec<Arc<dyn ConfigurableCog>>,
}

impl CogSet {
    /// Every cog the bot ships with.
    pub fn standard(
        registry: &CacheRegistry,
        store: Arc<dyn DocumentStore>,
        resolver: Arc<dyn EntityResolver>,
    ) -> Self {
        let mut set = Self::default();
        set.register(Cog::<dew::DewSchema>::new(registry, store.clone(), resolver.clone()));
        set.register(Cog::<log::LogSchema>::new(registry, store.clone(), resolver.clone()));
        set.register(Cog::<minecraft::MinecraftSchema>::new(registry, store.clone(), resolver.clone()));
        set.register(Cog::<modqueue::ModQueueSchema>::new(registry, store.clone(), resolver.clone()));
        set.register(Cog::<reddiscord::ReddiscordSchema>::new(registry, store, resolver));
        info!("Registered cogs: {}", set.names().join(", "));
        set
    }

    pub fn register(&mut self, cog: impl ConfigurableCog + 'static) {
        self.cogs.push(Arc::new(cog));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ConfigurableCog>> {
        self.cogs.iter().find(|cog| cog.name().eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.cogs.iter().map(|cog| cog.name()).collect()
    }

    /// Drop every cog's cached config for `guild_id`.
    pub async fn invalidate_guild(&self, guild_id: u64) {
        for cog in &self.cogs {
            cog.invalidate(guild_id).await;
        }
    }
}
