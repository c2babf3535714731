//! Platform entities and the resolver that looks them up.
//!
//! The config subsystem only ever stores snowflakes. Turning a snowflake back
//! into something live goes through [`EntityResolver`], implemented over
//! serenity by [`DiscordResolver`].

mod discord;
mod entities;

pub use discord::DiscordResolver;
pub use entities::{Channel, Guild, Message, MessageRef, Role, User};

use async_trait::async_trait;

/// Looks up live platform entities by id.
///
/// Lookups for guilds, channels, users and roles are local cache reads and
/// return `None` when the entity is gone. Messages need a network fetch.
#[async_trait]
pub trait EntityResolver: Send + Sync {
    fn guild(&self, guild_id: u64) -> Option<Guild>;

    fn channel(&self, channel_id: u64) -> Option<Channel>;

    fn user(&self, user_id: u64) -> Option<User>;

    fn role(&self, guild_id: u64, role_id: u64) -> Option<Role>;

    /// Fetch a message. `Ok(None)` when the message no longer exists.
    async fn fetch_message(&self, channel_id: u64, message_id: u64)
    -> anyhow::Result<Option<Message>>;
}
