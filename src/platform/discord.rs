//! Entity resolution over the serenity cache and HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{Cache, ChannelId, GuildId, Http, MessageId, RoleId, UserId};
use serenity::http::HttpError;
use tracing::debug;

use super::{Channel, EntityResolver, Guild, Message, Role, User};

/// Resolves snowflakes against the gateway cache; messages via HTTP.
#[derive(Clone)]
pub struct DiscordResolver {
    cache: Arc<Cache>,
    http: Arc<Http>,
}

impl DiscordResolver {
    pub fn new(cache: Arc<Cache>, http: Arc<Http>) -> Self {
        Self { cache, http }
    }
}

// Serenity ids are non-zero; a zero snowflake never names anything.
fn non_zero(id: u64) -> Option<u64> {
    (id != 0).then_some(id)
}

#[async_trait]
impl EntityResolver for DiscordResolver {
    fn guild(&self, guild_id: u64) -> Option<Guild> {
        let id = non_zero(guild_id)?;
        self.cache.guild(GuildId::new(id)).map(|guild| Guild {
            id,
            name: guild.name.clone(),
        })
    }

    fn channel(&self, channel_id: u64) -> Option<Channel> {
        let id = non_zero(channel_id)?;
        self.cache.channel(ChannelId::new(id)).map(|channel| Channel {
            id,
            guild_id: Some(channel.guild_id.get()),
            name: channel.name.clone(),
        })
    }

    fn user(&self, user_id: u64) -> Option<User> {
        let id = non_zero(user_id)?;
        self.cache.user(UserId::new(id)).map(|user| User {
            id,
            name: user.name.clone(),
        })
    }

    fn role(&self, guild_id: u64, role_id: u64) -> Option<Role> {
        let guild = self.cache.guild(GuildId::new(non_zero(guild_id)?))?;
        guild
            .roles
            .get(&RoleId::new(non_zero(role_id)?))
            .map(|role| Role {
                id: role_id,
                guild_id,
                name: role.name.clone(),
            })
    }

    async fn fetch_message(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> anyhow::Result<Option<Message>> {
        let (Some(channel_id), Some(message_id)) = (non_zero(channel_id), non_zero(message_id))
        else {
            return Ok(None);
        };

        match self
            .http
            .get_message(ChannelId::new(channel_id), MessageId::new(message_id))
            .await
        {
            Ok(message) => Ok(Some(Message {
                id: message.id.get(),
                channel_id: message.channel_id.get(),
                guild_id: message.guild_id.map(|id| id.get()),
                content: message.content,
            })),
            Err(serenity::Error::Http(HttpError::UnsuccessfulRequest(response)))
                if response.status_code.as_u16() == 404 =>
            {
                debug!("Message {}:{} no longer exists", channel_id, message_id);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
