//! Turning user-typed text into config values.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, ValidationError};
use crate::platform::{EntityResolver, MessageRef};
use crate::schema::{ScalarKind, Value};

/// Converts raw command text into a value of the requested kind.
///
/// Bad input is a [`ValidationError`]; lookup failures other than "not
/// found" propagate as platform errors.
#[async_trait]
pub trait ArgumentParser: Send + Sync {
    async fn parse(&self, guild_id: u64, raw: &str, kind: ScalarKind) -> Result<Value>;
}

/// Parses mentions, raw ids and message links, and checks that the entity
/// they name exists.
#[derive(Clone)]
pub struct MentionParser {
    resolver: Arc<dyn EntityResolver>,
}

impl MentionParser {
    pub fn new(resolver: Arc<dyn EntityResolver>) -> Self {
        Self { resolver }
    }
}

fn bad(message: String) -> crate::error::Error {
    ValidationError::BadArgument(message).into()
}

#[async_trait]
impl ArgumentParser for MentionParser {
    async fn parse(&self, guild_id: u64, raw: &str, kind: ScalarKind) -> Result<Value> {
        let raw = raw.trim();

        match kind {
            ScalarKind::Str => Ok(Value::Str(raw.to_string())),
            ScalarKind::Bool => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| bad(format!("`{raw}` is not a recognised boolean option"))),
            ScalarKind::Int => raw
                .parse()
                .map(Value::Int)
                .map_err(|_| bad(format!("`{raw}` is not a valid number"))),
            ScalarKind::Channel => mention_id(raw, &["#"])
                .and_then(|id| self.resolver.channel(id))
                .map(|channel| Value::Channel(channel.id))
                .ok_or_else(|| bad(format!("Channel \"{raw}\" not found."))),
            ScalarKind::User => mention_id(raw, &["@!", "@"])
                .and_then(|id| self.resolver.user(id))
                .map(|user| Value::User(user.id))
                .ok_or_else(|| bad(format!("User \"{raw}\" not found."))),
            ScalarKind::Role => mention_id(raw, &["@&"])
                .and_then(|id| self.resolver.role(guild_id, id))
                .map(|role| Value::Role(role.id))
                .ok_or_else(|| bad(format!("Role \"{raw}\" not found."))),
            ScalarKind::Message => {
                let reference = message_ref(raw)
                    .ok_or_else(|| bad(format!("`{raw}` is not a message link or `channel:message` id")))?;
                match self
                    .resolver
                    .fetch_message(reference.channel_id, reference.message_id)
                    .await?
                {
                    Some(message) => Ok(Value::Message(message.reference())),
                    None => Err(bad(format!("Message \"{raw}\" not found."))),
                }
            }
        }
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "yes" | "y" | "true" | "t" | "1" | "enable" | "on" => Some(true),
        "no" | "n" | "false" | "f" | "0" | "disable" | "off" => Some(false),
        _ => None,
    }
}

/// The stored shape named by `raw`, without checking that the entity still
/// exists. `None` for non-reference kinds or unparseable text.
pub fn reference(raw: &str, kind: ScalarKind) -> Option<Value> {
    let raw = raw.trim();
    match kind {
        ScalarKind::Channel => mention_id(raw, &["#"]).map(Value::Channel),
        ScalarKind::User => mention_id(raw, &["@!", "@"]).map(Value::User),
        ScalarKind::Role => mention_id(raw, &["@&"]).map(Value::Role),
        ScalarKind::Message => message_ref(raw).map(Value::Message),
        ScalarKind::Bool | ScalarKind::Str | ScalarKind::Int => None,
    }
}

/// Id from `<{sigil}id>` or a bare id. Sigils are tried in order.
fn mention_id(raw: &str, sigils: &[&str]) -> Option<u64> {
    match raw.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
        Some(inner) => sigils
            .iter()
            .find_map(|sigil| inner.strip_prefix(sigil))
            .and_then(|id| id.parse().ok()),
        None => raw.parse().ok(),
    }
}

/// `channel:message`, `channel-message`, or a jump link.
fn message_ref(raw: &str) -> Option<MessageRef> {
    if raw.starts_with("https://") {
        let mut segments = raw.trim_end_matches('/').rsplit('/');
        let message_id = segments.next()?.parse().ok()?;
        let channel_id = segments.next()?.parse().ok()?;
        return Some(MessageRef { channel_id, message_id });
    }

    raw.replacen('-', ":", 1).parse().ok()
}
