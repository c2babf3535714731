//! Minecraft server status kept up to date in a pinned message.

use once_cell::sync::Lazy;

use crate::schema::{CogConfig, FieldSpec, ScalarKind, Schema};

static FIELDS: Lazy<Vec<FieldSpec>> = Lazy::new(|| {
    vec![
        FieldSpec::scalar("enabled", ScalarKind::Bool).with_default(false),
        FieldSpec::scalar("channel", ScalarKind::Channel),
        FieldSpec::scalar("message", ScalarKind::Message),
        FieldSpec::list("servers", ScalarKind::Str),
    ]
});

pub struct MinecraftSchema;

impl Schema for MinecraftSchema {
    const NAME: &'static str = "minecraft";
    const TITLE: &'static str = "MinecraftConfig";

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    /// The status message is only fetched when the updater runs, so a stored
    /// reference is enough here.
    fn check(config: &CogConfig<Self>) -> bool {
        config.flag("enabled") && config.is_set("message")
    }
}

/// A configured server entry, `host[:port] [display name]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub name: Option<String>,
}

impl Server {
    pub const DEFAULT_PORT: u16 = 25565;

    pub fn parse(entry: &str) -> Option<Self> {
        let mut parts = entry.trim().splitn(2, char::is_whitespace);
        let address = parts.next().filter(|a| !a.is_empty())?;
        let name = parts.next().map(str::trim).filter(|n| !n.is_empty()).map(String::from);

        let (host, port) = match address.rsplit_once(':') {
            Some((host, port)) => (host, port.parse().ok()?),
            None => (address, Self::DEFAULT_PORT),
        };

        Some(Self {
            host: host.to_string(),
            port,
            name,
        })
    }
}

impl CogConfig<MinecraftSchema> {
    /// Configured servers, skipping entries that do not parse.
    pub fn servers(&self) -> Vec<Server> {
        self.strings("servers").into_iter().filter_map(Server::parse).collect()
    }
}
