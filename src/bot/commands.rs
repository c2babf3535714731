//! Chat commands exposed to guild managers.

use tracing::{debug, info};

use super::framework::{Context, Data};

/// Show or change a cog's settings for this server.
///
/// `config <cog>` lists the settings, `config <cog> <field> <value>` sets
/// one, `config <cog> <field> add|remove <value>` edits a list.
#[poise::command(
    prefix_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    aliases("c")
)]
pub async fn config(
    ctx: Context<'_>,
    cog: Option<String>,
    #[rest] args: Option<String>,
) -> Result<(), anyhow::Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let data = ctx.data();

    let reply = match cog.as_deref().and_then(|name| data.cogs.get(name)) {
        Some(cog) => {
            let args = args.unwrap_or_default();
            let tokens: Vec<&str> = args.split_whitespace().collect();
            debug!("Config command for {} in guild {}: {:?}", cog.name(), guild_id, tokens);
            cog.configure(guild_id.get(), &tokens, &data.parser).await?
        }
        None => format!("Available cogs: {}", data.cogs.names().join(", ")),
    };

    ctx.say(reply).await?;
    Ok(())
}

/// Drop every cached config for a guild the bot has left.
pub async fn forget_guild(data: &Data, guild_id: u64) {
    data.cogs.invalidate_guild(guild_id).await;
    info!("Dropped cached configs for guild {}", guild_id);
}
