use poise::serenity_prelude::{CreateEmbed, GuildId};
use tracing::info;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::db::queries::banned_guilds;

fn parse_guild_id(value: &str) -> Result<GuildId, Error> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(GuildId::new)
        .ok_or_else(|| Error::InvalidOperation(format!("`{}` is not a valid server id", value)))
}

async fn reply(ctx: Context<'_>, embed: CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Make the bot leave a server
#[poise::command(slash_command, owners_only)]
pub async fn leaveserver(
    ctx: Context<'_>,
    #[description = "Server id"] guild_id: String,
) -> Result<(), Error> {
    let guild_id = parse_guild_id(&guild_id)?;

    let name = guild_id.name(ctx.cache()).unwrap_or_else(|| guild_id.to_string());
    guild_id.leave(ctx.http()).await?;
    info!("Left guild {} on request of {}", guild_id, ctx.author().id);

    let embed = embeds::success_embed()
        .title("Left Server")
        .description(format!("Left **{}**", name));

    reply(ctx, embed).await
}

/// Block a server from using the bot and leave it
#[poise::command(slash_command, owners_only)]
pub async fn banguild(
    ctx: Context<'_>,
    #[description = "Server id"] guild_id: String,
) -> Result<(), Error> {
    let guild_id = parse_guild_id(&guild_id)?;

    banned_guilds::ban(
        &ctx.data().pool,
        guild_id.get() as i64,
        ctx.author().id.get() as i64,
    )
    .await?;
    info!("Guild {} banned by {}", guild_id, ctx.author().id);

    let mut description = format!("Server `{}` is banned", guild_id);
    let joined = ctx.cache().guild(guild_id).is_some();
    if joined {
        guild_id.leave(ctx.http()).await?;
        description.push_str(" and the bot has left it");
    }

    let embed = embeds::success_embed()
        .title("Server Banned")
        .description(description);

    reply(ctx, embed).await
}

/// Allow a banned server to add the bot again
#[poise::command(slash_command, owners_only)]
pub async fn unbanguild(
    ctx: Context<'_>,
    #[description = "Server id"] guild_id: String,
) -> Result<(), Error> {
    let guild_id = parse_guild_id(&guild_id)?;

    let removed = banned_guilds::unban(&ctx.data().pool, guild_id.get() as i64).await?;

    let embed = if removed {
        info!("Guild {} unbanned by {}", guild_id, ctx.author().id);
        embeds::success_embed()
            .title("Server Unbanned")
            .description(format!("Server `{}` may add the bot again", guild_id))
    } else {
        embeds::error_embed()
            .title("Not Banned")
            .description(format!("Server `{}` is not on the ban list", guild_id))
    };

    reply(ctx, embed).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_guild_id() {
        assert_eq!(parse_guild_id(" 123 ").unwrap(), GuildId::new(123));
        assert!(parse_guild_id("0").is_err());
        assert!(parse_guild_id("abc").is_err());
        assert!(parse_guild_id("-5").is_err());
    }
}
