use std::sync::Arc;

use serenity::all::{Context, CreateMessage, Guild};
use tracing::{debug, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::db::queries::banned_guilds;

fn banned_notice(guild_name: &str) -> String {
    format!(
        "This bot has been blocked from **{}** by its owners, so it has left the server.",
        guild_name
    )
}

/// Leave a newly joined guild if it is on the ban list
pub async fn handle_guild_join(ctx: &Context, data: &Arc<Data>, guild: &Guild) -> Result<(), Error> {
    if !banned_guilds::is_banned(&data.pool, guild.id.get() as i64).await? {
        info!("Joined guild {} ({})", guild.name, guild.id);
        return Ok(());
    }

    info!("Joined banned guild {} ({}), leaving", guild.name, guild.id);

    let notice = CreateMessage::new().content(banned_notice(&guild.name));
    if let Err(e) = guild.owner_id.direct_message(ctx, notice).await {
        debug!("Could not DM owner of banned guild {}: {}", guild.id, e);
    }

    guild.id.leave(&ctx.http).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banned_notice_names_guild() {
        assert!(banned_notice("Test Server").contains("**Test Server**"));
    }
}
