use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::db::queries::{auto_reset, level_notify, level_rewards, restrictions, time_channels, youtube};
use crate::utils::formatting::{mention_channel, mention_role};

fn or_none(lines: Vec<String>) -> String {
    if lines.is_empty() {
        "Not configured".to_string()
    } else {
        embeds::bullet_list(&lines)
    }
}

/// Show how the bot is configured in this server
#[poise::command(
    slash_command,
    rename = "show-config",
    required_permissions = "MANAGE_GUILD",
    guild_only
)]
pub async fn show_config(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let pool = &ctx.data().pool;
    let guild = guild_id.get() as i64;

    ctx.defer_ephemeral().await?;

    let mut leveling = vec![format!("Reward roles: **{}**", level_rewards::count(pool, guild).await?)];
    if let Some(channel) = level_notify::get_channel(pool, guild).await? {
        leveling.push(format!("Level-up channel: {}", mention_channel(channel as u64)));
    }
    if let Some(schedule) = auto_reset::get(pool, guild).await? {
        leveling.push(format!(
            "Auto-reset every **{}** day(s), last <t:{}:R>",
            schedule.days,
            schedule.last_reset.timestamp()
        ));
    }

    let mut restricted = Vec::new();
    for channel in restrictions::list_no_text(pool, guild).await? {
        restricted.push(format!(
            "{} media-only → {}",
            mention_channel(channel.channel_id as u64),
            mention_channel(channel.redirect_channel_id as u64)
        ));
    }
    for restriction in restrictions::list_link_filters(pool, guild).await? {
        if let Some(filter) = restriction.filter() {
            restricted.push(format!(
                "{} {}",
                mention_channel(restriction.channel_id as u64),
                filter.label()
            ));
        }
    }
    let bypass = restrictions::list_bypass_roles(pool, guild).await?;
    if !bypass.is_empty() {
        restricted.push(format!(
            "Bypass: {}",
            bypass
                .iter()
                .map(|r| mention_role(*r as u64))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    let clock = time_channels::get(pool, guild)
        .await?
        .map(|config| {
            vec![
                format!("Date: {}", mention_channel(config.date_channel_id as u64)),
                format!("India: {}", mention_channel(config.india_channel_id as u64)),
                format!("Japan: {}", mention_channel(config.japan_channel_id as u64)),
            ]
        })
        .unwrap_or_default();

    let subscriptions = youtube::list_for_guild(pool, guild)
        .await?
        .into_iter()
        .map(|s| {
            let role = s
                .role_id
                .map(|r| format!(" ({})", mention_role(r as u64)))
                .unwrap_or_default();
            format!(
                "**{}** → {}{}",
                s.yt_channel_name,
                mention_channel(s.discord_channel_id as u64),
                role
            )
        })
        .collect::<Vec<_>>();

    let embed = embeds::info_embed()
        .title("Server Configuration")
        .field("Leveling", embeds::bullet_list(&leveling), false)
        .field("Channel Restrictions", or_none(restricted), false)
        .field("Time Channels", or_none(clock), false)
        .field("YouTube", or_none(subscriptions), false);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
