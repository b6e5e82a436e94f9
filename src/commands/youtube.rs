use poise::serenity_prelude::{CreateEmbed, GuildChannel, Role};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::db::queries::youtube::{self, VideoMarker};
use crate::services::youtube::announcer::title_preview;
use crate::utils::formatting::{mention_channel, mention_role};

/// YouTube channel ids are `UC` followed by 22 url-safe characters
fn is_channel_id(value: &str) -> bool {
    value.len() == 24
        && value.starts_with("UC")
        && value[2..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn normalize_handle(handle: &str) -> String {
    let handle = handle.trim();
    let handle = handle
        .rsplit_once("youtube.com/")
        .map(|(_, rest)| rest)
        .unwrap_or(handle);
    handle.trim_end_matches('/').to_string()
}

async fn reply(ctx: Context<'_>, embed: CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Look up the channel id behind a YouTube handle
#[poise::command(slash_command, rename = "find-youtube-channel-id")]
pub async fn find_youtube_channel_id(
    ctx: Context<'_>,
    #[description = "Handle or channel name, e.g. @creator"] handle: String,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let query = normalize_handle(&handle);
    let found = ctx.data().youtube.find_channel(&query).await?;

    let embed = match found {
        Some(channel) => {
            let mut embed = embeds::youtube_embed()
                .title(channel.title.clone())
                .description(format!("Channel ID: `{}`", channel.channel_id))
                .url(format!("https://www.youtube.com/channel/{}", channel.channel_id));
            if let Some(thumbnail) = channel.thumbnail_url {
                embed = embed.thumbnail(thumbnail);
            }
            embed
        }
        None => embeds::error_embed()
            .title("Not Found")
            .description(format!("No YouTube channel matches `{}`", query)),
    };

    reply(ctx, embed).await
}

/// Announce new uploads and live streams from a YouTube channel
#[poise::command(
    slash_command,
    rename = "setup-youtube-notifications",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn setup_youtube_notifications(
    ctx: Context<'_>,
    #[description = "YouTube channel id (starts with UC)"] yt_channel_id: String,
    #[description = "Channel for announcements"]
    #[channel_types("Text", "News")]
    channel: GuildChannel,
    #[description = "Role to mention"] role: Option<Role>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let yt_channel_id = yt_channel_id.trim().to_string();

    if !is_channel_id(&yt_channel_id) {
        return Err(Error::InvalidOperation(
            "Invalid YouTube channel id. It starts with `UC`; use /find-youtube-channel-id to look it up"
                .to_string(),
        ));
    }

    ctx.defer_ephemeral().await?;

    // The current latest video counts as already seen
    let latest = ctx.data().youtube.latest_video(&yt_channel_id).await?;
    let preview = latest.as_ref().map(|v| title_preview(&v.title));
    let name = latest
        .as_ref()
        .map(|v| v.channel_title.clone())
        .unwrap_or_else(|| yt_channel_id.clone());

    youtube::upsert(
        &ctx.data().pool,
        guild_id.get() as i64,
        &yt_channel_id,
        channel.id.get() as i64,
        role.as_ref().map(|r| r.id.get() as i64),
        &name,
        VideoMarker {
            video_id: latest.as_ref().map(|v| v.video_id.as_str()),
            status: latest.as_ref().map(|v| v.status.as_str()),
            title_preview: preview.as_deref(),
        },
    )
    .await?;

    let mut lines = vec![
        format!("Channel: **{}**", name),
        format!("Announcements in {}", mention_channel(channel.id.get())),
    ];
    if let Some(role) = &role {
        lines.push(format!("Mentioning {}", mention_role(role.id.get())));
    }

    let embed = embeds::success_embed()
        .title("YouTube Notifications Enabled")
        .description(embeds::bullet_list(&lines));

    reply(ctx, embed).await
}

/// Stop announcing a YouTube channel
#[poise::command(
    slash_command,
    rename = "disable-youtube-notifications",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn disable_youtube_notifications(
    ctx: Context<'_>,
    #[description = "YouTube channel id"] yt_channel_id: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let yt_channel_id = yt_channel_id.trim();

    let removed = youtube::remove(&ctx.data().pool, guild_id.get() as i64, yt_channel_id).await?;

    let embed = if removed {
        embeds::success_embed()
            .title("YouTube Notifications Disabled")
            .description(format!("`{}` will no longer be announced", yt_channel_id))
    } else {
        embeds::error_embed()
            .title("Not Found")
            .description(format!("This server does not follow `{}`", yt_channel_id))
    };

    reply(ctx, embed).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_id_shape() {
        assert!(is_channel_id("UC_x5XG1OV2P6uZZ5FSM9Ttw"));
        assert!(!is_channel_id("_x5XG1OV2P6uZZ5FSM9TtwUC"));
        assert!(!is_channel_id("UCshort"));
        assert!(!is_channel_id("UC_x5XG1OV2P6uZZ5FSM9Tt!"));
    }

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle(" @creator "), "@creator");
        assert_eq!(normalize_handle("https://www.youtube.com/@creator/"), "@creator");
    }
}
