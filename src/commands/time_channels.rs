use poise::serenity_prelude::{CreateEmbedFooter, GuildChannel};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::db::queries::time_channels;
use crate::services::clock::updater;
use crate::utils::formatting::mention_channel;

/// Show the date and the India/Japan time in channel names
#[poise::command(
    slash_command,
    rename = "setup-time-channels",
    required_permissions = "MANAGE_CHANNELS",
    guild_only
)]
pub async fn setup_time_channels(
    ctx: Context<'_>,
    #[description = "Channel showing the date"]
    #[channel_types("Voice", "Text")]
    date: GuildChannel,
    #[description = "Channel showing India time"]
    #[channel_types("Voice", "Text")]
    india: GuildChannel,
    #[description = "Channel showing Japan time"]
    #[channel_types("Voice", "Text")]
    japan: GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    if date.id == india.id || date.id == japan.id || india.id == japan.id {
        return Err(Error::InvalidOperation(
            "Pick three different channels".to_string(),
        ));
    }

    ctx.defer_ephemeral().await?;

    let config = time_channels::upsert(
        &ctx.data().pool,
        guild_id.get() as i64,
        date.id.get() as i64,
        india.id.get() as i64,
        japan.id.get() as i64,
    )
    .await?;

    ctx.data().clock_channels.insert(guild_id.get(), config.clone());
    let renamed = updater::update_guild(ctx.serenity_context(), &config).await;

    let embed = embeds::success_embed()
        .title("Time Channels Set")
        .description(embeds::bullet_list(&[
            format!("Date: {}", mention_channel(date.id.get())),
            format!("India: {}", mention_channel(india.id.get())),
            format!("Japan: {}", mention_channel(japan.id.get())),
        ]))
        .footer(CreateEmbedFooter::new(format!(
            "{} channel(s) renamed now, updated every 10 minutes",
            renamed
        )));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
