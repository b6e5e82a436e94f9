use poise::serenity_prelude::{CreateEmbed, GuildChannel, Role};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::db::models::LinkFilter;
use crate::db::queries::restrictions;
use crate::utils::formatting::{mention_channel, mention_role};

async fn reply(ctx: Context<'_>, embed: CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

async fn enable_filter(ctx: Context<'_>, channel: &GuildChannel, filter: LinkFilter) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let added = restrictions::add_link_filter(
        &ctx.data().pool,
        guild_id.get() as i64,
        channel.id.get() as i64,
        filter,
    )
    .await?;

    let embed = if added {
        embeds::success_embed()
            .title(format!("{} Enabled", filter.label()))
            .description(format!("Restriction applied to {}", mention_channel(channel.id.get())))
    } else {
        embeds::info_embed()
            .title("Already Enabled")
            .description(format!(
                "{} already has **{}**",
                mention_channel(channel.id.get()),
                filter.label()
            ))
    };

    reply(ctx, embed).await
}

async fn disable_filter(ctx: Context<'_>, channel: &GuildChannel, filter: LinkFilter) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let removed = restrictions::remove_link_filter(
        &ctx.data().pool,
        guild_id.get() as i64,
        channel.id.get() as i64,
        filter,
    )
    .await?;

    let embed = if removed {
        embeds::success_embed()
            .title(format!("{} Removed", filter.label()))
            .description(format!("Restriction lifted from {}", mention_channel(channel.id.get())))
    } else {
        embeds::error_embed()
            .title("Not Found")
            .description(format!(
                "{} does not have **{}**",
                mention_channel(channel.id.get()),
                filter.label()
            ))
    };

    reply(ctx, embed).await
}

/// Make a channel media-only
#[poise::command(
    slash_command,
    rename = "setup-no-text",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn setup_no_text(
    ctx: Context<'_>,
    #[description = "Channel that only allows media and links"]
    #[channel_types("Text")]
    channel: GuildChannel,
    #[description = "Channel where text conversations belong"]
    #[channel_types("Text")]
    redirect: GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    if channel.id == redirect.id {
        return Err(Error::InvalidOperation(
            "The redirect channel must differ from the restricted channel".to_string(),
        ));
    }

    restrictions::set_no_text(
        &ctx.data().pool,
        guild_id.get() as i64,
        channel.id.get() as i64,
        redirect.id.get() as i64,
    )
    .await?;

    let embed = embeds::success_embed()
        .title("Media-Only Channel Set")
        .description(format!(
            "Text-only messages in {} will be removed and pointed to {}",
            mention_channel(channel.id.get()),
            mention_channel(redirect.id.get())
        ));

    reply(ctx, embed).await
}

/// Allow text in a media-only channel again
#[poise::command(
    slash_command,
    rename = "remove-no-text",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn remove_no_text(
    ctx: Context<'_>,
    #[description = "Media-only channel"]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let removed = restrictions::remove_no_text(
        &ctx.data().pool,
        guild_id.get() as i64,
        channel.id.get() as i64,
    )
    .await?;

    let embed = if removed {
        embeds::success_embed()
            .title("Media-Only Removed")
            .description(format!("{} accepts text again", mention_channel(channel.id.get())))
    } else {
        embeds::error_embed()
            .title("Not Found")
            .description(format!("{} is not media-only", mention_channel(channel.id.get())))
    };

    reply(ctx, embed).await
}

/// Delete Discord invites posted in a channel
#[poise::command(
    slash_command,
    rename = "no-discord-link",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn no_discord_link(
    ctx: Context<'_>,
    #[description = "Channel to protect"]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> Result<(), Error> {
    enable_filter(ctx, &channel, LinkFilter::DiscordInvites).await
}

/// Allow Discord invites in a channel again
#[poise::command(
    slash_command,
    rename = "remove-no-discord-link",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn remove_no_discord_link(
    ctx: Context<'_>,
    #[description = "Channel to release"]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> Result<(), Error> {
    disable_filter(ctx, &channel, LinkFilter::DiscordInvites).await
}

/// Delete every link posted in a channel
#[poise::command(
    slash_command,
    rename = "no-links",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn no_links(
    ctx: Context<'_>,
    #[description = "Channel to protect"]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> Result<(), Error> {
    enable_filter(ctx, &channel, LinkFilter::AllLinks).await
}

/// Allow links in a channel again
#[poise::command(
    slash_command,
    rename = "remove-no-links",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn remove_no_links(
    ctx: Context<'_>,
    #[description = "Channel to release"]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> Result<(), Error> {
    disable_filter(ctx, &channel, LinkFilter::AllLinks).await
}

/// Let a role ignore channel restrictions
#[poise::command(
    slash_command,
    rename = "bypass-no-text",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn bypass_no_text(
    ctx: Context<'_>,
    #[description = "Role that bypasses restrictions"] role: Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    restrictions::add_bypass_role(&ctx.data().pool, guild_id.get() as i64, role.id.get() as i64)
        .await?;

    let embed = embeds::success_embed()
        .title("Bypass Role Added")
        .description(format!(
            "{} can now post freely in restricted channels",
            mention_role(role.id.get())
        ));

    reply(ctx, embed).await
}

/// List roles that bypass channel restrictions
#[poise::command(
    slash_command,
    rename = "show-bypass-roles",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn show_bypass_roles(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let roles = restrictions::list_bypass_roles(&ctx.data().pool, guild_id.get() as i64).await?;

    let description = if roles.is_empty() {
        "No bypass roles configured. Owners and administrators always bypass.".to_string()
    } else {
        embeds::bullet_list(
            &roles
                .iter()
                .map(|r| mention_role(*r as u64))
                .collect::<Vec<_>>(),
        )
    };

    let embed = embeds::info_embed()
        .title("Bypass Roles")
        .description(description);

    reply(ctx, embed).await
}

/// Stop a role from bypassing channel restrictions
#[poise::command(
    slash_command,
    rename = "remove-bypass-role",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn remove_bypass_role(
    ctx: Context<'_>,
    #[description = "Bypass role to remove"] role: Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let removed =
        restrictions::remove_bypass_role(&ctx.data().pool, guild_id.get() as i64, role.id.get() as i64)
            .await?;

    let embed = if removed {
        embeds::success_embed()
            .title("Bypass Role Removed")
            .description(format!("{} no longer bypasses restrictions", mention_role(role.id.get())))
    } else {
        embeds::error_embed()
            .title("Not Found")
            .description(format!("{} is not a bypass role", mention_role(role.id.get())))
    };

    reply(ctx, embed).await
}
