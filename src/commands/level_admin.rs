use poise::serenity_prelude::{GuildChannel, Role};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::constants::leveling::{AUTO_RESET_MAX_DAYS, AUTO_RESET_MIN_DAYS};
use crate::db::queries::{auto_reset, level_notify, level_rewards};
use crate::services::leveling::{reset, roles};
use crate::utils::formatting::{mention_channel, mention_role};

/// Grant a role when members reach a level
#[poise::command(
    slash_command,
    rename = "setup-level-reward",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn setup_level_reward(
    ctx: Context<'_>,
    #[description = "Level that unlocks the role"]
    #[min = 1]
    level: i64,
    #[description = "Role to grant"] role: Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    if level < 1 {
        return Err(Error::InvalidOperation("Level must be at least 1".to_string()));
    }

    level_rewards::upsert(
        &ctx.data().pool,
        guild_id.get() as i64,
        level,
        role.id.get() as i64,
    )
    .await?;

    let embed = embeds::success_embed()
        .title("Level Reward Set")
        .description(format!(
            "Members reaching **Level {}** will receive {}",
            level,
            mention_role(role.id.get())
        ));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Stop granting a role at a level
#[poise::command(
    slash_command,
    rename = "remove-level-reward",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn remove_level_reward(
    ctx: Context<'_>,
    #[description = "Level whose reward should be removed"] level: i64,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let removed = level_rewards::remove(&ctx.data().pool, guild_id.get() as i64, level).await?;

    let embed = if removed {
        embeds::success_embed()
            .title("Level Reward Removed")
            .description(format!("No role is granted at **Level {}** anymore", level))
    } else {
        embeds::error_embed()
            .title("Not Found")
            .description(format!("There is no reward for **Level {}**", level))
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// List the configured level rewards
#[poise::command(
    slash_command,
    rename = "level-reward-show",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn level_reward_show(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let mut rules = level_rewards::list_desc(&ctx.data().pool, guild_id.get() as i64).await?;
    rules.reverse();

    let description = if rules.is_empty() {
        "No level rewards configured. Use `/setup-level-reward` to add one.".to_string()
    } else {
        embeds::bullet_list(
            &rules
                .iter()
                .map(|r| format!("Level **{}** → {}", r.level, mention_role(r.role_id as u64)))
                .collect::<Vec<_>>(),
        )
    };

    let embed = embeds::info_embed()
        .title("Level Rewards")
        .description(description);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Choose where level-up announcements are posted
#[poise::command(
    slash_command,
    rename = "notify-level-msg",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn notify_level_msg(
    ctx: Context<'_>,
    #[description = "Channel for level-up messages"]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    level_notify::set_channel(
        &ctx.data().pool,
        guild_id.get() as i64,
        channel.id.get() as i64,
    )
    .await?;

    let embed = embeds::success_embed()
        .title("Level-Up Channel Set")
        .description(format!(
            "Level-up messages will be posted in {}",
            mention_channel(channel.id.get())
        ));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Reset XP automatically every few days
#[poise::command(
    slash_command,
    rename = "set-auto-reset",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn set_auto_reset(
    ctx: Context<'_>,
    #[description = "Interval in days (1-365)"]
    #[min = 1]
    #[max = 365]
    days: i32,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    if !(AUTO_RESET_MIN_DAYS..=AUTO_RESET_MAX_DAYS).contains(&days) {
        return Err(Error::InvalidOperation(format!(
            "Days must be between {} and {}",
            AUTO_RESET_MIN_DAYS, AUTO_RESET_MAX_DAYS
        )));
    }

    let schedule = auto_reset::upsert(&ctx.data().pool, guild_id.get() as i64, days).await?;

    let embed = embeds::success_embed()
        .title("Auto-Reset Scheduled")
        .description(format!(
            "XP, levels and reward roles will reset every **{}** day(s).\nNext reset: <t:{}:R>",
            days,
            (schedule.last_reset + chrono::Duration::days(i64::from(days))).timestamp()
        ));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Cancel the automatic XP reset
#[poise::command(
    slash_command,
    rename = "stop-auto-reset",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn stop_auto_reset(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let removed = auto_reset::remove(&ctx.data().pool, guild_id.get() as i64).await?;

    let embed = if removed {
        embeds::success_embed()
            .title("Auto-Reset Stopped")
            .description("XP will no longer reset automatically")
    } else {
        embeds::error_embed()
            .title("Not Scheduled")
            .description("This server has no auto-reset configured")
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Reset all XP and levels and remove reward roles
#[poise::command(
    slash_command,
    rename = "reset-xp",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn reset_xp(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    ctx.defer_ephemeral().await?;

    let report = reset::reset_guild(
        &ctx.data().pool,
        ctx.serenity_context(),
        &ctx.data().xp_locks,
        guild_id,
    )
    .await?;

    let mut lines = vec![
        format!("Members reset: **{}**", report.members_reset),
        format!("Reward roles removed from: **{}**", report.roles_stripped),
    ];
    if report.errors > 0 {
        lines.push(format!("Failures (check role hierarchy): **{}**", report.errors));
    }

    let embed = embeds::success_embed()
        .title("XP Reset")
        .description(embeds::bullet_list(&lines));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

/// Give every tracked member the reward role matching their level
#[poise::command(
    slash_command,
    rename = "sync-level-roles",
    required_permissions = "ADMINISTRATOR",
    guild_only
)]
pub async fn sync_level_roles(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    ctx.defer_ephemeral().await?;

    let report = roles::sync_guild_roles(&ctx.data().pool, ctx.serenity_context(), guild_id).await?;

    let mut lines = vec![
        format!("Updated: **{}**", report.changed),
        format!("Already correct: **{}**", report.unchanged.saturating_sub(report.errors)),
    ];
    if report.errors > 0 {
        lines.push(format!("Failed (check role hierarchy): **{}**", report.errors));
    }

    let embed = embeds::success_embed()
        .title("Level Roles Synced")
        .description(embeds::bullet_list(&lines));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
