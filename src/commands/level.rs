use poise::serenity_prelude::User;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds::{self, DIVIDER};
use crate::constants::leveling::LEADERBOARD_SIZE;
use crate::db::models::UserProgress;
use crate::db::queries::users;
use crate::utils::formatting::{format_number, level_progress_bar, rank_label};

const PROGRESS_BAR_WIDTH: usize = 12;

/// Show the level and XP of a member
#[poise::command(slash_command, guild_only)]
pub async fn level(
    ctx: Context<'_>,
    #[description = "Member to look up (defaults to yourself)"] member: Option<User>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let target = member.as_ref().unwrap_or_else(|| ctx.author());

    let progress = users::get(&ctx.data().pool, guild_id.get() as i64, target.id.get() as i64)
        .await?
        .unwrap_or_else(|| UserProgress::new(guild_id.get() as i64, target.id.get() as i64));

    let embed = embeds::standard_embed()
        .title(format!("Level of {}", target.name))
        .thumbnail(target.face())
        .description(format!(
            "**Level {}**\n{}\n{}",
            progress.level,
            level_progress_bar(progress.xp, PROGRESS_BAR_WIDTH),
            DIVIDER
        ))
        .field("Total XP", format_number(progress.xp), true)
        .field(
            "Voice XP",
            format!(
                "{} / {}",
                format_number(progress.voice_xp_earned),
                format_number(ctx.data().settings.voice.cap)
            ),
            true,
        );

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show the members with the most XP
#[poise::command(slash_command, guild_only)]
pub async fn leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let top = users::top_by_xp(&ctx.data().pool, guild_id.get() as i64, LEADERBOARD_SIZE).await?;

    let description = if top.iter().all(|p| p.xp == 0) {
        "Nobody has earned XP yet. Start chatting!".to_string()
    } else {
        top.iter()
            .filter(|p| p.xp > 0)
            .enumerate()
            .map(|(i, p)| {
                format!(
                    "{} <@{}> • Level **{}** • {} XP",
                    rank_label(i + 1),
                    p.user_id,
                    p.level,
                    format_number(p.xp)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let embed = embeds::leaderboard_embed()
        .title("🏆 Leaderboard")
        .description(description);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
