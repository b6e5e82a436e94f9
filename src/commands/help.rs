use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds::{self, section};

const EVERYONE: &[&str] = &[
    "`/level [member]` Level and XP of a member",
    "`/leaderboard` Top members by XP",
    "`/find-youtube-channel-id` Look up a YouTube channel id",
];

const LEVELING: &[&str] = &[
    "`/setup-level-reward` Grant a role at a level",
    "`/remove-level-reward` Remove a level reward",
    "`/level-reward-show` List level rewards",
    "`/notify-level-msg` Set the level-up channel",
    "`/set-auto-reset` / `/stop-auto-reset` Periodic XP reset",
    "`/reset-xp` Reset XP now",
    "`/sync-level-roles` Fix reward roles for everyone",
];

const RESTRICTIONS: &[&str] = &[
    "`/setup-no-text` / `/remove-no-text` Media-only channels",
    "`/no-discord-link` / `/remove-no-discord-link` Block invites",
    "`/no-links` / `/remove-no-links` Block all links",
    "`/bypass-no-text` / `/show-bypass-roles` / `/remove-bypass-role` Bypass roles",
];

const UTILITIES: &[&str] = &[
    "`/setup-time-channels` Date and time channels",
    "`/setup-youtube-notifications` / `/disable-youtube-notifications` YouTube alerts",
    "`/show-config` Current configuration",
];

const OWNER: &[&str] = &[
    "`/leaveserver` Leave a server",
    "`/banguild` / `/unbanguild` Manage the server ban list",
];

/// List the available commands
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let mut sections = vec![
        section("Everyone", &embeds::bullet_list(EVERYONE)),
        section("Leveling (admin)", &embeds::bullet_list(LEVELING)),
        section("Channel Restrictions (admin)", &embeds::bullet_list(RESTRICTIONS)),
        section("Utilities", &embeds::bullet_list(UTILITIES)),
    ];

    if ctx.framework().options().owners.contains(&ctx.author().id) {
        sections.push(section("Bot Owner", &embeds::bullet_list(OWNER)));
    }

    let embed = embeds::standard_embed()
        .title("Supporter Bot Commands")
        .description(sections.join(&format!("\n{}\n", embeds::DIVIDER)));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
