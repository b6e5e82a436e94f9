use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents, GuildId, UserId};
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::commands;
use crate::config::Settings;
use crate::handlers::event_handler::event_handler;
use crate::services::clock::updater::spawn_clock_updater;
use crate::services::leveling::reset::spawn_auto_reset_checker;
use crate::services::leveling::voice_ticker::spawn_voice_ticker;
use crate::services::youtube::poller::spawn_youtube_poller;

fn all_commands() -> Vec<poise::Command<Arc<Data>, Error>> {
    vec![
        commands::help::help(),
        commands::config::show_config(),
        commands::level::level(),
        commands::level::leaderboard(),
        commands::level_admin::setup_level_reward(),
        commands::level_admin::remove_level_reward(),
        commands::level_admin::level_reward_show(),
        commands::level_admin::notify_level_msg(),
        commands::level_admin::set_auto_reset(),
        commands::level_admin::stop_auto_reset(),
        commands::level_admin::reset_xp(),
        commands::level_admin::sync_level_roles(),
        commands::restrictions::setup_no_text(),
        commands::restrictions::remove_no_text(),
        commands::restrictions::no_discord_link(),
        commands::restrictions::remove_no_discord_link(),
        commands::restrictions::no_links(),
        commands::restrictions::remove_no_links(),
        commands::restrictions::bypass_no_text(),
        commands::restrictions::show_bypass_roles(),
        commands::restrictions::remove_bypass_role(),
        commands::time_channels::setup_time_channels(),
        commands::youtube::find_youtube_channel_id(),
        commands::youtube::setup_youtube_notifications(),
        commands::youtube::disable_youtube_notifications(),
        commands::owner::guilds::leaveserver(),
        commands::owner::guilds::banguild(),
        commands::owner::guilds::unbanguild(),
    ]
}

async fn register_commands(
    ctx: &serenity::Context,
    commands: &[poise::Command<Arc<Data>, Error>],
    guild_id: Option<u64>,
) -> Result<(), Error> {
    match guild_id {
        Some(guild_id) => {
            let guild_id = GuildId::new(guild_id);

            // Stale global commands would show up twice next to the guild ones
            match ctx.http.get_global_commands().await {
                Ok(global_commands) => {
                    for cmd in &global_commands {
                        if let Err(e) = ctx.http.delete_global_command(cmd.id).await {
                            warn!("Failed to delete global command {}: {:?}", cmd.name, e);
                        }
                    }
                }
                Err(e) => warn!("Could not check for global commands: {:?}", e),
            }

            poise::builtins::register_in_guild(ctx, commands, guild_id)
                .await
                .map_err(|e| {
                    error!("Failed to register guild commands in {}: {:?}", guild_id, e);
                    Error::Serenity(e)
                })?;
            info!("Registered {} commands in guild {}", commands.len(), guild_id);
        }
        None => {
            poise::builtins::register_globally(ctx, commands)
                .await
                .map_err(|e| {
                    error!("Failed to register commands globally: {:?}", e);
                    Error::Serenity(e)
                })?;
            info!(
                "Registered {} commands globally (may take up to 1 hour to appear)",
                commands.len()
            );
        }
    }

    Ok(())
}

pub async fn run(settings: Settings, pool: PgPool) -> Result<(), Error> {
    let data = Arc::new(Data::new(pool, settings.clone()));

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            owners: settings.owner_ids.iter().copied().map(UserId::new).collect(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: None, // Slash commands only
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error in /{}: {:?}", ctx.command().name, error);
                            let _ = ctx.say(format!("Error: {}", error)).await;
                        }
                        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
                            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
                        }
                        poise::FrameworkError::NotAnOwner { ctx, .. } => {
                            let _ = ctx.say("This command is restricted to bot owners.").await;
                        }
                        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
                            let _ = ctx
                                .say("You don't have permission to use this command.")
                                .await;
                        }
                        poise::FrameworkError::UnknownCommand { .. } => {
                            // Pings and prefix attempts land here
                        }
                        err => {
                            error!("Framework error: {:?}", err);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as {}", ready.user.name);

                spawn_voice_ticker(ctx.clone(), data.clone());
                info!("Started voice XP ticker");

                spawn_auto_reset_checker(ctx.clone(), data.clone());
                info!("Started auto-reset checker");

                spawn_clock_updater(ctx.clone(), data.clone());
                info!("Started clock channel updater");

                spawn_youtube_poller(ctx.clone(), data.clone());
                info!("Started YouTube poller");

                register_commands(ctx, &framework.options().commands, data.settings.guild_id)
                    .await?;

                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&settings.discord_token, intents)
        .framework(framework)
        .await
        .map_err(Error::Serenity)?;

    info!("Starting Discord client...");
    client.start().await.map_err(Error::Serenity)
}
