use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{debug, error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::handlers::{guild_join, message, voice_state};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!(
                "Bot ready as {} in {} guilds",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
        }

        FullEvent::Message { new_message } => {
            if let Err(e) = message::handle_message(ctx, data, new_message).await {
                error!("Message handler error: {:?}", e);
            }
        }

        FullEvent::VoiceStateUpdate { old, new } => {
            debug!("Voice state update: {:?} -> {:?}", old.as_ref().and_then(|o| o.channel_id), new.channel_id);
            if let Err(e) = voice_state::handle_voice_state_update(ctx, data, old.as_ref(), new).await {
                error!("Voice state handler error: {:?}", e);
            }
        }

        FullEvent::GuildCreate { guild, is_new } => {
            if is_new.unwrap_or(false) {
                if let Err(e) = guild_join::handle_guild_join(ctx, data, guild).await {
                    error!("Guild join handler error: {:?}", e);
                }
            }
        }

        FullEvent::GuildDelete { incomplete, .. } => {
            data.clock_channels.remove(&incomplete.id.get());
            debug!("Guild {} removed", incomplete.id);
        }

        _ => {}
    }

    Ok(())
}
