use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serenity::all::{ChannelId, Context, EditChannel, GuildId};
use tokio::time::{interval, sleep};
use tracing::{debug, error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::intervals::CLOCK_UPDATE_MINUTES;
use crate::db::models::TimeChannelConfig;
use crate::db::queries::time_channels;
use crate::services::clock::formatter::{clock_names, delay_until_boundary};

/// Fill the in-memory config cache from the database
pub async fn load_configs(data: &Arc<Data>) -> Result<usize, Error> {
    let configs = time_channels::list_all(&data.pool).await?;
    let count = configs.len();

    for config in configs {
        data.clock_channels.insert(config.guild_id as u64, config);
    }

    Ok(count)
}

/// Rename a channel unless it already has `name`. Returns whether it was renamed.
async fn rename_if_changed(ctx: &Context, guild_id: GuildId, channel_id: ChannelId, name: &str) -> Result<bool, Error> {
    let current = ctx
        .cache
        .guild(guild_id)
        .and_then(|guild| guild.channels.get(&channel_id).map(|c| c.name.clone()));

    let Some(current) = current else {
        debug!("Clock channel {} not found in guild {}", channel_id, guild_id);
        return Ok(false);
    };

    if current == name {
        return Ok(false);
    }

    channel_id
        .edit(&ctx.http, EditChannel::new().name(name))
        .await?;

    Ok(true)
}

/// Bring one guild's clock channels up to date
pub async fn update_guild(ctx: &Context, config: &TimeChannelConfig) -> usize {
    let guild_id = GuildId::new(config.guild_id as u64);
    let names = clock_names(Utc::now());
    let mut renamed = 0;

    let targets = [
        (config.date_channel_id, names.date.as_str()),
        (config.india_channel_id, names.india.as_str()),
        (config.japan_channel_id, names.japan.as_str()),
    ];

    for (channel, name) in targets {
        match rename_if_changed(ctx, guild_id, ChannelId::new(channel as u64), name).await {
            Ok(true) => renamed += 1,
            Ok(false) => {}
            Err(e) => warn!("Failed to rename clock channel {} in guild {}: {}", channel, guild_id, e),
        }
    }

    renamed
}

async fn update_all(ctx: &Context, data: &Arc<Data>) {
    // Snapshot so no map guard is held across awaits
    let configs: Vec<TimeChannelConfig> = data
        .clock_channels
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    for config in configs {
        let renamed = update_guild(ctx, &config).await;
        if renamed > 0 {
            debug!("Renamed {} clock channels in guild {}", renamed, config.guild_id);
        }
    }
}

/// Start the clock channel background task
pub fn spawn_clock_updater(ctx: Context, data: Arc<Data>) {
    tokio::spawn(async move {
        match load_configs(&data).await {
            Ok(count) => info!("Loaded {} clock channel configs", count),
            Err(e) => error!("Failed to load clock channel configs: {}", e),
        }

        sleep(delay_until_boundary(Utc::now(), CLOCK_UPDATE_MINUTES)).await;

        let mut ticker = interval(Duration::from_secs(u64::from(CLOCK_UPDATE_MINUTES) * 60));

        loop {
            ticker.tick().await;
            update_all(&ctx, &data).await;
        }
    });
}
