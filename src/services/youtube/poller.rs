use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, Context, GuildId, RoleId};
use tokio::time::{interval, sleep};
use tracing::{debug, error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::intervals::{format_duration, YOUTUBE_POLL_INTERVAL};
use crate::db::models::YouTubeSubscription;
use crate::db::queries::youtube::{self, VideoMarker};
use crate::services::clock::formatter::delay_until_boundary;
use crate::services::youtube::announcer::{announcement, should_notify, title_preview};
use crate::services::youtube::client::{BroadcastStatus, LatestVideo};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub channels_checked: usize,
    pub announcements: usize,
    pub errors: usize,
}

/// Subscriptions grouped by YouTube channel, so each channel costs one search
fn group_by_channel(subscriptions: Vec<YouTubeSubscription>) -> BTreeMap<String, Vec<YouTubeSubscription>> {
    let mut groups: BTreeMap<String, Vec<YouTubeSubscription>> = BTreeMap::new();
    for subscription in subscriptions {
        groups
            .entry(subscription.yt_channel_id.clone())
            .or_default()
            .push(subscription);
    }
    groups
}

/// The role to mention, if it still exists
fn mention_role(ctx: &Context, subscription: &YouTubeSubscription) -> Option<RoleId> {
    let role = RoleId::new(subscription.role_id? as u64);
    let guild_id = GuildId::new(subscription.guild_id as u64);

    ctx.cache
        .guild(guild_id)
        .map(|guild| guild.roles.contains_key(&role))
        .unwrap_or(true)
        .then_some(role)
}

async fn handle_channel(
    ctx: &Context,
    data: &Arc<Data>,
    yt_channel_id: &str,
    subscriptions: &[YouTubeSubscription],
) -> Result<usize, Error> {
    let Some(latest) = data.youtube.latest_video(yt_channel_id).await? else {
        debug!("No videos found for YouTube channel {}", yt_channel_id);
        return Ok(0);
    };

    let mut scheduled = None;
    let mut announced = 0;

    for subscription in subscriptions {
        let stored_id = subscription.latest_video_id.as_deref();
        let stored_status = subscription.last_video_status.as_deref();

        if stored_id == Some(latest.video_id.as_str())
            && stored_status == Some(latest.status.as_str())
        {
            continue;
        }

        if should_notify(stored_id, stored_status, &latest) {
            if latest.status == BroadcastStatus::Upcoming && scheduled.is_none() {
                scheduled = match data.youtube.scheduled_start(&latest.video_id).await {
                    Ok(start) => start,
                    Err(e) => {
                        warn!("Could not fetch premiere time for {}: {}", latest.video_id, e);
                        None
                    }
                };
            }

            if send_announcement(ctx, subscription, &latest, scheduled).await {
                announced += 1;
            }
        }

        let preview = title_preview(&latest.title);
        youtube::record_latest(
            &data.pool,
            subscription.guild_id,
            &subscription.yt_channel_id,
            VideoMarker {
                video_id: Some(&latest.video_id),
                status: Some(latest.status.as_str()),
                title_preview: Some(&preview),
            },
        )
        .await?;
    }

    Ok(announced)
}

async fn send_announcement(
    ctx: &Context,
    subscription: &YouTubeSubscription,
    latest: &LatestVideo,
    scheduled: Option<DateTime<Utc>>,
) -> bool {
    let channel_id = ChannelId::new(subscription.discord_channel_id as u64);
    let content = announcement(mention_role(ctx, subscription), latest, scheduled);

    match channel_id.say(&ctx.http, content).await {
        Ok(_) => {
            info!(
                "Announced {} ({}) in channel {} of guild {}",
                latest.video_id,
                latest.status.as_str(),
                channel_id,
                subscription.guild_id
            );
            true
        }
        Err(e) => {
            warn!("Cannot send YouTube announcement in {}: {}", channel_id, e);
            false
        }
    }
}

/// Check every followed YouTube channel once
pub async fn poll_once(ctx: &Context, data: &Arc<Data>) -> Result<PollReport, Error> {
    let subscriptions = youtube::list_all(&data.pool).await?;
    let mut report = PollReport::default();

    for (yt_channel_id, group) in group_by_channel(subscriptions) {
        report.channels_checked += 1;

        match handle_channel(ctx, data, &yt_channel_id, &group).await {
            Ok(announced) => report.announcements += announced,
            Err(e) => {
                warn!("Error processing YouTube channel {}: {}", yt_channel_id, e);
                report.errors += 1;
            }
        }
    }

    Ok(report)
}

/// Start the YouTube polling background task, aligned to the poll interval
pub fn spawn_youtube_poller(ctx: Context, data: Arc<Data>) {
    tokio::spawn(async move {
        let minutes = (YOUTUBE_POLL_INTERVAL.as_secs() / 60) as u32;
        let delay = delay_until_boundary(Utc::now(), minutes);
        info!(
            "YouTube polling every {}, first check in {}",
            format_duration(YOUTUBE_POLL_INTERVAL),
            format_duration(delay)
        );
        sleep(delay).await;

        let mut ticker = interval(YOUTUBE_POLL_INTERVAL);

        loop {
            ticker.tick().await;

            match poll_once(&ctx, &data).await {
                Ok(report) => debug!(
                    "YouTube check complete: {} channels, {} announcements, {} errors",
                    report.channels_checked, report.announcements, report.errors
                ),
                Err(e) => error!("Error polling YouTube: {}", e),
            }
        }
    });
}
