use chrono::{DateTime, Utc};
use serenity::all::RoleId;

use crate::services::clock::formatter::ist;
use crate::services::youtube::client::{BroadcastStatus, LatestVideo};

/// Words kept from a title when recording what was last announced
const TITLE_PREVIEW_WORDS: usize = 3;

/// Whether `latest` is news compared to what was recorded for a subscription:
/// a different video, or the same video going live after being announced as
/// upcoming or as a plain upload.
pub fn should_notify(stored_id: Option<&str>, stored_status: Option<&str>, latest: &LatestVideo) -> bool {
    if stored_id != Some(latest.video_id.as_str()) {
        return true;
    }

    let previous = stored_status.map(BroadcastStatus::parse).unwrap_or_default();
    latest.status == BroadcastStatus::Live && previous != BroadcastStatus::Live
}

pub fn title_preview(title: &str) -> String {
    title
        .split_whitespace()
        .take(TITLE_PREVIEW_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

fn activity_line(status: BroadcastStatus, scheduled: Option<DateTime<Utc>>) -> String {
    match status {
        BroadcastStatus::Live => "is now LIVE".to_string(),
        BroadcastStatus::Upcoming => match scheduled {
            Some(start) => format!(
                "has scheduled a new Premiere:\n*Starts on {}*",
                start.with_timezone(&ist()).format("%d %B, %Y at %H:%M IST")
            ),
            None => "has scheduled a new Premiere".to_string(),
        },
        BroadcastStatus::None => "just uploaded a new video".to_string(),
    }
}

/// Message posted to the subscribed Discord channel
pub fn announcement(role: Option<RoleId>, video: &LatestVideo, scheduled: Option<DateTime<Utc>>) -> String {
    let greeting = match role {
        Some(role) => format!("Hey <@&{}>!", role),
        None => "Hey!".to_string(),
    };

    format!(
        "{} **{}** {}:\n\n**{}**\n{}",
        greeting,
        video.channel_title,
        activity_line(video.status, scheduled),
        video.title,
        video.url()
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn video(id: &str, status: BroadcastStatus) -> LatestVideo {
        LatestVideo {
            video_id: id.to_string(),
            title: "Building a Discord bot in one sitting".to_string(),
            channel_title: "Creator".to_string(),
            status,
        }
    }

    #[test]
    fn test_new_video_is_news() {
        let latest = video("new", BroadcastStatus::None);
        assert!(should_notify(Some("old"), Some("none"), &latest));
        assert!(should_notify(None, None, &latest));
        assert!(!should_notify(Some("new"), Some("none"), &latest));
    }

    #[test]
    fn test_upcoming_going_live_is_news_once() {
        let latest = video("v1", BroadcastStatus::Live);
        assert!(should_notify(Some("v1"), Some("upcoming"), &latest));
        assert!(!should_notify(Some("v1"), Some("live"), &latest));
    }

    #[test]
    fn test_title_preview() {
        assert_eq!(title_preview("Building a Discord bot in one sitting"), "Building a Discord");
        assert_eq!(title_preview("  Short  "), "Short");
    }

    #[test]
    fn test_upload_announcement() {
        let message = announcement(Some(RoleId::new(7)), &video("v1", BroadcastStatus::None), None);
        assert_eq!(
            message,
            "Hey <@&7>! **Creator** just uploaded a new video:\n\n\
             **Building a Discord bot in one sitting**\nhttps://www.youtube.com/watch?v=v1"
        );
    }

    #[test]
    fn test_premiere_announcement_in_ist() {
        let start = Utc.with_ymd_and_hms(2026, 10, 16, 14, 30, 0).unwrap();
        let message = announcement(None, &video("v2", BroadcastStatus::Upcoming), Some(start));

        assert!(message.starts_with("Hey! **Creator** has scheduled a new Premiere:\n"));
        assert!(message.contains("*Starts on 16 October, 2026 at 20:00 IST*"));
    }

    #[test]
    fn test_live_announcement() {
        let message = announcement(None, &video("v3", BroadcastStatus::Live), None);
        assert!(message.contains("**Creator** is now LIVE:"));
    }
}
