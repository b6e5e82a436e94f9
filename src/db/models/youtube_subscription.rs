use chrono::{DateTime, Utc};

/// A guild following a YouTube channel
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct YouTubeSubscription {
    pub guild_id: i64,
    pub yt_channel_id: String,
    pub discord_channel_id: i64,
    pub role_id: Option<i64>,
    pub yt_channel_name: String,
    /// Last video announced (or seen at setup)
    pub latest_video_id: Option<String>,
    /// `none`, `upcoming` or `live` at the time it was recorded
    pub last_video_status: Option<String>,
    pub latest_video_title_preview: Option<String>,
    pub last_updated_at: DateTime<Utc>,
}
