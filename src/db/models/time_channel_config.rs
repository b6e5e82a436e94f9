use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TimeChannelConfig {
    pub guild_id: i64,
    pub date_channel_id: i64,
    pub india_channel_id: i64,
    pub japan_channel_id: i64,
    pub updated_at: DateTime<Utc>,
}
