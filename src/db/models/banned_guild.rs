use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BannedGuild {
    pub guild_id: i64,
    pub banned_by: i64,
    pub banned_at: DateTime<Utc>,
}
