use chrono::{DateTime, Utc};

/// Role granted once a member reaches `level`
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LevelReward {
    pub guild_id: i64,
    pub level: i64,
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
}

impl LevelReward {
    pub fn new(guild_id: i64, level: i64, role_id: i64) -> Self {
        Self {
            guild_id,
            level,
            role_id,
            created_at: Utc::now(),
        }
    }
}
