use chrono::{DateTime, Utc};

use crate::constants::leveling::level_for_xp;

/// XP record for one member of one guild
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserProgress {
    pub guild_id: i64,
    pub user_id: i64,
    pub xp: i64,
    pub level: i64,
    /// Voice-sourced XP since the last reset, bounded by the voice cap
    pub voice_xp_earned: i64,
    pub updated_at: DateTime<Utc>,
}

impl UserProgress {
    /// A fresh record for a member seen for the first time
    pub fn new(guild_id: i64, user_id: i64) -> Self {
        Self {
            guild_id,
            user_id,
            xp: 0,
            level: 0,
            voice_xp_earned: 0,
            updated_at: Utc::now(),
        }
    }

    /// Add uncapped XP (text, images) and recompute the level
    pub fn add_xp(&mut self, amount: i64) {
        self.xp += amount.max(0);
        self.level = level_for_xp(self.xp);
        self.updated_at = Utc::now();
    }

    /// Add voice XP, clamped to what is left under `cap`. Returns the amount applied.
    pub fn add_voice_xp(&mut self, amount: i64, cap: i64) -> i64 {
        let room = (cap - self.voice_xp_earned).max(0);
        let applied = amount.max(0).min(room);
        self.voice_xp_earned += applied;
        self.add_xp(applied);
        applied
    }

    /// Zero everything for a new accounting period
    pub fn reset(&mut self) {
        self.xp = 0;
        self.level = 0;
        self.voice_xp_earned = 0;
        self.updated_at = Utc::now();
    }
}
