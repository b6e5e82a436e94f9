use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use sqlx::PgPool;

use crate::config::Settings;
use crate::db::models::TimeChannelConfig;
use crate::services::leveling::cooldown::CooldownTracker;
use crate::services::leveling::locks::KeyedLocks;
use crate::services::leveling::voice::VoiceTracker;
use crate::services::youtube::client::YouTubeClient;

/// Shared data available to all commands and handlers
pub struct Data {
    pub pool: PgPool,
    pub settings: Settings,
    /// Text XP throttle per (guild_id, user_id)
    pub xp_cooldowns: CooldownTracker,
    /// Open voice sessions: (guild_id, user_id) -> anchor
    pub voice_sessions: VoiceTracker,
    /// Serialises XP award + level-up handling per (guild_id, user_id)
    pub xp_locks: KeyedLocks<(u64, u64)>,
    /// Cache of guild_id -> clock channel config
    pub clock_channels: DashMap<u64, TimeChannelConfig>,
    pub youtube: YouTubeClient,
}

impl Data {
    pub fn new(pool: PgPool, settings: Settings) -> Self {
        Self {
            xp_cooldowns: CooldownTracker::new(settings.xp_cooldown),
            voice_sessions: VoiceTracker::new(Duration::from_secs(settings.voice.block_seconds)),
            xp_locks: KeyedLocks::new(),
            clock_channels: DashMap::new(),
            youtube: YouTubeClient::new(settings.youtube_api_key.clone()),
            pool,
            settings,
        }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("voice_sessions", &self.voice_sessions.len())
            .field("xp_cooldowns", &self.xp_cooldowns.len())
            .field("clock_channels", &self.clock_channels.len())
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, crate::bot::error::Error>;
