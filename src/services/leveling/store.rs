//! Persistence seam for the leveling core.
//!
//! Reconciliation, accrual and resets only see this trait; the bot runs it on
//! top of Postgres and the tests on an in-memory map.

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::bot::error::Error;
use crate::db::models::{AutoResetSchedule, LevelReward, UserProgress};
use crate::db::queries::{auto_reset, level_notify, level_rewards, users};

pub trait LevelStore: Send + Sync {
    /// Progress for a member, created zeroed on first activity
    fn load_progress(
        &self,
        guild_id: i64,
        user_id: i64,
    ) -> impl Future<Output = Result<UserProgress, Error>> + Send;

    fn save_progress(
        &self,
        progress: &UserProgress,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Every tracked member of a guild
    fn guild_progress(
        &self,
        guild_id: i64,
    ) -> impl Future<Output = Result<Vec<UserProgress>, Error>> + Send;

    /// Reward rules, highest level first
    fn reward_rules(
        &self,
        guild_id: i64,
    ) -> impl Future<Output = Result<Vec<LevelReward>, Error>> + Send;

    fn notify_channel(
        &self,
        guild_id: i64,
    ) -> impl Future<Output = Result<Option<i64>, Error>> + Send;

    fn notified_level(
        &self,
        guild_id: i64,
        user_id: i64,
    ) -> impl Future<Output = Result<i64, Error>> + Send;

    fn set_notified_level(
        &self,
        guild_id: i64,
        user_id: i64,
        level: i64,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Zero all progress and notified-level markers of a guild.
    /// Returns the number of member records touched.
    fn reset_guild(&self, guild_id: i64) -> impl Future<Output = Result<u64, Error>> + Send;

    fn auto_reset_schedules(
        &self,
    ) -> impl Future<Output = Result<Vec<AutoResetSchedule>, Error>> + Send;

    fn mark_reset(
        &self,
        guild_id: i64,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

impl LevelStore for PgPool {
    async fn load_progress(&self, guild_id: i64, user_id: i64) -> Result<UserProgress, Error> {
        Ok(users::get_or_create(self, guild_id, user_id).await?)
    }

    async fn save_progress(&self, progress: &UserProgress) -> Result<(), Error> {
        Ok(users::save(self, progress).await?)
    }

    async fn guild_progress(&self, guild_id: i64) -> Result<Vec<UserProgress>, Error> {
        Ok(users::list_for_guild(self, guild_id).await?)
    }

    async fn reward_rules(&self, guild_id: i64) -> Result<Vec<LevelReward>, Error> {
        Ok(level_rewards::list_desc(self, guild_id).await?)
    }

    async fn notify_channel(&self, guild_id: i64) -> Result<Option<i64>, Error> {
        Ok(level_notify::get_channel(self, guild_id).await?)
    }

    async fn notified_level(&self, guild_id: i64, user_id: i64) -> Result<i64, Error> {
        Ok(level_notify::get_notified_level(self, guild_id, user_id).await?)
    }

    async fn set_notified_level(&self, guild_id: i64, user_id: i64, level: i64) -> Result<(), Error> {
        Ok(level_notify::set_notified_level(self, guild_id, user_id, level).await?)
    }

    async fn reset_guild(&self, guild_id: i64) -> Result<u64, Error> {
        let touched = users::reset_guild(self, guild_id).await?;
        level_notify::reset_guild(self, guild_id).await?;
        Ok(touched)
    }

    async fn auto_reset_schedules(&self) -> Result<Vec<AutoResetSchedule>, Error> {
        Ok(auto_reset::list_all(self).await?)
    }

    async fn mark_reset(&self, guild_id: i64, at: DateTime<Utc>) -> Result<(), Error> {
        Ok(auto_reset::mark_reset(self, guild_id, at).await?)
    }
}
