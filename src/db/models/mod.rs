mod auto_reset;
mod banned_guild;
mod level_reward;
mod restriction;
mod time_channel_config;
mod user_progress;
mod youtube_subscription;

pub use auto_reset::AutoResetSchedule;
pub use banned_guild::BannedGuild;
pub use level_reward::LevelReward;
pub use restriction::{LinkFilter, LinkRestriction, NoTextChannel};
pub use time_channel_config::TimeChannelConfig;
pub use user_progress::UserProgress;
pub use youtube_subscription::YouTubeSubscription;
