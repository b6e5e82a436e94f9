pub mod auto_reset;
pub mod banned_guilds;
pub mod level_notify;
pub mod level_rewards;
pub mod restrictions;
pub mod time_channels;
pub mod users;
pub mod youtube;
