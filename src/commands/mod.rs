pub mod config;
pub mod help;
pub mod level;
pub mod level_admin;
pub mod owner;
pub mod restrictions;
pub mod time_channels;
pub mod youtube;
