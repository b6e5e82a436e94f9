pub mod event_handler;
pub mod guild_join;
pub mod message;
pub mod voice_state;
