pub mod guilds;
