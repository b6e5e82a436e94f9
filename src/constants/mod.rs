pub mod embeds;
pub mod intervals;
pub mod leveling;
