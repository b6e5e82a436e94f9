pub mod clock;
pub mod leveling;
pub mod restrictions;
pub mod youtube;
