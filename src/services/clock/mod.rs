pub mod formatter;
pub mod updater;
