pub mod cooldown;
pub mod gateway;
pub mod locks;
pub mod notifier;
pub mod reset;
pub mod roles;
pub mod store;
pub mod voice;
pub mod voice_ticker;
pub mod xp;

#[cfg(test)]
pub mod testing;
