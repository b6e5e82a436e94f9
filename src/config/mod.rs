mod settings;

pub use settings::{Settings, VoiceXpPolicy};
