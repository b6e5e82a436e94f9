use std::env;
use std::time::Duration;

use crate::constants::leveling::{
    DEFAULT_IMAGE_XP, DEFAULT_MESSAGE_XP, DEFAULT_VOICE_XP_BLOCK_SECONDS, DEFAULT_VOICE_XP_CAP,
    DEFAULT_VOICE_XP_RATE, DEFAULT_XP_COOLDOWN_SECONDS,
};

/// Voice XP accrual parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceXpPolicy {
    /// XP granted per whole block
    pub rate: i64,
    /// Seconds of presence that make up one block
    pub block_seconds: u64,
    /// Ceiling on voice-sourced XP per accounting period
    pub cap: i64,
}

impl Default for VoiceXpPolicy {
    fn default() -> Self {
        Self {
            rate: DEFAULT_VOICE_XP_RATE,
            block_seconds: DEFAULT_VOICE_XP_BLOCK_SECONDS,
            cap: DEFAULT_VOICE_XP_CAP,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub database_url: String,
    pub youtube_api_key: String,
    pub guild_id: Option<u64>,
    /// Extra bot owners allowed to run owner-only commands
    pub owner_ids: Vec<u64>,
    /// XP for a plain text message
    pub message_xp: i64,
    /// XP for a message carrying an image
    pub image_xp: i64,
    /// Text XP throttle per (guild, user)
    pub xp_cooldown: Duration,
    pub voice: VoiceXpPolicy,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| "DISCORD_TOKEN environment variable not set")?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set")?;

        let youtube_api_key = env::var("YOUTUBE_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or("YOUTUBE_API_KEY environment variable not set")?;

        let guild_id = env::var("GUILD_ID")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());

        let owner_ids = env::var("OWNER_IDS")
            .map(|s| parse_id_list(&s))
            .unwrap_or_default();

        let voice = VoiceXpPolicy {
            rate: parse_or("VOICE_XP_RATE", DEFAULT_VOICE_XP_RATE),
            block_seconds: parse_or("VOICE_XP_BLOCK_SECONDS", DEFAULT_VOICE_XP_BLOCK_SECONDS)
                .max(1),
            cap: parse_or("VOICE_XP_CAP", DEFAULT_VOICE_XP_CAP),
        };

        Ok(Self {
            discord_token,
            database_url,
            youtube_api_key,
            guild_id,
            owner_ids,
            message_xp: parse_or("MESSAGE_XP", DEFAULT_MESSAGE_XP),
            image_xp: parse_or("IMAGE_XP", DEFAULT_IMAGE_XP),
            xp_cooldown: Duration::from_secs(parse_or(
                "XP_COOLDOWN_SECONDS",
                DEFAULT_XP_COOLDOWN_SECONDS,
            )),
            voice,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Parse a comma separated list of snowflakes, skipping garbage
fn parse_id_list(raw: &str) -> Vec<u64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<u64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1, 2,3"), vec![1, 2, 3]);
        assert_eq!(parse_id_list("abc,42,"), vec![42]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn test_default_voice_policy() {
        let policy = VoiceXpPolicy::default();
        assert_eq!(policy.rate, 3);
        assert_eq!(policy.block_seconds, 120);
        assert_eq!(policy.cap, 1500);
    }
}
