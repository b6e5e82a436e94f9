/// XP needed per level; `level = xp / XP_PER_LEVEL`
pub const XP_PER_LEVEL: i64 = 1000;

/// XP defaults (can be overridden via env vars)
pub const DEFAULT_MESSAGE_XP: i64 = 10; // Plain text message
pub const DEFAULT_IMAGE_XP: i64 = 20; // Message carrying an image attachment
pub const DEFAULT_XP_COOLDOWN_SECONDS: u64 = 10; // Per (guild, user) text XP throttle

/// Voice XP defaults
pub const DEFAULT_VOICE_XP_RATE: i64 = 3; // XP granted per block
pub const DEFAULT_VOICE_XP_BLOCK_SECONDS: u64 = 120; // Length of one block
pub const DEFAULT_VOICE_XP_CAP: i64 = 1500; // Voice XP ceiling per accounting period

/// Bounds for the auto-reset interval
pub const AUTO_RESET_MIN_DAYS: i32 = 1;
pub const AUTO_RESET_MAX_DAYS: i32 = 365;

/// Number of entries shown by /leaderboard
pub const LEADERBOARD_SIZE: i64 = 10;

/// Compute the level for a given amount of XP
pub fn level_for_xp(xp: i64) -> i64 {
    xp.max(0) / XP_PER_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_buckets() {
        assert_eq!(level_for_xp(0), 0);
        assert_eq!(level_for_xp(999), 0);
        assert_eq!(level_for_xp(1000), 1);
        assert_eq!(level_for_xp(6500), 6);
        assert_eq!(level_for_xp(-5), 0);
    }
}
