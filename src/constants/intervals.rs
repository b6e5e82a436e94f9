use std::time::Duration;

/// How often open voice sessions are re-evaluated
pub const VOICE_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// How often auto-reset schedules are checked
pub const AUTO_RESET_CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Clock channels are renamed on this boundary
pub const CLOCK_UPDATE_MINUTES: u32 = 10;

/// YouTube polling interval (each poll costs search quota)
pub const YOUTUBE_POLL_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Grace period for the gateway cache to populate before startup scans
pub const CACHE_WARMUP: Duration = Duration::from_secs(5);

/// How long the no-text warning stays in the channel
pub const NO_TEXT_WARNING_LIFETIME: Duration = Duration::from_secs(30);

/// Format duration for display
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs < 60 {
        format!("{} seconds", total_secs)
    } else if total_secs < 3600 {
        let mins = total_secs / 60;
        format!("{} minute{}", mins, if mins == 1 { "" } else { "s" })
    } else if total_secs < 86400 {
        let hours = total_secs / 3600;
        format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
    } else {
        let days = total_secs / 86400;
        format!("{} day{}", days, if days == 1 { "" } else { "s" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30 seconds");
        assert_eq!(format_duration(Duration::from_secs(120)), "2 minutes");
        assert_eq!(format_duration(YOUTUBE_POLL_INTERVAL), "15 minutes");
        assert_eq!(format_duration(AUTO_RESET_CHECK_INTERVAL), "1 hour");
        assert_eq!(format_duration(Duration::from_secs(7 * 86400)), "7 days");
    }
}
