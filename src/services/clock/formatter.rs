use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

/// India Standard Time, UTC+05:30
const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

/// Japan Standard Time, UTC+09:00
const JST_OFFSET_SECONDS: i32 = 9 * 3600;

fn fixed(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

pub fn ist() -> FixedOffset {
    fixed(IST_OFFSET_SECONDS)
}

pub fn jst() -> FixedOffset {
    fixed(JST_OFFSET_SECONDS)
}

/// Names the three clock channels should carry at a given instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockNames {
    pub date: String,
    pub india: String,
    pub japan: String,
}

pub fn clock_names(now: DateTime<Utc>) -> ClockNames {
    let india = now.with_timezone(&ist());
    let japan = now.with_timezone(&jst());

    ClockNames {
        date: format!("📅 {}", india.format("%d %B, %Y")),
        india: format!("🇮🇳 IST {}", india.format("%H:%M")),
        japan: format!("🇯🇵 JST {}", japan.format("%H:%M")),
    }
}

/// Time left until the next `minutes`-aligned boundary (zero when exactly on one)
pub fn delay_until_boundary(now: DateTime<Utc>, minutes: u32) -> Duration {
    let window = u64::from(minutes.max(1)) * 60;
    let into_window = u64::from(now.minute() % minutes.max(1)) * 60 + u64::from(now.second());
    let nanos = u64::from(now.nanosecond().min(999_999_999));

    if into_window == 0 && nanos == 0 {
        return Duration::ZERO;
    }

    Duration::from_secs(window - into_window) - Duration::from_nanos(nanos)
}
