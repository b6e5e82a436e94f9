use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AutoResetSchedule {
    pub guild_id: i64,
    /// Interval in days, 1..=365
    pub days: i32,
    pub last_reset: DateTime<Utc>,
}

impl AutoResetSchedule {
    /// Whether at least `days` whole days have passed since the last reset
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        (now - self.last_reset).num_days() >= i64::from(self.days)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn schedule(days: i32, ago: Duration) -> (AutoResetSchedule, DateTime<Utc>) {
        let now = Utc::now();
        (
            AutoResetSchedule {
                guild_id: 1,
                days,
                last_reset: now - ago,
            },
            now,
        )
    }

    #[test]
    fn test_due_after_interval() {
        let (s, now) = schedule(7, Duration::days(8));
        assert!(s.is_due(now));
        let (s, now) = schedule(7, Duration::days(7));
        assert!(s.is_due(now));
    }

    #[test]
    fn test_not_due_on_partial_day() {
        let (s, now) = schedule(7, Duration::days(6) + Duration::hours(23));
        assert!(!s.is_due(now));
    }
}
