use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Best-effort per (guild, user) text XP throttle. Not persisted.
pub struct CooldownTracker {
    last_award: DashMap<(u64, u64), Instant>,
    window: Duration,
}

impl CooldownTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            last_award: DashMap::new(),
            window,
        }
    }

    /// Claim the slot for `key` if its window has passed. The check and the
    /// update happen under the same shard lock.
    pub fn try_acquire(&self, key: (u64, u64), now: Instant) -> bool {
        match self.last_award.entry(key) {
            Entry::Occupied(mut entry) => {
                if now.saturating_duration_since(*entry.get()) < self.window {
                    return false;
                }
                entry.insert(now);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    /// Forget entries whose window has already passed
    pub fn prune(&self, now: Instant) {
        let window = self.window;
        self.last_award
            .retain(|_, last| now.saturating_duration_since(*last) < window);
    }

    pub fn len(&self) -> usize {
        self.last_award.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_within_window() {
        let tracker = CooldownTracker::new(Duration::from_secs(10));
        let start = Instant::now();

        assert!(tracker.try_acquire((1, 2), start));
        assert!(!tracker.try_acquire((1, 2), start + Duration::from_secs(9)));
        assert!(tracker.try_acquire((1, 2), start + Duration::from_secs(10)));
    }

    #[test]
    fn test_keys_are_independent() {
        let tracker = CooldownTracker::new(Duration::from_secs(10));
        let now = Instant::now();

        assert!(tracker.try_acquire((1, 2), now));
        assert!(tracker.try_acquire((1, 3), now));
        assert!(tracker.try_acquire((2, 2), now));
    }

    #[test]
    fn test_zero_window_never_blocks() {
        let tracker = CooldownTracker::new(Duration::ZERO);
        let now = Instant::now();

        assert!(tracker.try_acquire((1, 2), now));
        assert!(tracker.try_acquire((1, 2), now));
    }

    #[test]
    fn test_prune() {
        let tracker = CooldownTracker::new(Duration::from_secs(10));
        let start = Instant::now();
        tracker.try_acquire((1, 1), start);
        tracker.try_acquire((1, 2), start + Duration::from_secs(8));

        tracker.prune(start + Duration::from_secs(12));
        assert_eq!(tracker.len(), 1);
    }
}
