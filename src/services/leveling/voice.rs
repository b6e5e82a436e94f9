//! Voice session bookkeeping.
//!
//! Each open session stores an anchor: the instant up to which presence has
//! already been paid out. Ticks consume whole blocks and move the anchor
//! forward by exactly the consumed time, so the remainder carries over.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::VoiceXpPolicy;

pub struct VoiceTracker {
    /// (guild_id, user_id) -> anchor
    sessions: DashMap<(u64, u64), Instant>,
    /// Blocks already taken whose payout failed, settled on the next tick
    owed: DashMap<(u64, u64), u64>,
    block: Duration,
}

impl VoiceTracker {
    pub fn new(block: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            owed: DashMap::new(),
            block: block.max(Duration::from_secs(1)),
        }
    }

    /// Open a session. An already open session keeps its anchor.
    pub fn open(&self, key: (u64, u64), now: Instant) {
        self.sessions.entry(key).or_insert(now);
    }

    /// Close a session, returning the whole blocks still owed.
    /// The sub-block remainder goes away with the session.
    pub fn close(&self, key: (u64, u64), now: Instant) -> Option<u64> {
        self.sessions
            .remove(&key)
            .map(|(_, anchor)| split_elapsed(now.saturating_duration_since(anchor), self.block).0)
    }

    /// Consume whole blocks from an open session and advance its anchor
    pub fn take_blocks(&self, key: (u64, u64), now: Instant) -> Option<u64> {
        let mut anchor = self.sessions.get_mut(&key)?;
        let (blocks, _) = split_elapsed(now.saturating_duration_since(*anchor), self.block);

        if blocks > 0 {
            *anchor += self.block * blocks as u32;
        }

        Some(blocks)
    }

    /// Hand back blocks whose payout failed. They stay owed even after the
    /// session closes, until `take_owed` settles them.
    pub fn refund(&self, key: (u64, u64), blocks: u64) {
        if blocks > 0 {
            *self.owed.entry(key).or_insert(0) += blocks;
        }
    }

    /// Drain every refunded balance
    pub fn take_owed(&self) -> Vec<((u64, u64), u64)> {
        let keys: Vec<(u64, u64)> = self.owed.iter().map(|entry| *entry.key()).collect();
        keys.into_iter()
            .filter_map(|key| self.owed.remove(&key))
            .collect()
    }

    /// Drop a session without paying anything
    pub fn discard(&self, key: (u64, u64)) {
        self.sessions.remove(&key);
    }

    pub fn keys(&self) -> Vec<(u64, u64)> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    pub fn is_open(&self, key: (u64, u64)) -> bool {
        self.sessions.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Split elapsed presence into whole blocks and the remainder
pub fn split_elapsed(elapsed: Duration, block: Duration) -> (u64, Duration) {
    let block_secs = block.as_secs().max(1);
    let blocks = elapsed.as_secs() / block_secs;
    let remainder = elapsed.saturating_sub(Duration::from_secs(blocks * block_secs));
    (blocks, remainder)
}

/// XP owed for `blocks`, bounded by what is left under the cap
pub fn voice_award(blocks: u64, policy: &VoiceXpPolicy, already_awarded: i64) -> i64 {
    let earned = (blocks as i64).saturating_mul(policy.rate);
    let room = policy.cap - already_awarded;
    earned.min(room).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: Duration = Duration::from_secs(120);

    #[test]
    fn test_split_elapsed() {
        assert_eq!(split_elapsed(Duration::from_secs(125), BLOCK), (1, Duration::from_secs(5)));
        assert_eq!(split_elapsed(Duration::from_secs(119), BLOCK), (0, Duration::from_secs(119)));
        assert_eq!(split_elapsed(Duration::from_secs(480), BLOCK), (4, Duration::ZERO));
    }

    #[test]
    fn test_voice_award_bounds() {
        let policy = VoiceXpPolicy::default();
        assert_eq!(voice_award(1, &policy, 0), 3);
        assert_eq!(voice_award(10, &policy, 1490), 10);
        assert_eq!(voice_award(10, &policy, 1500), 0);
        assert_eq!(voice_award(0, &policy, 0), 0);
    }

    #[test]
    fn test_refund_outlives_the_session() {
        let tracker = VoiceTracker::new(BLOCK);
        let start = Instant::now();
        tracker.open((1, 2), start);

        let blocks = tracker.close((1, 2), start + Duration::from_secs(250)).unwrap();
        tracker.refund((1, 2), blocks);
        tracker.refund((1, 2), 1);
        tracker.refund((1, 3), 0);

        assert!(!tracker.is_open((1, 2)));
        assert_eq!(tracker.take_owed(), vec![((1, 2), 3)]);
        assert!(tracker.take_owed().is_empty());
    }

    #[test]
    fn test_session_of_125_seconds_carries_five() {
        let tracker = VoiceTracker::new(BLOCK);
        let start = Instant::now();
        tracker.open((1, 2), start);

        assert_eq!(tracker.take_blocks((1, 2), start + Duration::from_secs(125)), Some(1));
        // 5s carried: nothing until 240s total
        assert_eq!(tracker.take_blocks((1, 2), start + Duration::from_secs(239)), Some(0));
        assert_eq!(tracker.take_blocks((1, 2), start + Duration::from_secs(240)), Some(1));
    }

    #[test]
    fn test_reopen_keeps_anchor() {
        let tracker = VoiceTracker::new(BLOCK);
        let start = Instant::now();
        tracker.open((1, 2), start);
        tracker.open((1, 2), start + Duration::from_secs(100));

        assert_eq!(tracker.close((1, 2), start + Duration::from_secs(130)), Some(1));
        assert!(!tracker.is_open((1, 2)));
    }

    #[test]
    fn test_close_after_tick_never_double_counts() {
        let tracker = VoiceTracker::new(BLOCK);
        let start = Instant::now();
        tracker.open((1, 2), start);

        let ticked = tracker.take_blocks((1, 2), start + Duration::from_secs(250)).unwrap();
        let flushed = tracker.close((1, 2), start + Duration::from_secs(370)).unwrap();

        assert_eq!(ticked + flushed, 3);
    }

    #[test]
    fn test_unknown_session() {
        let tracker = VoiceTracker::new(BLOCK);
        assert_eq!(tracker.take_blocks((9, 9), Instant::now()), None);
        assert_eq!(tracker.close((9, 9), Instant::now()), None);
    }
}
