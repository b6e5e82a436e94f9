use std::sync::Arc;
use std::time::Instant;

use serenity::all::{Context, GuildId, UserId};
use tokio::time::{interval, sleep};
use tracing::{debug, error, info};

use crate::bot::data::Data;
use crate::config::VoiceXpPolicy;
use crate::constants::intervals::{CACHE_WARMUP, VOICE_TICK_INTERVAL};
use crate::services::leveling::gateway::GuildGateway;
use crate::services::leveling::locks::KeyedLocks;
use crate::services::leveling::store::LevelStore;
use crate::services::leveling::voice::VoiceTracker;
use crate::services::leveling::xp::award_voice_xp;

/// Summary of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub awarded: usize,
    pub dropped: usize,
    pub errors: usize,
}

/// Pay `blocks` to one member. A failed payout is refunded to the tracker.
#[allow(clippy::too_many_arguments)]
async fn settle<S, G>(
    tracker: &VoiceTracker,
    store: &S,
    gateway: &G,
    locks: &KeyedLocks<(u64, u64)>,
    policy: &VoiceXpPolicy,
    key: (u64, u64),
    blocks: u64,
    report: &mut TickReport,
) where
    S: LevelStore,
    G: GuildGateway,
{
    let (guild_id, user_id) = (GuildId::new(key.0), UserId::new(key.1));
    match award_voice_xp(store, gateway, locks, policy, guild_id, user_id, blocks).await {
        Ok(award) if award.applied > 0 => report.awarded += 1,
        Ok(_) => {}
        Err(e) => {
            error!(
                "Failed to award voice XP to {} in {}, keeping {} blocks owed: {}",
                user_id, guild_id, blocks, e
            );
            tracker.refund(key, blocks);
            report.errors += 1;
        }
    }
}

/// Settle refunded blocks, then re-evaluate every open session. Sessions for
/// which `present` returns false are dropped without payout.
pub async fn process_voice_tick<S, G, F>(
    tracker: &VoiceTracker,
    store: &S,
    gateway: &G,
    locks: &KeyedLocks<(u64, u64)>,
    policy: &VoiceXpPolicy,
    now: Instant,
    present: F,
) -> TickReport
where
    S: LevelStore,
    G: GuildGateway,
    F: Fn((u64, u64)) -> bool,
{
    let mut report = TickReport::default();

    for (key, blocks) in tracker.take_owed() {
        settle(tracker, store, gateway, locks, policy, key, blocks, &mut report).await;
    }

    for key in tracker.keys() {
        if !present(key) {
            debug!("Dropping orphaned voice session {:?}", key);
            tracker.discard(key);
            report.dropped += 1;
            continue;
        }

        let blocks = match tracker.take_blocks(key, now) {
            Some(blocks) if blocks > 0 => blocks,
            _ => continue,
        };

        settle(tracker, store, gateway, locks, policy, key, blocks, &mut report).await;
    }

    report
}

/// Whether the cache still shows the member in a voice channel
fn in_voice(ctx: &Context, (guild_id, user_id): (u64, u64)) -> bool {
    ctx.cache
        .guild(GuildId::new(guild_id))
        .map(|guild| {
            guild
                .voice_states
                .get(&UserId::new(user_id))
                .is_some_and(|state| state.channel_id.is_some())
        })
        .unwrap_or(false)
}

/// Open sessions for members already sitting in voice when the bot starts
pub fn open_existing_sessions(ctx: &Context, tracker: &VoiceTracker) -> usize {
    let now = Instant::now();
    let mut opened = 0;

    for guild_id in ctx.cache.guilds() {
        let present: Vec<UserId> = match ctx.cache.guild(guild_id) {
            Some(guild) => guild
                .voice_states
                .values()
                .filter(|state| state.channel_id.is_some())
                .filter(|state| {
                    guild
                        .members
                        .get(&state.user_id)
                        .map(|member| !member.user.bot)
                        .unwrap_or(true)
                })
                .map(|state| state.user_id)
                .collect(),
            None => continue,
        };

        for user_id in present {
            tracker.open((guild_id.get(), user_id.get()), now);
            opened += 1;
        }
    }

    opened
}

/// Start the voice XP background task
pub fn spawn_voice_ticker(ctx: Context, data: Arc<Data>) {
    tokio::spawn(async move {
        sleep(CACHE_WARMUP).await;

        let opened = open_existing_sessions(&ctx, &data.voice_sessions);
        info!("Opened {} voice sessions for members already in voice", opened);

        let mut ticker = interval(VOICE_TICK_INTERVAL);

        loop {
            ticker.tick().await;

            let report = process_voice_tick(
                &data.voice_sessions,
                &data.pool,
                &ctx,
                &data.xp_locks,
                &data.settings.voice,
                Instant::now(),
                |key| in_voice(&ctx, key),
            )
            .await;

            if report != TickReport::default() {
                debug!(
                    "Voice tick: {} awarded, {} dropped, {} errors",
                    report.awarded, report.dropped, report.errors
                );
            }

            data.xp_locks.prune();
            data.xp_cooldowns.prune(Instant::now());
        }
    });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::leveling::testing::{FakeGateway, MemoryStore};

    const GUILD: u64 = 1;

    #[tokio::test]
    async fn test_tick_pays_whole_blocks_and_carries_remainder() {
        let policy = VoiceXpPolicy::default();
        let tracker = VoiceTracker::new(Duration::from_secs(policy.block_seconds));
        let store = MemoryStore::default();
        let gateway = FakeGateway::default();
        let locks = KeyedLocks::new();
        let start = Instant::now();
        tracker.open((GUILD, 2), start);

        let report = process_voice_tick(
            &tracker,
            &store,
            &gateway,
            &locks,
            &policy,
            start + Duration::from_secs(125),
            |_| true,
        )
        .await;
        assert_eq!(report.awarded, 1);
        assert_eq!(store.progress(GUILD, 2).xp, 3);

        // 5 seconds carried; 115 more is not a full block
        process_voice_tick(
            &tracker,
            &store,
            &gateway,
            &locks,
            &policy,
            start + Duration::from_secs(239),
            |_| true,
        )
        .await;
        assert_eq!(store.progress(GUILD, 2).xp, 3);

        process_voice_tick(
            &tracker,
            &store,
            &gateway,
            &locks,
            &policy,
            start + Duration::from_secs(240),
            |_| true,
        )
        .await;
        assert_eq!(store.progress(GUILD, 2).xp, 6);
        assert_eq!(store.progress(GUILD, 2).voice_xp_earned, 6);
    }

    #[tokio::test]
    async fn test_tick_drops_orphaned_sessions() {
        let policy = VoiceXpPolicy::default();
        let tracker = VoiceTracker::new(Duration::from_secs(policy.block_seconds));
        let store = MemoryStore::default();
        let gateway = FakeGateway::default();
        let locks = KeyedLocks::new();
        let start = Instant::now();
        tracker.open((GUILD, 2), start);
        tracker.open((GUILD, 3), start);

        let report = process_voice_tick(
            &tracker,
            &store,
            &gateway,
            &locks,
            &policy,
            start + Duration::from_secs(600),
            |(_, user)| user == 2,
        )
        .await;

        assert_eq!(report.dropped, 1);
        assert!(!tracker.is_open((GUILD, 3)));
        assert!(!store.has_progress(GUILD, 3));
        assert_eq!(store.progress(GUILD, 2).xp, 15);
    }

    #[tokio::test]
    async fn test_failed_payout_is_paid_on_next_tick() {
        let policy = VoiceXpPolicy::default();
        let tracker = VoiceTracker::new(Duration::from_secs(policy.block_seconds));
        let store = MemoryStore::default();
        let gateway = FakeGateway::default();
        let locks = KeyedLocks::new();
        let start = Instant::now();
        tracker.open((GUILD, 2), start);
        store.fail_next_loads(1);

        let report = process_voice_tick(
            &tracker,
            &store,
            &gateway,
            &locks,
            &policy,
            start + Duration::from_secs(240),
            |_| true,
        )
        .await;
        assert_eq!(report.errors, 1);
        assert_eq!(store.progress(GUILD, 2).xp, 0);

        // Same instant: no new blocks, only the refunded two
        let report = process_voice_tick(
            &tracker,
            &store,
            &gateway,
            &locks,
            &policy,
            start + Duration::from_secs(240),
            |_| true,
        )
        .await;
        assert_eq!(report, TickReport { awarded: 1, dropped: 0, errors: 0 });
        assert_eq!(store.progress(GUILD, 2).xp, 6);
    }

    #[tokio::test]
    async fn test_refund_after_leave_is_paid_without_a_session() {
        let policy = VoiceXpPolicy::default();
        let tracker = VoiceTracker::new(Duration::from_secs(policy.block_seconds));
        let store = MemoryStore::default();
        let gateway = FakeGateway::default();
        let locks = KeyedLocks::new();
        tracker.refund((GUILD, 4), 3);

        let report = process_voice_tick(
            &tracker,
            &store,
            &gateway,
            &locks,
            &policy,
            Instant::now(),
            |_| false,
        )
        .await;

        assert_eq!(report.awarded, 1);
        assert_eq!(store.progress(GUILD, 4).voice_xp_earned, 9);
        assert!(tracker.take_owed().is_empty());
    }
}
