//! XP accrual entry points shared by the message, voice and tick paths.

use serenity::all::{GuildId, UserId};
use tracing::{debug, warn};

use crate::bot::error::Error;
use crate::config::VoiceXpPolicy;
use crate::db::models::UserProgress;
use crate::services::leveling::gateway::GuildGateway;
use crate::services::leveling::locks::KeyedLocks;
use crate::services::leveling::notifier::notify_level_up;
use crate::services::leveling::store::LevelStore;
use crate::services::leveling::voice::voice_award;

/// Result of one award
#[derive(Debug, Clone)]
pub struct XpAward {
    /// XP actually added
    pub applied: i64,
    pub progress: UserProgress,
    /// Whether a level-up announcement went out
    pub announced: bool,
}

/// Run the level-up gate once XP is saved. Its failures are logged rather
/// than returned, so an `Err` from an award always means nothing was saved.
async fn announce<S, G>(store: &S, gateway: &G, guild_id: GuildId, user_id: UserId, level: i64) -> bool
where
    S: LevelStore,
    G: GuildGateway,
{
    match notify_level_up(store, gateway, guild_id, user_id, level).await {
        Ok(announced) => announced,
        Err(e) => {
            warn!("Level-up check failed for {} in {}: {}", user_id, guild_id, e);
            false
        }
    }
}

/// Add uncapped (text/image) XP and run the level-up gate
pub async fn award_xp<S, G>(
    store: &S,
    gateway: &G,
    locks: &KeyedLocks<(u64, u64)>,
    guild_id: GuildId,
    user_id: UserId,
    amount: i64,
) -> Result<XpAward, Error>
where
    S: LevelStore,
    G: GuildGateway,
{
    let _guard = locks.lock((guild_id.get(), user_id.get())).await;

    let mut progress = store
        .load_progress(guild_id.get() as i64, user_id.get() as i64)
        .await?;
    let applied = amount.max(0);
    progress.add_xp(applied);
    store.save_progress(&progress).await?;

    let announced = announce(store, gateway, guild_id, user_id, progress.level).await;

    Ok(XpAward {
        applied,
        progress,
        announced,
    })
}

/// Pay out whole voice blocks, bounded by the voice cap
pub async fn award_voice_xp<S, G>(
    store: &S,
    gateway: &G,
    locks: &KeyedLocks<(u64, u64)>,
    policy: &VoiceXpPolicy,
    guild_id: GuildId,
    user_id: UserId,
    blocks: u64,
) -> Result<XpAward, Error>
where
    S: LevelStore,
    G: GuildGateway,
{
    let _guard = locks.lock((guild_id.get(), user_id.get())).await;

    let mut progress = store
        .load_progress(guild_id.get() as i64, user_id.get() as i64)
        .await?;

    let owed = voice_award(blocks, policy, progress.voice_xp_earned);
    if owed == 0 {
        debug!(
            "No voice XP for {} in {} ({} blocks, {} earned)",
            user_id, guild_id, blocks, progress.voice_xp_earned
        );
        return Ok(XpAward {
            applied: 0,
            progress,
            announced: false,
        });
    }

    let applied = progress.add_voice_xp(owed, policy.cap);
    store.save_progress(&progress).await?;

    let announced = announce(store, gateway, guild_id, user_id, progress.level).await;

    Ok(XpAward {
        applied,
        progress,
        announced,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::constants::leveling::level_for_xp;
    use crate::services::leveling::testing::{FakeGateway, MemoryStore};

    const GUILD: u64 = 7;
    const USER: u64 = 8;

    fn setup() -> (MemoryStore, FakeGateway, KeyedLocks<(u64, u64)>) {
        let store = MemoryStore::default();
        store.set_notify_channel(GUILD, 99);
        let gateway = FakeGateway::default();
        gateway.add_member(GUILD, USER, &[]);
        (store, gateway, KeyedLocks::new())
    }

    #[tokio::test]
    async fn test_thousand_messages_reach_level_one_once() {
        let (store, gateway, locks) = setup();
        let (guild, user) = (GuildId::new(GUILD), UserId::new(USER));

        for _ in 0..1000 {
            let award = award_xp(&store, &gateway, &locks, guild, user, 1).await.unwrap();
            assert_eq!(award.progress.level, level_for_xp(award.progress.xp));
        }

        let progress = store.progress(GUILD, USER);
        assert_eq!(progress.xp, 1000);
        assert_eq!(progress.level, 1);

        let sent = gateway.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("**Level 1**"));
    }

    #[tokio::test]
    async fn test_text_xp_is_uncapped_and_separate() {
        let (store, gateway, locks) = setup();
        let (guild, user) = (GuildId::new(GUILD), UserId::new(USER));

        award_xp(&store, &gateway, &locks, guild, user, 5000).await.unwrap();

        let progress = store.progress(GUILD, USER);
        assert_eq!(progress.xp, 5000);
        assert_eq!(progress.voice_xp_earned, 0);
    }

    #[tokio::test]
    async fn test_voice_xp_stops_at_cap() {
        let (store, gateway, locks) = setup();
        let policy = VoiceXpPolicy::default();
        let (guild, user) = (GuildId::new(GUILD), UserId::new(USER));

        let first = award_voice_xp(&store, &gateway, &locks, &policy, guild, user, 499)
            .await
            .unwrap();
        assert_eq!(first.applied, 1497);

        let second = award_voice_xp(&store, &gateway, &locks, &policy, guild, user, 5)
            .await
            .unwrap();
        assert_eq!(second.applied, 3);

        let third = award_voice_xp(&store, &gateway, &locks, &policy, guild, user, 5)
            .await
            .unwrap();
        assert_eq!(third.applied, 0);

        let progress = store.progress(GUILD, USER);
        assert_eq!(progress.voice_xp_earned, 1500);
        assert_eq!(progress.xp, 1500);
        assert_eq!(progress.level, 1);
    }

    #[tokio::test]
    async fn test_concurrent_awards_announce_once() {
        let (store, gateway, locks) = setup();
        let store = Arc::new(store);
        let gateway = Arc::new(gateway);
        let locks = Arc::new(locks);

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let (store, gateway, locks) = (store.clone(), gateway.clone(), locks.clone());
            tasks.push(tokio::spawn(async move {
                award_xp(
                    store.as_ref(),
                    gateway.as_ref(),
                    &locks,
                    GuildId::new(GUILD),
                    UserId::new(USER),
                    100,
                )
                .await
                .unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.progress(GUILD, USER).xp, 2000);
        assert_eq!(gateway.sent_messages().len(), 2);
    }
}
