use std::sync::Arc;

use chrono::{DateTime, Utc};
use serenity::all::{Context, GuildId};
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::intervals::AUTO_RESET_CHECK_INTERVAL;
use crate::services::leveling::gateway::GuildGateway;
use crate::services::leveling::locks::KeyedLocks;
use crate::services::leveling::roles::managed_roles;
use crate::services::leveling::store::LevelStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// Member records zeroed
    pub members_reset: u64,
    /// Members that had reward roles stripped
    pub roles_stripped: usize,
    pub errors: usize,
}

/// Zero XP, levels, voice XP and level-up markers for a guild and strip every
/// reward role from its members.
///
/// Every tracked member's award lock is held for the whole reset, so an award
/// that loaded a record before the reset finishes first and is then zeroed.
pub async fn reset_guild<S, G>(
    store: &S,
    gateway: &G,
    locks: &KeyedLocks<(u64, u64)>,
    guild_id: GuildId,
) -> Result<ResetReport, Error>
where
    S: LevelStore,
    G: GuildGateway,
{
    let guild = guild_id.get() as i64;

    let mut members: Vec<u64> = store
        .guild_progress(guild)
        .await?
        .iter()
        .map(|progress| progress.user_id as u64)
        .collect();
    // Fixed order so two resets of one guild cannot deadlock
    members.sort_unstable();

    let mut guards = Vec::with_capacity(members.len());
    for user_id in members {
        guards.push(locks.lock((guild_id.get(), user_id)).await);
    }

    let mut report = ResetReport {
        members_reset: store.reset_guild(guild).await?,
        ..Default::default()
    };

    let rules = store.reward_rules(guild).await?;
    let managed = managed_roles(&rules);

    if !managed.is_empty() {
        for (user_id, held) in gateway.members_with_any_role(guild_id, &managed).await {
            match gateway.remove_roles(guild_id, user_id, &held).await {
                Ok(()) => report.roles_stripped += 1,
                Err(e) => {
                    warn!("Failed to strip reward roles from {} in {}: {}", user_id, guild_id, e);
                    report.errors += 1;
                }
            }
        }
    }

    info!(
        "Reset XP in guild {}: {} members, {} stripped of reward roles ({} errors)",
        guild_id, report.members_reset, report.roles_stripped, report.errors
    );

    drop(guards);
    Ok(report)
}

/// Reset every guild whose schedule is due. Returns the guilds that were reset.
pub async fn run_auto_reset_sweep<S, G>(
    store: &S,
    gateway: &G,
    locks: &KeyedLocks<(u64, u64)>,
    now: DateTime<Utc>,
) -> Result<Vec<GuildId>, Error>
where
    S: LevelStore,
    G: GuildGateway,
{
    let mut reset = Vec::new();

    for schedule in store.auto_reset_schedules().await? {
        if !schedule.is_due(now) {
            continue;
        }

        let guild_id = GuildId::new(schedule.guild_id as u64);
        debug!(
            "Auto-reset due for guild {} (every {} days, last {})",
            guild_id, schedule.days, schedule.last_reset
        );

        match reset_guild(store, gateway, locks, guild_id).await {
            Ok(_) => {
                store.mark_reset(schedule.guild_id, now).await?;
                reset.push(guild_id);
            }
            Err(e) => error!("Auto-reset failed for guild {}: {}", guild_id, e),
        }
    }

    Ok(reset)
}

/// Start the auto-reset background task
pub fn spawn_auto_reset_checker(ctx: Context, data: Arc<Data>) {
    tokio::spawn(async move {
        let mut ticker = interval(AUTO_RESET_CHECK_INTERVAL);

        loop {
            ticker.tick().await;

            if let Err(e) = run_auto_reset_sweep(&data.pool, &ctx, &data.xp_locks, Utc::now()).await {
                error!("Error checking auto-reset schedules: {}", e);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    use chrono::Duration;
    use serenity::all::{RoleId, UserId};

    use super::*;
    use crate::services::leveling::xp::award_xp;
    use crate::services::leveling::testing::{FakeGateway, MemoryStore};

    const GUILD: u64 = 5;

    #[tokio::test]
    async fn test_due_schedule_resets_guild() {
        let now = Utc::now();
        let store = MemoryStore::default();
        store.add_rule(GUILD, 1, 100);
        store.add_rule(GUILD, 5, 200);
        store.set_progress(GUILD, 1, 6200);
        store.set_progress(GUILD, 2, 1200);
        store.set_marker(GUILD, 1, 6);
        store.add_schedule(GUILD, 7, now - Duration::days(8));

        let gateway = FakeGateway::default();
        gateway.add_member(GUILD, 1, &[200, 777]);
        gateway.add_member(GUILD, 2, &[100]);

        let reset = run_auto_reset_sweep(&store, &gateway, &KeyedLocks::new(), now).await.unwrap();

        assert_eq!(reset, vec![GuildId::new(GUILD)]);
        for user in [1, 2] {
            let progress = store.progress(GUILD, user);
            assert_eq!((progress.xp, progress.level, progress.voice_xp_earned), (0, 0, 0));
            assert_eq!(store.marker(GUILD, user), 0);
        }
        assert_eq!(gateway.roles_of(GUILD, 1), vec![RoleId::new(777)]);
        assert!(gateway.roles_of(GUILD, 2).is_empty());
        assert_eq!(store.last_reset(GUILD), Some(now));
    }

    #[tokio::test]
    async fn test_schedule_not_yet_due() {
        let now = Utc::now();
        let store = MemoryStore::default();
        store.set_progress(GUILD, 1, 3000);
        store.add_schedule(GUILD, 7, now - Duration::days(3));
        let gateway = FakeGateway::default();

        let reset = run_auto_reset_sweep(&store, &gateway, &KeyedLocks::new(), now).await.unwrap();

        assert!(reset.is_empty());
        assert_eq!(store.progress(GUILD, 1).xp, 3000);
        assert_eq!(store.last_reset(GUILD), Some(now - Duration::days(3)));
    }

    #[tokio::test]
    async fn test_manual_reset_counts_failures() {
        let store = MemoryStore::default();
        store.add_rule(GUILD, 1, 100);
        store.set_progress(GUILD, 1, 1000);
        store.set_progress(GUILD, 2, 1000);
        let gateway = FakeGateway::default();
        gateway.add_member(GUILD, 1, &[100]);
        gateway.add_member(GUILD, 2, &[100]);
        gateway.deny_role_changes_for(2);

        let report = reset_guild(&store, &gateway, &KeyedLocks::new(), GuildId::new(GUILD))
            .await
            .unwrap();

        assert_eq!(report.members_reset, 2);
        assert_eq!(report.roles_stripped, 1);
        assert_eq!(report.errors, 1);
    }

    #[tokio::test]
    async fn test_reset_strips_all_reward_roles_in_one_edit() {
        let store = MemoryStore::default();
        store.add_rule(GUILD, 1, 100);
        store.add_rule(GUILD, 5, 200);
        store.set_progress(GUILD, 1, 5000);
        let gateway = FakeGateway::default();
        gateway.add_member(GUILD, 1, &[100, 300, 200]);

        let report = reset_guild(&store, &gateway, &KeyedLocks::new(), GuildId::new(GUILD))
            .await
            .unwrap();

        assert_eq!(report.roles_stripped, 1);
        assert_eq!(gateway.mutation_count(), 1);
        assert_eq!(gateway.roles_of(GUILD, 1), vec![RoleId::new(300)]);
    }

    #[tokio::test]
    async fn test_reset_waits_for_in_flight_award() {
        let store = Arc::new(MemoryStore::default());
        store.set_progress(GUILD, 1, 5000);
        let gateway = Arc::new(FakeGateway::default());
        gateway.add_member(GUILD, 1, &[]);
        let locks = Arc::new(KeyedLocks::new());
        let (loaded, release) = store.pause_next_load();

        let award = {
            let (store, gateway, locks) = (store.clone(), gateway.clone(), locks.clone());
            tokio::spawn(async move {
                award_xp(
                    store.as_ref(),
                    gateway.as_ref(),
                    &locks,
                    GuildId::new(GUILD),
                    UserId::new(1),
                    10,
                )
                .await
                .unwrap()
            })
        };
        // The award has read 5000 XP and is suspended before saving
        loaded.notified().await;

        let reset = {
            let (store, gateway, locks) = (store.clone(), gateway.clone(), locks.clone());
            tokio::spawn(async move {
                reset_guild(store.as_ref(), gateway.as_ref(), &locks, GuildId::new(GUILD))
                    .await
                    .unwrap()
            })
        };
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        assert!(!reset.is_finished());

        release.notify_one();
        assert_eq!(award.await.unwrap().progress.xp, 5010);
        reset.await.unwrap();

        let progress = store.progress(GUILD, 1);
        assert_eq!((progress.xp, progress.level), (0, 0));
        assert_eq!(store.marker(GUILD, 1), 0);
    }
}
