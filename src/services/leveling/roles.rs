//! Level reward role reconciliation.
//!
//! A member should hold exactly one reward role: the one attached to the
//! highest rule whose level they have reached. Every other reward role is
//! stripped. Running a sync twice without a level change is a no-op.

use std::collections::HashSet;

use serenity::all::{GuildId, RoleId, UserId};
use tracing::{debug, info, warn};

use crate::bot::error::Error;
use crate::db::models::LevelReward;
use crate::services::leveling::gateway::GuildGateway;
use crate::services::leveling::store::LevelStore;

/// Role changes needed to bring one member in line with their level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSyncPlan {
    /// Reward role the member should end up with
    pub target: Option<RoleId>,
    /// Managed roles to strip
    pub remove: Vec<RoleId>,
    /// Set when the member lacks the target
    pub add: Option<RoleId>,
}

impl RoleSyncPlan {
    pub fn is_noop(&self) -> bool {
        self.remove.is_empty() && self.add.is_none()
    }
}

/// Result of syncing a single member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSyncOutcome {
    pub target: Option<RoleId>,
    pub changed: bool,
}

/// Counts reported by a guild-wide sync. Members whose sync failed are
/// counted as unchanged and also tallied in `errors`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub changed: usize,
    pub unchanged: usize,
    pub errors: usize,
}

fn role_id(rule: &LevelReward) -> RoleId {
    RoleId::new(rule.role_id as u64)
}

/// Highest rule with `rule.level <= level`
pub fn target_role(rules: &[LevelReward], level: i64) -> Option<RoleId> {
    let mut ordered: Vec<&LevelReward> = rules.iter().collect();
    ordered.sort_by(|a, b| b.level.cmp(&a.level));

    ordered
        .into_iter()
        .find(|rule| rule.level <= level)
        .map(role_id)
}

/// Every role that appears in some rule of the guild
pub fn managed_roles(rules: &[LevelReward]) -> HashSet<RoleId> {
    rules.iter().map(role_id).collect()
}

/// Work out which reward roles to strip and which to grant.
///
/// `target_available` is false when the target role was deleted from the
/// guild; the member then gets nothing added but still loses the others.
pub fn plan_role_sync(
    rules: &[LevelReward],
    level: i64,
    held: &[RoleId],
    target_available: bool,
) -> RoleSyncPlan {
    let managed = managed_roles(rules);
    let target = target_role(rules, level).filter(|_| target_available);

    let mut remove: Vec<RoleId> = held
        .iter()
        .filter(|role| managed.contains(role) && Some(**role) != target)
        .copied()
        .collect();
    remove.sort();
    remove.dedup();

    let add = target.filter(|role| !held.contains(role));

    RoleSyncPlan {
        target,
        remove,
        add,
    }
}

/// Bring one member's reward roles in line with `level`
pub async fn sync_member_roles<S, G>(
    store: &S,
    gateway: &G,
    guild_id: GuildId,
    user_id: UserId,
    level: i64,
) -> Result<RoleSyncOutcome, Error>
where
    S: LevelStore,
    G: GuildGateway,
{
    let rules = store.reward_rules(guild_id.get() as i64).await?;
    apply_role_sync(gateway, &rules, guild_id, user_id, level).await
}

async fn apply_role_sync<G: GuildGateway>(
    gateway: &G,
    rules: &[LevelReward],
    guild_id: GuildId,
    user_id: UserId,
    level: i64,
) -> Result<RoleSyncOutcome, Error> {
    if rules.is_empty() {
        return Ok(RoleSyncOutcome::default());
    }

    let held = match gateway.member_roles(guild_id, user_id).await? {
        Some(roles) => roles,
        None => {
            debug!("Skipping role sync for departed member {}", user_id);
            return Ok(RoleSyncOutcome::default());
        }
    };

    let target_available = match target_role(rules, level) {
        Some(role) => gateway.role_exists(guild_id, role).await,
        None => false,
    };

    let plan = plan_role_sync(rules, level, &held, target_available);

    if !plan.remove.is_empty() {
        gateway.remove_roles(guild_id, user_id, &plan.remove).await?;
    }
    if let Some(role) = plan.add {
        gateway.add_role(guild_id, user_id, role).await?;
    }

    if !plan.is_noop() {
        debug!(
            "Synced reward roles for user {} at level {}: -{:?} +{:?}",
            user_id, level, plan.remove, plan.add
        );
    }

    Ok(RoleSyncOutcome {
        target: plan.target,
        changed: !plan.is_noop(),
    })
}

/// Sync every tracked member of a guild. Per-member failures (missing
/// permissions, role hierarchy) are logged and do not abort the batch.
pub async fn sync_guild_roles<S, G>(store: &S, gateway: &G, guild_id: GuildId) -> Result<SyncReport, Error>
where
    S: LevelStore,
    G: GuildGateway,
{
    let rules = store.reward_rules(guild_id.get() as i64).await?;
    let members = store.guild_progress(guild_id.get() as i64).await?;
    let mut report = SyncReport::default();

    for progress in members {
        let user_id = UserId::new(progress.user_id as u64);

        match apply_role_sync(gateway, &rules, guild_id, user_id, progress.level).await {
            Ok(outcome) if outcome.changed => report.changed += 1,
            Ok(_) => report.unchanged += 1,
            Err(e) => {
                warn!("Role sync failed for user {} in guild {}: {}", user_id, guild_id, e);
                report.unchanged += 1;
                report.errors += 1;
            }
        }
    }

    info!(
        "Role sync for guild {}: {} changed, {} unchanged ({} errors)",
        guild_id, report.changed, report.unchanged, report.errors
    );

    Ok(report)
}
