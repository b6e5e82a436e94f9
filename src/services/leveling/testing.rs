//! In-memory doubles for the leveling seams.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, GuildId, RoleId, UserId};
use tokio::sync::Notify;

use crate::bot::error::Error;
use crate::constants::leveling::level_for_xp;
use crate::db::models::{AutoResetSchedule, LevelReward, UserProgress};
use crate::services::leveling::gateway::{roles_without, GuildGateway};
use crate::services::leveling::store::LevelStore;

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<(i64, i64), UserProgress>>,
    rules: Mutex<Vec<LevelReward>>,
    channels: Mutex<HashMap<i64, i64>>,
    markers: Mutex<HashMap<(i64, i64), i64>>,
    schedules: Mutex<Vec<AutoResetSchedule>>,
    failing_loads: Mutex<usize>,
    load_gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl MemoryStore {
    pub fn add_rule(&self, guild: u64, level: i64, role: u64) {
        self.rules
            .lock()
            .unwrap()
            .push(LevelReward::new(guild as i64, level, role as i64));
    }

    pub fn set_progress(&self, guild: u64, user: u64, xp: i64) {
        let mut progress = UserProgress::new(guild as i64, user as i64);
        progress.xp = xp;
        progress.level = level_for_xp(xp);
        self.users
            .lock()
            .unwrap()
            .insert((guild as i64, user as i64), progress);
    }

    pub fn progress(&self, guild: u64, user: u64) -> UserProgress {
        self.users
            .lock()
            .unwrap()
            .get(&(guild as i64, user as i64))
            .cloned()
            .unwrap_or_else(|| UserProgress::new(guild as i64, user as i64))
    }

    pub fn has_progress(&self, guild: u64, user: u64) -> bool {
        self.users
            .lock()
            .unwrap()
            .contains_key(&(guild as i64, user as i64))
    }

    pub fn set_notify_channel(&self, guild: u64, channel: u64) {
        self.channels
            .lock()
            .unwrap()
            .insert(guild as i64, channel as i64);
    }

    pub fn marker(&self, guild: u64, user: u64) -> i64 {
        self.markers
            .lock()
            .unwrap()
            .get(&(guild as i64, user as i64))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_marker(&self, guild: u64, user: u64, level: i64) {
        self.markers
            .lock()
            .unwrap()
            .insert((guild as i64, user as i64), level);
    }

    pub fn add_schedule(&self, guild: u64, days: i32, last_reset: DateTime<Utc>) {
        self.schedules.lock().unwrap().push(AutoResetSchedule {
            guild_id: guild as i64,
            days,
            last_reset,
        });
    }

    pub fn last_reset(&self, guild: u64) -> Option<DateTime<Utc>> {
        self.schedules
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.guild_id == guild as i64)
            .map(|s| s.last_reset)
    }

    /// The next `count` loads fail as if the database were unreachable
    pub fn fail_next_loads(&self, count: usize) {
        *self.failing_loads.lock().unwrap() = count;
    }

    /// Suspend the next load after it has read its record. The first notify
    /// fires once the read happened, the second one lets the load return.
    pub fn pause_next_load(&self) -> (Arc<Notify>, Arc<Notify>) {
        let loaded = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.load_gate.lock().unwrap() = Some((loaded.clone(), release.clone()));
        (loaded, release)
    }
}

impl LevelStore for MemoryStore {
    async fn load_progress(&self, guild_id: i64, user_id: i64) -> Result<UserProgress, Error> {
        {
            let mut failing = self.failing_loads.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(Error::custom("database unavailable"));
            }
        }

        let progress = self
            .users
            .lock()
            .unwrap()
            .entry((guild_id, user_id))
            .or_insert_with(|| UserProgress::new(guild_id, user_id))
            .clone();

        let gate = self.load_gate.lock().unwrap().take();
        if let Some((loaded, release)) = gate {
            loaded.notify_one();
            release.notified().await;
        }
        Ok(progress)
    }

    async fn save_progress(&self, progress: &UserProgress) -> Result<(), Error> {
        self.users
            .lock()
            .unwrap()
            .insert((progress.guild_id, progress.user_id), progress.clone());
        Ok(())
    }

    async fn guild_progress(&self, guild_id: i64) -> Result<Vec<UserProgress>, Error> {
        let mut members: Vec<UserProgress> = self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.guild_id == guild_id)
            .cloned()
            .collect();
        members.sort_by_key(|p| p.user_id);
        Ok(members)
    }

    async fn reward_rules(&self, guild_id: i64) -> Result<Vec<LevelReward>, Error> {
        let mut rules: Vec<LevelReward> = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.guild_id == guild_id)
            .cloned()
            .collect();
        rules.sort_by(|a, b| b.level.cmp(&a.level));
        Ok(rules)
    }

    async fn notify_channel(&self, guild_id: i64) -> Result<Option<i64>, Error> {
        Ok(self.channels.lock().unwrap().get(&guild_id).copied())
    }

    async fn notified_level(&self, guild_id: i64, user_id: i64) -> Result<i64, Error> {
        Ok(self.marker(guild_id as u64, user_id as u64))
    }

    async fn set_notified_level(&self, guild_id: i64, user_id: i64, level: i64) -> Result<(), Error> {
        self.set_marker(guild_id as u64, user_id as u64, level);
        Ok(())
    }

    async fn reset_guild(&self, guild_id: i64) -> Result<u64, Error> {
        let mut touched = 0;
        for progress in self.users.lock().unwrap().values_mut() {
            if progress.guild_id == guild_id {
                progress.reset();
                touched += 1;
            }
        }
        for ((guild, _), level) in self.markers.lock().unwrap().iter_mut() {
            if *guild == guild_id {
                *level = 0;
            }
        }
        Ok(touched)
    }

    async fn auto_reset_schedules(&self) -> Result<Vec<AutoResetSchedule>, Error> {
        Ok(self.schedules.lock().unwrap().clone())
    }

    async fn mark_reset(&self, guild_id: i64, at: DateTime<Utc>) -> Result<(), Error> {
        for schedule in self.schedules.lock().unwrap().iter_mut() {
            if schedule.guild_id == guild_id {
                schedule.last_reset = at;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeGateway {
    members: Mutex<HashMap<(GuildId, UserId), Vec<RoleId>>>,
    guild_roles: Mutex<HashSet<RoleId>>,
    denied_users: Mutex<HashSet<UserId>>,
    added: Mutex<Vec<RoleId>>,
    mutations: Mutex<usize>,
    sent: Mutex<Vec<(ChannelId, String)>>,
    fail_sends: Mutex<bool>,
}

impl FakeGateway {
    pub fn add_member(&self, guild: u64, user: u64, roles: &[u64]) {
        self.members.lock().unwrap().insert(
            (GuildId::new(guild), UserId::new(user)),
            roles.iter().copied().map(RoleId::new).collect(),
        );
    }

    pub fn add_roles_to_guild(&self, roles: &[u64]) {
        self.guild_roles
            .lock()
            .unwrap()
            .extend(roles.iter().copied().map(RoleId::new));
    }

    pub fn deny_role_changes_for(&self, user: u64) {
        self.denied_users.lock().unwrap().insert(UserId::new(user));
    }

    pub fn fail_sends(&self, fail: bool) {
        *self.fail_sends.lock().unwrap() = fail;
    }

    pub fn roles_of(&self, guild: u64, user: u64) -> Vec<RoleId> {
        self.members
            .lock()
            .unwrap()
            .get(&(GuildId::new(guild), UserId::new(user)))
            .cloned()
            .unwrap_or_default()
    }

    pub fn ever_added(&self, role: u64) -> bool {
        self.added.lock().unwrap().contains(&RoleId::new(role))
    }

    pub fn mutation_count(&self) -> usize {
        *self.mutations.lock().unwrap()
    }

    pub fn sent_messages(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().unwrap().clone()
    }

    fn check_allowed(&self, user_id: UserId) -> Result<(), Error> {
        if self.denied_users.lock().unwrap().contains(&user_id) {
            return Err(Error::PermissionDenied("Missing Permissions".to_string()));
        }
        Ok(())
    }
}

impl GuildGateway for FakeGateway {
    async fn member_roles(&self, guild_id: GuildId, user_id: UserId) -> Result<Option<Vec<RoleId>>, Error> {
        Ok(self.members.lock().unwrap().get(&(guild_id, user_id)).cloned())
    }

    async fn role_exists(&self, _guild_id: GuildId, role_id: RoleId) -> bool {
        self.guild_roles.lock().unwrap().contains(&role_id)
    }

    async fn add_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId) -> Result<(), Error> {
        self.check_allowed(user_id)?;
        if let Some(roles) = self.members.lock().unwrap().get_mut(&(guild_id, user_id)) {
            roles.push(role_id);
        }
        self.added.lock().unwrap().push(role_id);
        *self.mutations.lock().unwrap() += 1;
        Ok(())
    }

    async fn remove_roles(&self, guild_id: GuildId, user_id: UserId, role_ids: &[RoleId]) -> Result<(), Error> {
        self.check_allowed(user_id)?;
        if let Some(roles) = self.members.lock().unwrap().get_mut(&(guild_id, user_id)) {
            *roles = roles_without(roles, role_ids);
        }
        // One member edit regardless of how many roles go
        *self.mutations.lock().unwrap() += 1;
        Ok(())
    }

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<(), Error> {
        if *self.fail_sends.lock().unwrap() {
            return Err(Error::ChannelNotFound(channel_id.get()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel_id, content.to_string()));
        Ok(())
    }

    async fn members_with_any_role(
        &self,
        guild_id: GuildId,
        roles: &HashSet<RoleId>,
    ) -> Vec<(UserId, Vec<RoleId>)> {
        let mut found: Vec<(UserId, Vec<RoleId>)> = self
            .members
            .lock()
            .unwrap()
            .iter()
            .filter(|((guild, _), _)| *guild == guild_id)
            .filter_map(|((_, user), held)| {
                let managed: Vec<RoleId> = held.iter().filter(|r| roles.contains(r)).copied().collect();
                (!managed.is_empty()).then_some((*user, managed))
            })
            .collect();
        found.sort_by_key(|(user, _)| *user);
        found
    }
}
