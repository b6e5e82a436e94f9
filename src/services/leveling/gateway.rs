//! Chat-platform seam for the leveling core.

use std::collections::HashSet;
use std::future::Future;

use serenity::all::{ChannelId, Context, EditMember, GuildId, RoleId, UserId};
use tracing::debug;

use crate::bot::error::{is_not_found, Error};

/// Audit log reason attached to every reward role change
const ROLE_SYNC_REASON: &str = "Level reward sync";

/// `current` with every role in `remove` taken out, order preserved
pub fn roles_without(current: &[RoleId], remove: &[RoleId]) -> Vec<RoleId> {
    current
        .iter()
        .filter(|role| !remove.contains(role))
        .copied()
        .collect()
}

pub trait GuildGateway: Send + Sync {
    /// Roles a member currently holds, `None` if the member can't be resolved
    fn member_roles(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Vec<RoleId>>, Error>> + Send;

    fn role_exists(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> impl Future<Output = bool> + Send;

    fn add_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Take several roles off a member in a single edit
    fn remove_roles(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> impl Future<Output = Result<(), Error>> + Send;

    fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Members holding at least one of `roles`, with the matching roles
    fn members_with_any_role(
        &self,
        guild_id: GuildId,
        roles: &HashSet<RoleId>,
    ) -> impl Future<Output = Vec<(UserId, Vec<RoleId>)>> + Send;
}

impl GuildGateway for Context {
    async fn member_roles(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Option<Vec<RoleId>>, Error> {
        let cached = self
            .cache
            .guild(guild_id)
            .and_then(|guild| guild.members.get(&user_id).map(|m| m.roles.clone()));

        if cached.is_some() {
            return Ok(cached);
        }

        match guild_id.member(self, user_id).await {
            Ok(member) => Ok(Some(member.roles)),
            Err(e) if is_not_found(&e) => {
                debug!("Member {} is no longer in guild {}", user_id, guild_id);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn role_exists(&self, guild_id: GuildId, role_id: RoleId) -> bool {
        let cached = self
            .cache
            .guild(guild_id)
            .map(|guild| guild.roles.contains_key(&role_id));

        match cached {
            Some(exists) => exists,
            None => guild_id
                .roles(&self.http)
                .await
                .map(|roles| roles.contains_key(&role_id))
                .unwrap_or(false),
        }
    }

    async fn add_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId) -> Result<(), Error> {
        self.http
            .add_member_role(guild_id, user_id, role_id, Some(ROLE_SYNC_REASON))
            .await?;
        Ok(())
    }

    async fn remove_roles(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> Result<(), Error> {
        let Some(current) = self.member_roles(guild_id, user_id).await? else {
            return Ok(());
        };
        if !current.iter().any(|role| role_ids.contains(role)) {
            return Ok(());
        }

        let kept = roles_without(&current, role_ids);
        guild_id
            .edit_member(
                self,
                user_id,
                EditMember::new().roles(kept).audit_log_reason(ROLE_SYNC_REASON),
            )
            .await?;
        Ok(())
    }

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<(), Error> {
        channel_id.say(&self.http, content).await?;
        Ok(())
    }

    async fn members_with_any_role(
        &self,
        guild_id: GuildId,
        roles: &HashSet<RoleId>,
    ) -> Vec<(UserId, Vec<RoleId>)> {
        self.cache
            .guild(guild_id)
            .map(|guild| {
                guild
                    .members
                    .values()
                    .filter_map(|member| {
                        let held: Vec<RoleId> = member
                            .roles
                            .iter()
                            .filter(|role| roles.contains(role))
                            .copied()
                            .collect();
                        (!held.is_empty()).then_some((member.user.id, held))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
