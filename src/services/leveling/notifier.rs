use serenity::all::{ChannelId, GuildId, RoleId, UserId};
use tracing::{debug, info, warn};

use crate::bot::error::Error;
use crate::services::leveling::gateway::GuildGateway;
use crate::services::leveling::roles::sync_member_roles;
use crate::services::leveling::store::LevelStore;

/// Announcement posted to the guild's level channel
pub fn level_up_message(user_id: UserId, level: i64, role: Option<RoleId>) -> String {
    let mut message = format!("🎉 Congrats <@{}>! You reached **Level {}**!", user_id, level);

    if let Some(role) = role {
        message.push_str(&format!("\n🏅 <@{}> received <@&{}>!", user_id, role));
    }

    message
}

/// Level-up gate: announce `level` at most once per member.
///
/// When `level` is above the stored marker the member's reward roles are
/// reconciled and the announcement is sent. The marker only moves after a
/// successful send, so a failed send is retried on the next award.
/// Returns whether an announcement went out.
pub async fn notify_level_up<S, G>(
    store: &S,
    gateway: &G,
    guild_id: GuildId,
    user_id: UserId,
    level: i64,
) -> Result<bool, Error>
where
    S: LevelStore,
    G: GuildGateway,
{
    let guild = guild_id.get() as i64;
    let user = user_id.get() as i64;

    let marker = store.notified_level(guild, user).await?;
    if level <= marker {
        return Ok(false);
    }

    let target = match sync_member_roles(store, gateway, guild_id, user_id, level).await {
        Ok(outcome) => outcome.target,
        Err(e) => {
            warn!("Could not sync reward roles for {} in {}: {}", user_id, guild_id, e);
            None
        }
    };

    let Some(channel) = store.notify_channel(guild).await? else {
        debug!("No level channel configured for guild {}", guild_id);
        return Ok(false);
    };

    let content = level_up_message(user_id, level, target);

    match gateway.send_message(ChannelId::new(channel as u64), &content).await {
        Ok(()) => {
            store.set_notified_level(guild, user, level).await?;
            info!("User {} reached level {} in guild {}", user_id, level, guild_id);
            Ok(true)
        }
        Err(e) => {
            warn!(
                "Failed to send level-up message to channel {} in guild {}: {}",
                channel, guild_id, e
            );
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::leveling::testing::{FakeGateway, MemoryStore};

    const GUILD: u64 = 1;
    const USER: u64 = 2;
    const CHANNEL: u64 = 3;

    fn ids() -> (GuildId, UserId) {
        (GuildId::new(GUILD), UserId::new(USER))
    }

    #[test]
    fn test_message_format() {
        let user = UserId::new(USER);
        assert_eq!(
            level_up_message(user, 4, None),
            "🎉 Congrats <@2>! You reached **Level 4**!"
        );
        assert_eq!(
            level_up_message(user, 4, Some(RoleId::new(9))),
            "🎉 Congrats <@2>! You reached **Level 4**!\n🏅 <@2> received <@&9>!"
        );
    }

    #[tokio::test]
    async fn test_announces_once_per_level() {
        let store = MemoryStore::default();
        store.set_notify_channel(GUILD, CHANNEL);
        let gateway = FakeGateway::default();
        gateway.add_member(GUILD, USER, &[]);
        let (guild, user) = ids();

        assert!(notify_level_up(&store, &gateway, guild, user, 1).await.unwrap());
        assert!(!notify_level_up(&store, &gateway, guild, user, 1).await.unwrap());

        assert_eq!(gateway.sent_messages().len(), 1);
        assert_eq!(store.marker(GUILD, USER), 1);
    }

    #[tokio::test]
    async fn test_failed_send_keeps_marker() {
        let store = MemoryStore::default();
        store.set_notify_channel(GUILD, CHANNEL);
        let gateway = FakeGateway::default();
        gateway.add_member(GUILD, USER, &[]);
        gateway.fail_sends(true);
        let (guild, user) = ids();

        assert!(!notify_level_up(&store, &gateway, guild, user, 2).await.unwrap());
        assert_eq!(store.marker(GUILD, USER), 0);

        gateway.fail_sends(false);
        assert!(notify_level_up(&store, &gateway, guild, user, 2).await.unwrap());
        assert_eq!(store.marker(GUILD, USER), 2);
    }

    #[tokio::test]
    async fn test_missing_channel_keeps_marker() {
        let store = MemoryStore::default();
        let gateway = FakeGateway::default();
        gateway.add_member(GUILD, USER, &[]);
        let (guild, user) = ids();

        assert!(!notify_level_up(&store, &gateway, guild, user, 3).await.unwrap());
        assert_eq!(store.marker(GUILD, USER), 0);
        assert!(gateway.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_announcement_mentions_reward_role() {
        let store = MemoryStore::default();
        store.set_notify_channel(GUILD, CHANNEL);
        store.add_rule(GUILD, 1, 50);
        let gateway = FakeGateway::default();
        gateway.add_member(GUILD, USER, &[]);
        gateway.add_roles_to_guild(&[50]);
        let (guild, user) = ids();

        notify_level_up(&store, &gateway, guild, user, 1).await.unwrap();

        let sent = gateway.sent_messages();
        assert_eq!(sent[0].0, ChannelId::new(CHANNEL));
        assert!(sent[0].1.ends_with("received <@&50>!"));
    }
}
