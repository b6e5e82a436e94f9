use std::sync::Arc;

use serenity::all::{ChannelId, Context, GuildId, Message};
use sqlx::PgPool;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::bot::data::Data;
use crate::bot::error::{is_not_found, Error};
use crate::constants::intervals::NO_TEXT_WARNING_LIFETIME;
use crate::db::queries::restrictions;
use crate::services::restrictions::detector::{evaluate, ChannelRules, MessageFacts, Verdict};
use crate::utils::permissions::{holds_any_role, is_owner_or_admin};

/// Restrictions configured on a channel
pub async fn load_rules(pool: &PgPool, channel_id: ChannelId) -> Result<ChannelRules, Error> {
    let channel = channel_id.get() as i64;

    let filters = restrictions::link_filters_for_channel(pool, channel).await?;
    let media_only = restrictions::get_no_text(pool, channel)
        .await?
        .map(|config| ChannelId::new(config.redirect_channel_id as u64));

    Ok(ChannelRules { filters, media_only })
}

/// Warning posted after removing plain text from a media-only channel
pub fn no_text_warning(author: &str, redirect: Option<ChannelId>) -> String {
    let pointer = match redirect {
        Some(channel) => format!(" Please use <#{}> for text-only messages.", channel),
        None => String::new(),
    };

    format!(
        "🚫📝 {}, this channel is for **media and links only**! \
         Plain text messages are not allowed.{}\n\n\
         **Allowed:** Images, Videos, YouTube/Instagram/Other links\n\
         **Not Allowed:** Plain text only",
        author, pointer
    )
}

/// Apply channel restrictions to a message. Returns true when the message
/// was removed and must not earn XP.
pub async fn enforce(ctx: &Context, data: &Arc<Data>, message: &Message) -> Result<bool, Error> {
    let Some(guild_id) = message.guild_id else {
        return Ok(false);
    };

    let rules = load_rules(&data.pool, message.channel_id).await?;
    if rules.is_empty() {
        return Ok(false);
    }

    let facts = MessageFacts {
        content: &message.content,
        has_attachments: !message.attachments.is_empty(),
        has_embeds: !message.embeds.is_empty(),
    };

    let verdict = evaluate(&rules, &facts);
    if verdict == Verdict::Allow {
        return Ok(false);
    }

    if is_exempt(ctx, data, guild_id, message).await? {
        return Ok(false);
    }

    if let Err(e) = message.delete(ctx).await {
        if is_not_found(&e) {
            debug!("Message {} already deleted in channel {}", message.id, message.channel_id);
        } else {
            warn!("No permission to delete message in channel {}: {}", message.channel_id, e);
        }
        return Ok(false);
    }

    match verdict {
        Verdict::DeleteSilently(filter) => {
            info!(
                "Removed message from {} in channel {} ({})",
                message.author.id,
                message.channel_id,
                filter.label()
            );
        }
        Verdict::DeleteWithWarning { redirect } => {
            let redirect = redirect_if_present(ctx, guild_id, redirect);
            post_temporary_warning(ctx, message, redirect).await;
        }
        Verdict::Allow => {}
    }

    Ok(true)
}

async fn is_exempt(ctx: &Context, data: &Arc<Data>, guild_id: GuildId, message: &Message) -> Result<bool, Error> {
    let member = match guild_id.member(ctx, message.author.id).await {
        Ok(member) => member,
        Err(e) => {
            debug!("Could not resolve member {}: {}", message.author.id, e);
            return Ok(false);
        }
    };

    if is_owner_or_admin(ctx, guild_id, &member) {
        return Ok(true);
    }

    let bypass = restrictions::list_bypass_roles(&data.pool, guild_id.get() as i64).await?;
    Ok(holds_any_role(&member.roles, &bypass))
}

/// The redirect channel, if it still exists
fn redirect_if_present(ctx: &Context, guild_id: GuildId, redirect: ChannelId) -> Option<ChannelId> {
    ctx.cache
        .guild(guild_id)
        .map(|guild| guild.channels.contains_key(&redirect))
        .unwrap_or(false)
        .then_some(redirect)
}

async fn post_temporary_warning(ctx: &Context, message: &Message, redirect: Option<ChannelId>) {
    let content = no_text_warning(&format!("<@{}>", message.author.id), redirect);

    let warning = match message.channel_id.say(&ctx.http, content).await {
        Ok(warning) => warning,
        Err(e) => {
            warn!("Could not post no-text warning in {}: {}", message.channel_id, e);
            return;
        }
    };

    let http = ctx.http.clone();
    tokio::spawn(async move {
        sleep(NO_TEXT_WARNING_LIFETIME).await;
        if let Err(e) = warning.delete(&*http).await {
            debug!("Could not delete no-text warning: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_with_redirect() {
        let warning = no_text_warning("<@1>", Some(ChannelId::new(55)));
        assert!(warning.starts_with("🚫📝 <@1>, this channel is for **media and links only**!"));
        assert!(warning.contains("Please use <#55> for text-only messages."));
        assert!(warning.ends_with("**Not Allowed:** Plain text only"));
    }

    #[test]
    fn test_warning_without_redirect() {
        let warning = no_text_warning("<@1>", None);
        assert!(warning.contains("Plain text messages are not allowed.\n\n"));
        assert!(!warning.contains("Please use"));
    }
}
