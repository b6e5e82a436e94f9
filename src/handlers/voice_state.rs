use std::sync::Arc;
use std::time::Instant;

use serenity::all::{Context, VoiceState};
use tracing::{debug, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::leveling::xp::award_voice_xp;

pub async fn handle_voice_state_update(
    ctx: &Context,
    data: &Arc<Data>,
    old: Option<&VoiceState>,
    new: &VoiceState,
) -> Result<(), Error> {
    let guild_id = match new.guild_id {
        Some(id) => id,
        None => return Ok(()), // DM voice states are not supported
    };

    let user_id = new.user_id;
    let key = (guild_id.get(), user_id.get());
    let old_channel = old.and_then(|o| o.channel_id);

    match (old_channel, new.channel_id) {
        // Opening keeps an existing anchor, so moves and toggles are no-ops
        (_, Some(channel_id)) => {
            let bot = resolve_bot(new.member.as_ref().map(|m| m.user.bot), || {
                ctx.cache.user(user_id).map(|user| user.bot)
            });
            if bot != Some(false) {
                debug!("Not tracking voice for {} (bot: {:?})", user_id, bot);
                return Ok(());
            }

            data.voice_sessions.open(key, Instant::now());
            debug!("Voice session for {} in {}", user_id, channel_id);
        }
        (Some(channel_id), None) => {
            let Some(blocks) = data.voice_sessions.close(key, Instant::now()) else {
                debug!("{} left {} without an open session", user_id, channel_id);
                return Ok(());
            };

            if blocks > 0 {
                if let Err(e) = award_voice_xp(
                    &data.pool,
                    ctx,
                    &data.xp_locks,
                    &data.settings.voice,
                    guild_id,
                    user_id,
                    blocks,
                )
                .await
                {
                    warn!(
                        "Could not award voice XP to {} in {}, {} blocks left for the next tick: {}",
                        user_id, guild_id, blocks, e
                    );
                    data.voice_sessions.refund(key, blocks);
                }
            }
            debug!("Voice session closed for {} ({} blocks)", user_id, blocks);
        }
        (None, None) => {}
    }

    Ok(())
}

/// Bot flag from the event payload, falling back to the user cache.
/// `None` when neither knows the user.
fn resolve_bot(from_event: Option<bool>, cached: impl FnOnce() -> Option<bool>) -> Option<bool> {
    from_event.or_else(cached)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bot_prefers_event_member() {
        assert_eq!(resolve_bot(Some(false), || Some(true)), Some(false));
        assert_eq!(resolve_bot(Some(true), || None), Some(true));
    }

    #[test]
    fn test_resolve_bot_falls_back_to_cache_without_member() {
        assert_eq!(resolve_bot(None, || Some(true)), Some(true));
        assert_eq!(resolve_bot(None, || Some(false)), Some(false));
        assert_eq!(resolve_bot(None, || None), None);
    }
}
