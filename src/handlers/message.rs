use std::sync::Arc;
use std::time::Instant;

use serenity::all::{Attachment, Context, Message};
use tracing::debug;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::leveling::xp::award_xp;
use crate::services::restrictions::enforcer;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

fn is_image(attachment: &Attachment) -> bool {
    if let Some(content_type) = &attachment.content_type {
        return content_type.starts_with("image/");
    }

    attachment
        .filename
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub async fn handle_message(ctx: &Context, data: &Arc<Data>, message: &Message) -> Result<(), Error> {
    if message.author.bot {
        return Ok(());
    }
    let Some(guild_id) = message.guild_id else {
        return Ok(());
    };

    if enforcer::enforce(ctx, data, message).await? {
        return Ok(());
    }

    if !data
        .xp_cooldowns
        .try_acquire((guild_id.get(), message.author.id.get()), Instant::now())
    {
        return Ok(());
    }

    let amount = if message.attachments.iter().any(is_image) {
        data.settings.image_xp
    } else {
        data.settings.message_xp
    };

    let award = award_xp(&data.pool, ctx, &data.xp_locks, guild_id, message.author.id, amount).await?;
    debug!(
        "Awarded {} XP to {} in {} (total {}, level {})",
        award.applied, message.author.id, guild_id, award.progress.xp, award.progress.level
    );

    Ok(())
}
