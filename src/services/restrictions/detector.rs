//! Message classification for restricted channels.

use once_cell::sync::Lazy;
use regex::Regex;
use serenity::all::ChannelId;

use crate::db::models::LinkFilter;

/// Anything that looks like a URL or a bare domain
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://[^\s<>]+|(?:www\.)?[a-z0-9][a-z0-9-]{1,61}[a-z0-9]\.[a-z]{2,}")
        .unwrap()
});

/// Discord server invites in any of their spellings
static INVITE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:www\.)?(?:discord\.gg|discord\.com/invite|discordapp\.com/invite)/[a-z0-9-]+",
    )
    .unwrap()
});

pub fn contains_link(content: &str) -> bool {
    URL_PATTERN.is_match(content)
}

pub fn contains_invite(content: &str) -> bool {
    INVITE_PATTERN.is_match(content)
}

/// What a restriction check needs to know about a message
#[derive(Debug, Clone, Copy)]
pub struct MessageFacts<'a> {
    pub content: &'a str,
    pub has_attachments: bool,
    pub has_embeds: bool,
}

/// Restrictions configured on one channel
#[derive(Debug, Clone, Default)]
pub struct ChannelRules {
    pub filters: Vec<LinkFilter>,
    /// Set when the channel is media-only; holds the redirect channel
    pub media_only: Option<ChannelId>,
}

impl ChannelRules {
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.media_only.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Delete without telling anyone
    DeleteSilently(LinkFilter),
    /// Delete plain text from a media-only channel and point to the redirect
    DeleteWithWarning { redirect: ChannelId },
}

/// Decide what happens to a message. Link filters are checked before the
/// media-only rule, strictest first.
pub fn evaluate(rules: &ChannelRules, message: &MessageFacts<'_>) -> Verdict {
    if rules.filters.contains(&LinkFilter::AllLinks) && contains_link(message.content) {
        return Verdict::DeleteSilently(LinkFilter::AllLinks);
    }

    if rules.filters.contains(&LinkFilter::DiscordInvites) && contains_invite(message.content) {
        return Verdict::DeleteSilently(LinkFilter::DiscordInvites);
    }

    if let Some(redirect) = rules.media_only {
        let has_media =
            message.has_attachments || message.has_embeds || contains_link(message.content);

        if !has_media && !message.content.trim().is_empty() {
            return Verdict::DeleteWithWarning { redirect };
        }
    }

    Verdict::Allow
}
