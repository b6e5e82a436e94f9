use chrono::{DateTime, Utc};

/// Media-only channel plus the channel plain text should move to
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NoTextChannel {
    pub channel_id: i64,
    pub guild_id: i64,
    pub redirect_channel_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkFilter {
    /// Strip Discord server invites only
    DiscordInvites,
    /// Strip every link
    AllLinks,
}

impl LinkFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkFilter::DiscordInvites => "discord_invites",
            LinkFilter::AllLinks => "all_links",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "discord_invites" => Some(LinkFilter::DiscordInvites),
            "all_links" => Some(LinkFilter::AllLinks),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LinkFilter::DiscordInvites => "No Discord Invites",
            LinkFilter::AllLinks => "No Links",
        }
    }
}

impl std::fmt::Display for LinkFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LinkRestriction {
    pub channel_id: i64,
    pub guild_id: i64,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl LinkRestriction {
    pub fn filter(&self) -> Option<LinkFilter> {
        LinkFilter::parse(&self.kind)
    }
}
