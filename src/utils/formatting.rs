use crate::constants::leveling::XP_PER_LEVEL;

/// Format a channel mention
pub fn mention_channel(channel_id: u64) -> String {
    format!("<#{}>", channel_id)
}

/// Format a role mention
pub fn mention_role(role_id: u64) -> String {
    format!("<@&{}>", role_id)
}

/// Format a number with commas
pub fn format_number(n: i64) -> String {
    let s = n.abs().to_string();
    let mut result = String::new();

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if n < 0 {
        result.push('-');
    }

    result.chars().rev().collect()
}

/// Text bar showing progress through the current level
pub fn level_progress_bar(xp: i64, width: usize) -> String {
    let into_level = xp.max(0) % XP_PER_LEVEL;
    let filled = (into_level as usize * width) / XP_PER_LEVEL as usize;
    format!(
        "{}{} {}/{}",
        "█".repeat(filled),
        "░".repeat(width - filled),
        format_number(into_level),
        format_number(XP_PER_LEVEL)
    )
}

/// Medal or rank number for a leaderboard position (1-based)
pub fn rank_label(position: usize) -> String {
    match position {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("`#{}`", n),
    }
}
