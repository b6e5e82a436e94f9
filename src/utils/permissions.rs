use serenity::all::{Context, GuildId, Member, RoleId};

/// Guild owner or a member with administrator permissions
pub fn is_owner_or_admin(ctx: &Context, guild_id: GuildId, member: &Member) -> bool {
    ctx.cache
        .guild(guild_id)
        .map(|guild| {
            guild.owner_id == member.user.id || guild.member_permissions(member).administrator()
        })
        .unwrap_or(false)
}

/// Check if a member holds at least one of the given role IDs
pub fn holds_any_role(held: &[RoleId], roles: &[i64]) -> bool {
    held.iter().any(|role| roles.contains(&(role.get() as i64)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holds_any_role() {
        let held = [RoleId::new(1), RoleId::new(2)];
        assert!(holds_any_role(&held, &[5, 2]));
        assert!(!holds_any_role(&held, &[5]));
        assert!(!holds_any_role(&[], &[1]));
    }
}
