use sqlx::PgPool;

use crate::db::models::{LinkFilter, LinkRestriction, NoTextChannel};

// ============================================================================
// Media-only channels
// ============================================================================

pub async fn set_no_text(
    pool: &PgPool,
    guild_id: i64,
    channel_id: i64,
    redirect_channel_id: i64,
) -> Result<NoTextChannel, sqlx::Error> {
    sqlx::query_as::<_, NoTextChannel>(
        r#"
        INSERT INTO no_text_channels (channel_id, guild_id, redirect_channel_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (channel_id)
        DO UPDATE SET redirect_channel_id = EXCLUDED.redirect_channel_id
        RETURNING *
        "#,
    )
    .bind(channel_id)
    .bind(guild_id)
    .bind(redirect_channel_id)
    .fetch_one(pool)
    .await
}

pub async fn remove_no_text(pool: &PgPool, guild_id: i64, channel_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM no_text_channels WHERE guild_id = $1 AND channel_id = $2")
        .bind(guild_id)
        .bind(channel_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_no_text(pool: &PgPool, channel_id: i64) -> Result<Option<NoTextChannel>, sqlx::Error> {
    sqlx::query_as::<_, NoTextChannel>("SELECT * FROM no_text_channels WHERE channel_id = $1")
        .bind(channel_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_no_text(pool: &PgPool, guild_id: i64) -> Result<Vec<NoTextChannel>, sqlx::Error> {
    sqlx::query_as::<_, NoTextChannel>("SELECT * FROM no_text_channels WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_all(pool)
        .await
}

// ============================================================================
// Link filters
// ============================================================================

/// Add a link filter; returns false if the channel already had it
pub async fn add_link_filter(
    pool: &PgPool,
    guild_id: i64,
    channel_id: i64,
    filter: LinkFilter,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO link_restrictions (channel_id, guild_id, kind)
        VALUES ($1, $2, $3)
        ON CONFLICT (channel_id, kind) DO NOTHING
        "#,
    )
    .bind(channel_id)
    .bind(guild_id)
    .bind(filter.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn remove_link_filter(
    pool: &PgPool,
    guild_id: i64,
    channel_id: i64,
    filter: LinkFilter,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM link_restrictions WHERE guild_id = $1 AND channel_id = $2 AND kind = $3",
    )
    .bind(guild_id)
    .bind(channel_id)
    .bind(filter.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn link_filters_for_channel(
    pool: &PgPool,
    channel_id: i64,
) -> Result<Vec<LinkFilter>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LinkRestriction>(
        "SELECT * FROM link_restrictions WHERE channel_id = $1",
    )
    .bind(channel_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().filter_map(LinkRestriction::filter).collect())
}

pub async fn list_link_filters(
    pool: &PgPool,
    guild_id: i64,
) -> Result<Vec<LinkRestriction>, sqlx::Error> {
    sqlx::query_as::<_, LinkRestriction>("SELECT * FROM link_restrictions WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_all(pool)
        .await
}

// ============================================================================
// Bypass roles
// ============================================================================

pub async fn add_bypass_role(pool: &PgPool, guild_id: i64, role_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO bypass_roles (guild_id, role_id)
        VALUES ($1, $2)
        ON CONFLICT (guild_id, role_id) DO NOTHING
        "#,
    )
    .bind(guild_id)
    .bind(role_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn remove_bypass_role(pool: &PgPool, guild_id: i64, role_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM bypass_roles WHERE guild_id = $1 AND role_id = $2")
        .bind(guild_id)
        .bind(role_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_bypass_roles(pool: &PgPool, guild_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT role_id FROM bypass_roles WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}
