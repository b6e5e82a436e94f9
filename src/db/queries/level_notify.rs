use sqlx::PgPool;

pub async fn set_channel(pool: &PgPool, guild_id: i64, channel_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO level_notify_channel (guild_id, channel_id, updated_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (guild_id)
        DO UPDATE SET channel_id = EXCLUDED.channel_id, updated_at = NOW()
        "#,
    )
    .bind(guild_id)
    .bind(channel_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_channel(pool: &PgPool, guild_id: i64) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT channel_id FROM level_notify_channel WHERE guild_id = $1")
            .bind(guild_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|r| r.0))
}

/// Last level a user was congratulated for (0 if never)
pub async fn get_notified_level(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
) -> Result<i64, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT level FROM last_notified_level WHERE guild_id = $1 AND user_id = $2",
    )
    .bind(guild_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.0).unwrap_or(0))
}

pub async fn set_notified_level(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
    level: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO last_notified_level (guild_id, user_id, level)
        VALUES ($1, $2, $3)
        ON CONFLICT (guild_id, user_id)
        DO UPDATE SET level = EXCLUDED.level
        "#,
    )
    .bind(guild_id)
    .bind(user_id)
    .bind(level)
    .execute(pool)
    .await?;

    Ok(())
}

/// Drop every marker of a guild back to 0 after a reset
pub async fn reset_guild(pool: &PgPool, guild_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE last_notified_level SET level = 0 WHERE guild_id = $1")
        .bind(guild_id)
        .execute(pool)
        .await?;

    Ok(())
}
