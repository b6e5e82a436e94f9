use sqlx::PgPool;

use crate::db::models::BannedGuild;

pub async fn ban(pool: &PgPool, guild_id: i64, banned_by: i64) -> Result<BannedGuild, sqlx::Error> {
    sqlx::query_as::<_, BannedGuild>(
        r#"
        INSERT INTO banned_guilds (guild_id, banned_by, banned_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (guild_id)
        DO UPDATE SET banned_by = EXCLUDED.banned_by, banned_at = NOW()
        RETURNING *
        "#,
    )
    .bind(guild_id)
    .bind(banned_by)
    .fetch_one(pool)
    .await
}

pub async fn unban(pool: &PgPool, guild_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM banned_guilds WHERE guild_id = $1")
        .bind(guild_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_banned(pool: &PgPool, guild_id: i64) -> Result<bool, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM banned_guilds WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_one(pool)
        .await?;

    Ok(row.0 > 0)
}
