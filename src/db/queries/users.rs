use sqlx::PgPool;

use crate::db::models::UserProgress;

pub async fn get(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
) -> Result<Option<UserProgress>, sqlx::Error> {
    sqlx::query_as::<_, UserProgress>("SELECT * FROM users WHERE guild_id = $1 AND user_id = $2")
        .bind(guild_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Fetch a member's progress, creating a zeroed row on first activity
pub async fn get_or_create(
    pool: &PgPool,
    guild_id: i64,
    user_id: i64,
) -> Result<UserProgress, sqlx::Error> {
    if let Some(progress) = get(pool, guild_id, user_id).await? {
        return Ok(progress);
    }

    sqlx::query_as::<_, UserProgress>(
        r#"
        INSERT INTO users (guild_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (guild_id, user_id) DO UPDATE SET guild_id = EXCLUDED.guild_id
        RETURNING *
        "#,
    )
    .bind(guild_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn save(pool: &PgPool, progress: &UserProgress) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (guild_id, user_id, xp, level, voice_xp_earned, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        ON CONFLICT (guild_id, user_id)
        DO UPDATE SET
            xp = EXCLUDED.xp,
            level = EXCLUDED.level,
            voice_xp_earned = EXCLUDED.voice_xp_earned,
            updated_at = NOW()
        "#,
    )
    .bind(progress.guild_id)
    .bind(progress.user_id)
    .bind(progress.xp)
    .bind(progress.level)
    .bind(progress.voice_xp_earned)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_for_guild(pool: &PgPool, guild_id: i64) -> Result<Vec<UserProgress>, sqlx::Error> {
    sqlx::query_as::<_, UserProgress>("SELECT * FROM users WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_all(pool)
        .await
}

pub async fn top_by_xp(
    pool: &PgPool,
    guild_id: i64,
    limit: i64,
) -> Result<Vec<UserProgress>, sqlx::Error> {
    sqlx::query_as::<_, UserProgress>(
        r#"
        SELECT * FROM users
        WHERE guild_id = $1
        ORDER BY xp DESC
        LIMIT $2
        "#,
    )
    .bind(guild_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Zero XP, level and voice XP for every member of a guild
pub async fn reset_guild(pool: &PgPool, guild_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET xp = 0, level = 0, voice_xp_earned = 0, updated_at = NOW()
        WHERE guild_id = $1
        "#,
    )
    .bind(guild_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
