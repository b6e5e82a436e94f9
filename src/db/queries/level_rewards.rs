use sqlx::PgPool;

use crate::db::models::LevelReward;

pub async fn upsert(
    pool: &PgPool,
    guild_id: i64,
    level: i64,
    role_id: i64,
) -> Result<LevelReward, sqlx::Error> {
    sqlx::query_as::<_, LevelReward>(
        r#"
        INSERT INTO level_roles (guild_id, level, role_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (guild_id, level)
        DO UPDATE SET role_id = EXCLUDED.role_id
        RETURNING *
        "#,
    )
    .bind(guild_id)
    .bind(level)
    .bind(role_id)
    .fetch_one(pool)
    .await
}

pub async fn remove(pool: &PgPool, guild_id: i64, level: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM level_roles WHERE guild_id = $1 AND level = $2")
        .bind(guild_id)
        .bind(level)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// All rules for a guild, highest level first
pub async fn list_desc(pool: &PgPool, guild_id: i64) -> Result<Vec<LevelReward>, sqlx::Error> {
    sqlx::query_as::<_, LevelReward>(
        "SELECT * FROM level_roles WHERE guild_id = $1 ORDER BY level DESC",
    )
    .bind(guild_id)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool, guild_id: i64) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM level_roles WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}
