use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::models::AutoResetSchedule;

/// Set (or replace) a guild's schedule; the clock starts now
pub async fn upsert(
    pool: &PgPool,
    guild_id: i64,
    days: i32,
) -> Result<AutoResetSchedule, sqlx::Error> {
    sqlx::query_as::<_, AutoResetSchedule>(
        r#"
        INSERT INTO auto_reset (guild_id, days, last_reset)
        VALUES ($1, $2, NOW())
        ON CONFLICT (guild_id)
        DO UPDATE SET days = EXCLUDED.days, last_reset = NOW()
        RETURNING *
        "#,
    )
    .bind(guild_id)
    .bind(days)
    .fetch_one(pool)
    .await
}

pub async fn get(pool: &PgPool, guild_id: i64) -> Result<Option<AutoResetSchedule>, sqlx::Error> {
    sqlx::query_as::<_, AutoResetSchedule>("SELECT * FROM auto_reset WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<AutoResetSchedule>, sqlx::Error> {
    sqlx::query_as::<_, AutoResetSchedule>("SELECT * FROM auto_reset")
        .fetch_all(pool)
        .await
}

pub async fn remove(pool: &PgPool, guild_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM auto_reset WHERE guild_id = $1")
        .bind(guild_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn mark_reset(
    pool: &PgPool,
    guild_id: i64,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE auto_reset SET last_reset = $2 WHERE guild_id = $1")
        .bind(guild_id)
        .bind(at)
        .execute(pool)
        .await?;

    Ok(())
}
