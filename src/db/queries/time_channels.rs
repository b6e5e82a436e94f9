use sqlx::PgPool;

use crate::db::models::TimeChannelConfig;

pub async fn upsert(
    pool: &PgPool,
    guild_id: i64,
    date_channel_id: i64,
    india_channel_id: i64,
    japan_channel_id: i64,
) -> Result<TimeChannelConfig, sqlx::Error> {
    sqlx::query_as::<_, TimeChannelConfig>(
        r#"
        INSERT INTO time_channel_config (guild_id, date_channel_id, india_channel_id, japan_channel_id, updated_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (guild_id) DO UPDATE SET
            date_channel_id = EXCLUDED.date_channel_id,
            india_channel_id = EXCLUDED.india_channel_id,
            japan_channel_id = EXCLUDED.japan_channel_id,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(guild_id)
    .bind(date_channel_id)
    .bind(india_channel_id)
    .bind(japan_channel_id)
    .fetch_one(pool)
    .await
}

pub async fn get(pool: &PgPool, guild_id: i64) -> Result<Option<TimeChannelConfig>, sqlx::Error> {
    sqlx::query_as::<_, TimeChannelConfig>("SELECT * FROM time_channel_config WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<TimeChannelConfig>, sqlx::Error> {
    sqlx::query_as::<_, TimeChannelConfig>("SELECT * FROM time_channel_config")
        .fetch_all(pool)
        .await
}
