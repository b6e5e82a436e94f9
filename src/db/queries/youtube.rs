use sqlx::PgPool;

use crate::db::models::YouTubeSubscription;

/// Video state recorded for a subscription after setup or an announcement
#[derive(Debug, Clone, Default)]
pub struct VideoMarker<'a> {
    pub video_id: Option<&'a str>,
    pub status: Option<&'a str>,
    pub title_preview: Option<&'a str>,
}

pub async fn upsert(
    pool: &PgPool,
    guild_id: i64,
    yt_channel_id: &str,
    discord_channel_id: i64,
    role_id: Option<i64>,
    yt_channel_name: &str,
    marker: VideoMarker<'_>,
) -> Result<YouTubeSubscription, sqlx::Error> {
    sqlx::query_as::<_, YouTubeSubscription>(
        r#"
        INSERT INTO youtube_notifications (
            guild_id, yt_channel_id, discord_channel_id, role_id, yt_channel_name,
            latest_video_id, last_video_status, latest_video_title_preview, last_updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
        ON CONFLICT (guild_id, yt_channel_id) DO UPDATE SET
            discord_channel_id = EXCLUDED.discord_channel_id,
            role_id = EXCLUDED.role_id,
            yt_channel_name = EXCLUDED.yt_channel_name,
            latest_video_id = EXCLUDED.latest_video_id,
            last_video_status = EXCLUDED.last_video_status,
            latest_video_title_preview = EXCLUDED.latest_video_title_preview,
            last_updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(guild_id)
    .bind(yt_channel_id)
    .bind(discord_channel_id)
    .bind(role_id)
    .bind(yt_channel_name)
    .bind(marker.video_id)
    .bind(marker.status)
    .bind(marker.title_preview)
    .fetch_one(pool)
    .await
}

pub async fn remove(pool: &PgPool, guild_id: i64, yt_channel_id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM youtube_notifications WHERE guild_id = $1 AND yt_channel_id = $2")
            .bind(guild_id)
            .bind(yt_channel_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<YouTubeSubscription>, sqlx::Error> {
    sqlx::query_as::<_, YouTubeSubscription>(
        "SELECT * FROM youtube_notifications ORDER BY yt_channel_id",
    )
    .fetch_all(pool)
    .await
}

pub async fn list_for_guild(
    pool: &PgPool,
    guild_id: i64,
) -> Result<Vec<YouTubeSubscription>, sqlx::Error> {
    sqlx::query_as::<_, YouTubeSubscription>(
        "SELECT * FROM youtube_notifications WHERE guild_id = $1",
    )
    .bind(guild_id)
    .fetch_all(pool)
    .await
}

pub async fn record_latest(
    pool: &PgPool,
    guild_id: i64,
    yt_channel_id: &str,
    marker: VideoMarker<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE youtube_notifications
        SET latest_video_id = $3,
            last_video_status = $4,
            latest_video_title_preview = $5,
            last_updated_at = NOW()
        WHERE guild_id = $1 AND yt_channel_id = $2
        "#,
    )
    .bind(guild_id)
    .bind(yt_channel_id)
    .bind(marker.video_id)
    .bind(marker.status)
    .bind(marker.title_preview)
    .execute(pool)
    .await?;

    Ok(())
}
