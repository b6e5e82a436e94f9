use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info};

/// Upper bound on pooled connections; handlers and background loops share it
const MAX_CONNECTIONS: u32 = 10;

/// Embedded schema, applied in order on every start
const MIGRATIONS: &[(&str, &str)] = &[
    ("001_users", include_str!("../../migrations/001_users.sql")),
    ("002_level_rewards", include_str!("../../migrations/002_level_rewards.sql")),
    ("003_auto_reset", include_str!("../../migrations/003_auto_reset.sql")),
    ("004_restrictions", include_str!("../../migrations/004_restrictions.sql")),
    ("005_time_channels", include_str!("../../migrations/005_time_channels.sql")),
    (
        "006_youtube_notifications",
        include_str!("../../migrations/006_youtube_notifications.sql"),
    ),
    ("007_banned_guilds", include_str!("../../migrations/007_banned_guilds.sql")),
];

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await?;

    info!("Database connection established");

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    info!("Running {} database migrations...", MIGRATIONS.len());

    for (name, migration) in MIGRATIONS {
        debug!("Applying migration {}", name);

        for statement in split_statements(migration) {
            // Objects from a previous run are fine
            if let Err(e) = sqlx::query(statement).execute(pool).await {
                let err_str = e.to_string();
                if !err_str.contains("already exists") && !err_str.contains("duplicate key") {
                    return Err(e);
                }
            }
        }
    }

    info!("Migrations completed successfully");
    Ok(())
}

/// Split a migration file into executable statements, dropping comment-only chunks
fn split_statements(migration: &str) -> impl Iterator<Item = &str> {
    migration.split(';').map(str::trim).filter(|statement| {
        statement
            .lines()
            .any(|line| !line.trim().is_empty() && !line.trim_start().starts_with("--"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_statements_skips_comments() {
        let sql = "-- header\nCREATE TABLE a (id INT);\n-- trailing comment\n";
        let statements: Vec<_> = split_statements(sql).collect();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].contains("CREATE TABLE a"));
    }

    #[test]
    fn test_embedded_migrations_are_not_empty() {
        for (name, sql) in MIGRATIONS {
            assert!(split_statements(sql).count() > 0, "{} has no statements", name);
        }
    }
}
