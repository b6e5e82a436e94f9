use supporter::{bot, config::Settings, db};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Used when RUST_LOG is unset: our own logs at info, dependencies quieter
const DEFAULT_LOG_FILTER: &str = "supporter=info,serenity=warn,poise=warn,sqlx=warn";

/// RUST_LOG if it says anything, otherwise the default directives
fn log_directives(env: Option<String>) -> String {
    env.filter(|directives| !directives.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// One line describing how the bot is about to run
fn settings_summary(settings: &Settings) -> String {
    let scope = match settings.guild_id {
        Some(guild_id) => format!("guild {}", guild_id),
        None => "global".to_string(),
    };
    format!(
        "commands: {}, owners: {}, text/image XP: {}/{} every {}s, voice: {} XP per {}s up to {}",
        scope,
        settings.owner_ids.len(),
        settings.message_xp,
        settings.image_xp,
        settings.xp_cooldown.as_secs(),
        settings.voice.rate,
        settings.voice.block_seconds,
        settings.voice.cap
    )
}

async fn start() -> Result<(), String> {
    let settings = Settings::from_env().map_err(|e| format!("Failed to load settings: {}", e))?;
    info!("{}", settings_summary(&settings));

    let pool = db::pool::create_pool(&settings.database_url)
        .await
        .map_err(|e| format!("Failed to create database pool: {}", e))?;

    db::pool::run_migrations(&pool)
        .await
        .map_err(|e| format!("Failed to run migrations: {}", e))?;
    info!("Database ready");

    bot::framework::run(settings, pool)
        .await
        .map_err(|e| format!("Bot error: {}", e))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let directives = log_directives(std::env::var("RUST_LOG").ok());
    tracing_subscriber::registry()
        .with(EnvFilter::new(directives))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Supporter Bot v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = start().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
