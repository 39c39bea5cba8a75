use anyhow::Context;
use tracing_subscriber::EnvFilter;

use apartments_api::config::AppConfig;
use apartments_api::database;
use apartments_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("apartments_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();

    let pool = database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    database::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    database::seed_admin(&pool, &config)
        .await
        .context("failed to seed admin account")?;

    let port = config.server.port;
    let state = AppState::new(config, pool);
    let app = apartments_api::app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("apartments API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
