use media_ratings_api::{api::AppState, config::Config, db, routes::create_router};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Connect and bootstrap the schema
    let pool = db::create_pool(&config.database_url).await?;
    db::init_schema(&pool).await?;

    let state = AppState::postgres(pool);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
