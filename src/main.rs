use std::{sync::Arc, time::Duration};

use redis::Client as RedisClient;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lunch_rating_api::{
    build_router,
    config::{Config, StoreBackend},
    db,
    services::{
        metrics,
        ratings::PgRatingStore,
        sessions,
        store::{MemoryRatingStore, RatingStore},
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let store: Arc<dyn RatingStore> = match (config.store, config.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(database_url)) => {
            let pool = db::create_pool(database_url, config.database_max_connections).await?;
            db::run_migrations(&pool).await?;
            info!("Database connected and migrations applied");
            Arc::new(PgRatingStore::new(pool))
        }
        (StoreBackend::Postgres, None) => anyhow::bail!("Missing required env var: DATABASE_URL"),
        (StoreBackend::Memory, _) => {
            info!("Using in-memory rating store — ratings are lost on restart");
            Arc::new(MemoryRatingStore::new())
        }
    };

    let mut state = AppState::new(store.clone(), config.clone());

    if let Some(redis_url) = config.redis_url.as_deref() {
        let redis_client = RedisClient::open(redis_url)?;
        let redis_conn = redis_client.get_multiplexed_async_connection().await?;
        state = state.with_redis(redis_conn);
        info!("Redis connected — submission rate limiting enabled");
    } else {
        info!("REDIS_URL not set — submission rate limiting disabled");
    }

    metrics::start(store);
    sessions::start_sweeper(state.sessions.clone(), Duration::from_secs(config.session_idle_secs));

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Lunch rating API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
