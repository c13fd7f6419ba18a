use std::sync::Arc;
use std::{env, net::SocketAddr};

use anyhow::Result;
use axum::{routing::get, Router};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;

mod engine;
mod models;
mod routes;
mod store;

use engine::{CycleEngine, EngineConfig};
use store::memory::MemoryStore;
use store::postgres::PostgresStore;
use store::{PeriodStore, SettingsStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    // Postgres when configured, otherwise an in-process store so the
    // service still works without a backend (nothing survives restart).
    let (records, settings): (Arc<dyn PeriodStore>, Arc<dyn SettingsStore>) =
        match env::var("DATABASE_URL") {
            Ok(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect(&database_url)
                    .await?;
                sqlx::migrate!("./migrations").run(&pool).await?;
                let store = Arc::new(PostgresStore::new(pool));
                tracing::info!("using postgres store");
                (store.clone(), store)
            }
            Err(_) => {
                tracing::warn!("DATABASE_URL not set, falling back to in-memory store");
                let store = Arc::new(MemoryStore::new());
                (store.clone(), store)
            }
        };

    let engine = CycleEngine::new(records, settings, EngineConfig::default());

    let app = Router::new()
        .merge(routes::period::routes(engine.clone()))
        .merge(routes::cycle::routes(engine.clone()))
        .merge(routes::cycle_stats::routes(engine.clone()))
        .merge(routes::symptoms::routes(engine))
        .route("/health", get(|| async { "✅ Backend up" }));

    let port: u16 = env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3050);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🩸 Server running at {}", addr);

    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
