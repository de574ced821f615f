use anyhow::Context;
use chipledger::config::{Config, SnapshotStoreKind};
use chipledger::{api, init_db, MemorySnapshotStore, Repository, SessionOrchestrator, SnapshotStore};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("configuration error")?;
    let port = config.port;

    let store: Arc<dyn SnapshotStore> = match config.snapshot_store {
        SnapshotStoreKind::Sqlite => {
            let path = config
                .database_path
                .as_deref()
                .context("DATABASE_PATH is required for the sqlite store")?;
            let pool = init_db(path)
                .await
                .with_context(|| format!("failed to initialize database at {}", path))?;
            Arc::new(Repository::new(pool))
        }
        SnapshotStoreKind::Memory => {
            tracing::warn!("using in-memory snapshot store; sessions are lost on restart");
            Arc::new(MemorySnapshotStore::new())
        }
    };

    let orchestrator = Arc::new(SessionOrchestrator::new(store, config.default_session));
    let app = api::create_router(api::AppState::new(orchestrator));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
