//! tracknest - personal track library over an external music catalog

use anyhow::Result;
use tracing::{error, info};

use tracknest::config::Config;
use tracknest::db::init_database_pool;
use tracknest::services::catalog::CatalogClient;
use tracknest::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting tracknest v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load();

    let pool = match init_database_pool(&config.database_url).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };

    let catalog = match CatalogClient::from_env() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to build catalog client: {}", e);
            return Err(e.into());
        }
    };

    let port = config.port;
    let state = AppState::new(pool, catalog, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("tracknest listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
