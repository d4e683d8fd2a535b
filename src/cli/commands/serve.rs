use anyhow::Context;
use tracing::info;

use crate::config;
use crate::database::DatabaseManager;
use crate::handlers::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting CRUD API in {:?} mode", config.environment);
    if crate::is_development!() {
        info!("Pagination: default limit {}, max {:?}", config.pagination.default_limit, config.pagination.max_limit);
    }

    let store = DatabaseManager::open(config)
        .await
        .context("failed to open storage")?;
    let app = crate::routes::app(AppState::new(store));

    let port = port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
