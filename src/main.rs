use anyhow::Result;
use std::sync::Arc;
use storefront::cache::SystemClock;
use storefront::store::InMemoryStore;
use storefront::{AppConfig, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=debug,tower_http=info".into()),
        )
        .init();

    let config = match std::env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_yaml_file(&path)?,
        Err(_) => AppConfig::from_env(),
    };
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(store, &config, Arc::new(SystemClock));

    state.catalog.seed_default_categories().await?;

    let app = storefront::router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "storefront API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
