use std::sync::Arc;

use task_tracker::auth::TokenIssuer;
use task_tracker::http_api::{self, AppState};
use task_tracker::{SqliteTrackerStore, TrackerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = TrackerConfig::from_env()?;
    info!(database = %config.database_path.display(), "opening store");
    let store = SqliteTrackerStore::new(&config.database_path)?;
    let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl_hours)?;

    let state = AppState::new(Arc::new(store), tokens);
    http_api::serve(config.http_addr, state).await?;
    Ok(())
}
