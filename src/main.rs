use application::{Storage, UserApp};
use config::{Config, StorageBackend};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "practice_api=info,api_server=debug,application=debug,infrastructure=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    info!("🚀 Starting User Practice API");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!(
        storage = %config.storage_backend,
        address = %config.api_address(),
        seed_demo_users = config.seed_demo_users,
        "Configuration loaded"
    );

    let storage = match config.storage_backend {
        StorageBackend::Memory => Storage::InMemory,
        StorageBackend::Sqlite => {
            info!(database_path = %config.database_path, "💾 Using SQLite database");
            Storage::Sqlite {
                database_path: config.database_path.clone(),
            }
        }
    };

    let user_app = UserApp::new(storage)?;
    if config.seed_demo_users {
        user_app.seed_demo_users().await?;
    }

    let listener = tokio::net::TcpListener::bind(config.api_address()).await?;
    api_server::serve(listener, Arc::new(user_app)).await?;

    info!("User Practice API stopped");
    Ok(())
}
