pub mod dto;
pub mod services;

pub use dto::UserView;
pub use services::UserAppService;

use domain::{DomainError, UserRepository};
use infrastructure::{Database, InMemoryUserRepository, SqliteUserRepository};
use std::sync::Arc;
use tracing::info;

/// Where users are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    InMemory,
    Sqlite { database_path: String },
}

/// Demo rows inserted by [`UserApp::seed_demo_users`].
const DEMO_USERS: [(&str, i32); 2] = [("Alice", 3), ("Arujoy", 5)];

/// User Application - wires a storage backend into the use cases
pub struct UserApp {
    pub user_service: UserAppService,
}

impl UserApp {
    pub fn new(storage: Storage) -> Result<Self, DomainError> {
        // Infrastructure layer - pick the repository implementation
        let user_repository: Arc<dyn UserRepository> = match &storage {
            Storage::InMemory => Arc::new(InMemoryUserRepository::new()),
            Storage::Sqlite { database_path } => {
                let database = Database::new(database_path)?;
                Arc::new(SqliteUserRepository::new(database.get_pool().clone()))
            }
        };
        info!(?storage, "User storage initialised");

        Ok(Self::with_repository(user_repository))
    }

    pub fn with_repository(user_repository: Arc<dyn UserRepository>) -> Self {
        Self {
            user_service: UserAppService::new(user_repository),
        }
    }

    /// Inserts a couple of demo users, but only into an empty store.
    pub async fn seed_demo_users(&self) -> Result<usize, DomainError> {
        if !self.user_service.list_all().await?.is_empty() {
            return Ok(0);
        }

        for (name, level) in DEMO_USERS {
            self.user_service.create(name, level).await?;
        }
        info!(count = DEMO_USERS.len(), "Seeded demo users");
        Ok(DEMO_USERS.len())
    }
}
