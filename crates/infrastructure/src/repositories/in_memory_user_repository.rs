use async_trait::async_trait;
use domain::{DomainError, User, UserRepository, UserSearch};
use tokio::sync::RwLock;

/// Process-local user store. A user's id is its 1-based position in the
/// list, and writes are visible immediately, so `commit` has nothing to do.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, assigning ids in order.
    pub fn with_users(users: Vec<User>) -> Self {
        let users = users
            .into_iter()
            .enumerate()
            .map(|(index, user)| user.persisted(position_to_id(index)))
            .collect();

        Self {
            users: RwLock::new(users),
        }
    }
}

fn position_to_id(index: usize) -> i32 {
    i32::try_from(index + 1).unwrap_or(i32::MAX)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        let user = usize::try_from(id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|index| users.get(index))
            .cloned();
        Ok(user)
    }

    async fn get_all(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.read().await.clone())
    }

    async fn add(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let id = i32::try_from(users.len() + 1)
            .map_err(|_| DomainError::repository("in-memory user store is full"))?;

        let user = user.persisted(id);
        users.push(user.clone());
        Ok(user)
    }

    async fn commit(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn search(&self, criteria: &UserSearch) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;
        let mut found: Vec<User> = users
            .iter()
            .filter(|user| criteria.matches(user))
            .cloned()
            .collect();

        // Stable, so equal levels stay in id order.
        found.sort_by(|a, b| b.level().cmp(&a.level()));
        Ok(found)
    }
}
