use crate::entities::User;
use crate::errors::DomainError;
use crate::repositories::search::{PageRequest, PagedResult, UserSearch};
use async_trait::async_trait;

/// Repository trait - defines what we need from persistence layer
/// This is a PORT in hexagonal architecture
///
/// A missing record is `Ok(None)`, never an error. Writes made through
/// [`UserRepository::add`] are only guaranteed to be visible to other
/// readers once [`UserRepository::commit`] has returned.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: i32) -> Result<Option<User>, DomainError>;

    async fn get_all(&self) -> Result<Vec<User>, DomainError>;

    /// Stores an unpersisted user and returns it with its new identifier.
    async fn add(&self, user: User) -> Result<User, DomainError>;

    /// Flushes pending writes. A no-op for backends that write through.
    async fn commit(&self) -> Result<(), DomainError>;

    /// Matching users ordered by level, highest first.
    async fn search(&self, criteria: &UserSearch) -> Result<Vec<User>, DomainError>;

    /// One page of [`UserRepository::search`] plus the total match count.
    ///
    /// The default slices the full result; backends that can push paging
    /// into the query should override it.
    async fn search_page(
        &self,
        criteria: &UserSearch,
        page: PageRequest,
    ) -> Result<PagedResult<User>, DomainError> {
        let found = self.search(criteria).await?;
        let total = found.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let items = found
            .into_iter()
            .skip(offset)
            .take(page.page_size as usize)
            .collect();

        Ok(PagedResult::new(items, total, page))
    }
}
