use crate::dto::UserView;
use domain::{
    is_letters_only, DomainError, PageRequest, PagedResult, User, UserRepository, UserSearch,
    MAX_LEVEL, MAX_PAGE_SIZE, MIN_LEVEL,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// User use cases.
///
/// Input is checked here before the repository is touched; repository
/// faults are passed through untouched.
pub struct UserAppService {
    user_repository: Arc<dyn UserRepository>,
}

impl UserAppService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn list_all(&self) -> Result<Vec<UserView>, DomainError> {
        info!("Listing all users");
        let users = self.user_repository.get_all().await?;
        debug!(count = users.len(), "Loaded users");
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<UserView>, DomainError> {
        info!(id, "Fetching user");
        let user = self.user_repository.get_by_id(id).await?;
        Ok(user.map(UserView::from))
    }

    pub async fn create(&self, name: impl Into<String>, level: i32) -> Result<UserView, DomainError> {
        let user = User::builder().name(name).level(level).build()?;

        let user = self.user_repository.add(user).await?;
        if !user.is_persisted() {
            return Err(DomainError::repository("user store did not assign an id"));
        }
        self.user_repository.commit().await?;

        info!(id = ?user.id(), name = user.name(), level = user.level(), "Created user");
        Ok(user.into())
    }

    pub async fn search(
        &self,
        keyword: Option<String>,
        min_level: Option<i32>,
        max_level: Option<i32>,
        page: PageRequest,
    ) -> Result<PagedResult<UserView>, DomainError> {
        let criteria = UserSearch::new(keyword, min_level, max_level);
        if let Err(e) = validate_search(&criteria, page) {
            warn!(error = %e, ?criteria, "Rejected user search");
            return Err(e);
        }

        info!(?criteria, page = page.page, page_size = page.page_size, "Searching users");
        let found = self.user_repository.search_page(&criteria, page).await?;
        debug!(total = found.total_count, returned = found.items.len(), "Search finished");
        Ok(found.map(UserView::from))
    }
}

fn validate_search(criteria: &UserSearch, page: PageRequest) -> Result<(), DomainError> {
    if let Some(keyword) = &criteria.keyword {
        if !is_letters_only(keyword) {
            return Err(DomainError::validation(
                "keyword may only contain letters; digits and special characters are not allowed",
            ));
        }
    }

    if let Some(min_level) = criteria.min_level {
        if min_level < MIN_LEVEL {
            return Err(DomainError::validation(format!(
                "minLevel must be at least {MIN_LEVEL}"
            )));
        }
    }

    if let Some(max_level) = criteria.max_level {
        if max_level > MAX_LEVEL {
            return Err(DomainError::validation(format!(
                "maxLevel must be at most {MAX_LEVEL}"
            )));
        }
    }

    if let (Some(min_level), Some(max_level)) = (criteria.min_level, criteria.max_level) {
        if max_level < min_level {
            return Err(DomainError::validation(
                "maxLevel must be greater than or equal to minLevel",
            ));
        }
    }

    if page.page < 1 {
        return Err(DomainError::validation("page must be at least 1"));
    }

    if page.page_size < 1 || page.page_size > MAX_PAGE_SIZE {
        return Err(DomainError::validation(format!(
            "pageSize must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use infrastructure::InMemoryUserRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn seeded(users: &[(&str, i32)]) -> (Arc<InMemoryUserRepository>, UserAppService) {
        let users = users
            .iter()
            .map(|(name, level)| User::builder().name(*name).level(*level).build().unwrap())
            .collect();
        let repo = Arc::new(InMemoryUserRepository::with_users(users));
        let service = UserAppService::new(repo.clone());
        (repo, service)
    }

    /// Fails every call and counts how many reached storage.
    #[derive(Default)]
    struct BrokenRepository {
        calls: AtomicUsize,
    }

    impl BrokenRepository {
        fn fault(&self) -> DomainError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            DomainError::repository("database is unavailable")
        }
    }

    #[async_trait]
    impl UserRepository for BrokenRepository {
        async fn get_by_id(&self, _id: i32) -> Result<Option<User>, DomainError> {
            Err(self.fault())
        }

        async fn get_all(&self) -> Result<Vec<User>, DomainError> {
            Err(self.fault())
        }

        async fn add(&self, _user: User) -> Result<User, DomainError> {
            Err(self.fault())
        }

        async fn commit(&self) -> Result<(), DomainError> {
            Err(self.fault())
        }

        async fn search(&self, _criteria: &UserSearch) -> Result<Vec<User>, DomainError> {
            Err(self.fault())
        }
    }

    /// Accepts writes but never assigns an id.
    struct IdlessRepository;

    #[async_trait]
    impl UserRepository for IdlessRepository {
        async fn get_by_id(&self, _id: i32) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn get_all(&self) -> Result<Vec<User>, DomainError> {
            Ok(Vec::new())
        }

        async fn add(&self, user: User) -> Result<User, DomainError> {
            Ok(user)
        }

        async fn commit(&self) -> Result<(), DomainError> {
            panic!("commit must not run for a user without an id");
        }

        async fn search(&self, _criteria: &UserSearch) -> Result<Vec<User>, DomainError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_the_same_view() {
        let (_, service) = seeded(&[]);

        let created = service.create("Alice", 3).await.unwrap();
        assert_eq!(
            created,
            UserView {
                id: 1,
                name: "Alice".to_string(),
                level: 3,
            }
        );

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[tokio::test]
    async fn blank_name_is_a_validation_fault_and_persists_nothing() {
        let (_, service) = seeded(&[("Alice", 3)]);

        let err = service.create("", 5).await.unwrap_err();
        assert!(err.is_validation());

        let err = service.create("   ", 5).await.unwrap_err();
        assert!(err.is_validation());

        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_user_is_none() {
        let (_, service) = seeded(&[]);
        assert_eq!(service.get(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_all_projects_every_user() {
        let (_, service) = seeded(&[("Alice", 3), ("Arujoy", 5)]);

        let users = service.list_all().await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Arujoy"]);
        assert_eq!(users[1].id, 2);
    }

    #[tokio::test]
    async fn search_by_min_level_orders_by_level_descending() {
        let (_, service) = seeded(&[("Alice", 3), ("Bob", 5), ("Carol", 8)]);

        let found = service
            .search(None, Some(4), None, PageRequest::default())
            .await
            .unwrap();
        let names: Vec<&str> = found.items.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Carol", "Bob"]);
        assert_eq!(found.total_count, 2);
    }

    #[tokio::test]
    async fn min_level_four_over_alice_and_bob_returns_bob() {
        let (_, service) = seeded(&[("Alice", 3), ("Bob", 5)]);

        let found = service
            .search(None, Some(4), None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].name, "Bob");
    }

    #[tokio::test]
    async fn keyword_with_digits_is_rejected() {
        let (_, service) = seeded(&[("Alice", 3)]);

        let err = service
            .search(Some("abc123".into()), None, None, PageRequest::default())
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn keyword_match_is_case_insensitive() {
        let (_, service) = seeded(&[("Alice", 3), ("Bob", 5)]);

        let found = service
            .search(Some("aLiCe".into()), None, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].name, "Alice");
    }

    #[tokio::test]
    async fn blank_keyword_is_ignored() {
        let (_, service) = seeded(&[("Alice", 3), ("Bob", 5)]);

        let found = service
            .search(Some("  ".into()), None, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(found.total_count, 2);
    }

    #[tokio::test]
    async fn level_bounds_are_range_checked() {
        let (_, service) = seeded(&[]);
        let page = PageRequest::default();

        assert!(service.search(None, Some(0), None, page).await.unwrap_err().is_validation());
        assert!(service.search(None, None, Some(100), page).await.unwrap_err().is_validation());
        assert!(service.search(None, Some(1), Some(99), page).await.is_ok());
    }

    #[tokio::test]
    async fn inverted_level_range_is_rejected() {
        let (_, service) = seeded(&[("Alice", 3), ("Bob", 5)]);

        let err = service
            .search(None, Some(5), Some(3), PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("maxLevel must be greater than or equal to minLevel")
        );
    }

    #[tokio::test]
    async fn paging_parameters_are_checked() {
        let (_, service) = seeded(&[]);

        for page in [PageRequest::new(0, 10), PageRequest::new(1, 0), PageRequest::new(1, 101)] {
            let err = service.search(None, None, None, page).await.unwrap_err();
            assert!(err.is_validation(), "{page:?}");
        }
    }

    #[tokio::test]
    async fn search_pages_through_results() {
        let (_, service) = seeded(&[("Aa", 1), ("Bb", 2), ("Cc", 3)]);

        let second = service
            .search(None, None, None, PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].name, "Aa");
        assert_eq!(second.total_count, 3);
        assert_eq!(second.total_pages, 2);
    }

    #[tokio::test]
    async fn validation_runs_before_storage() {
        let repo = Arc::new(BrokenRepository::default());
        let service = UserAppService::new(repo.clone());

        assert!(service.create(" ", 1).await.unwrap_err().is_validation());
        assert!(service
            .search(Some("a1".into()), None, None, PageRequest::default())
            .await
            .unwrap_err()
            .is_validation());

        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn storage_faults_propagate_unchanged() {
        let service = UserAppService::new(Arc::new(BrokenRepository::default()));
        let expected = DomainError::repository("database is unavailable");

        assert_eq!(service.list_all().await.unwrap_err(), expected);
        assert_eq!(service.get(1).await.unwrap_err(), expected);
        assert_eq!(service.create("Alice", 3).await.unwrap_err(), expected);
        assert_eq!(
            service
                .search(None, None, None, PageRequest::default())
                .await
                .unwrap_err(),
            expected
        );
    }

    #[tokio::test]
    async fn create_commits_through_the_sqlite_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        let database = infrastructure::Database::new(path.to_str().unwrap()).unwrap();
        let repo = Arc::new(infrastructure::SqliteUserRepository::new(
            database.get_pool().clone(),
        ));
        let service = UserAppService::new(repo);

        let created = service.create("Alice", 3).await.unwrap();
        assert_eq!(service.get(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn create_refuses_a_user_the_store_left_without_id() {
        let service = UserAppService::new(Arc::new(IdlessRepository));

        let err = service.create("Alice", 3).await.unwrap_err();
        assert_eq!(err, DomainError::repository("user store did not assign an id"));
    }

    async fn assert_concurrent_creates(repo: Arc<dyn UserRepository>) {
        let service = Arc::new(UserAppService::new(repo));

        let creates: Vec<_> = (0..12)
            .map(|i| {
                let service = Arc::clone(&service);
                let name: String = ["Al", "Bo", "Cy"][i % 3].repeat(i / 3 + 1);
                tokio::spawn(async move { service.create(name, 3).await })
            })
            .collect();

        let mut ids = std::collections::HashSet::new();
        for create in creates {
            let view = create.await.unwrap().unwrap();
            assert!(ids.insert(view.id), "duplicate id {}", view.id);
            assert_eq!(service.get(view.id).await.unwrap(), Some(view));
        }
        assert_eq!(service.list_all().await.unwrap().len(), 12);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_in_memory_are_all_stored() {
        assert_concurrent_creates(Arc::new(InMemoryUserRepository::new())).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_on_sqlite_are_all_committed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        let database = infrastructure::Database::new(path.to_str().unwrap()).unwrap();
        let repo = infrastructure::SqliteUserRepository::new(database.get_pool().clone());

        assert_concurrent_creates(Arc::new(repo)).await;
    }
}
