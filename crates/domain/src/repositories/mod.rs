pub mod search;
pub mod user_repository;

pub use search::{
    PageRequest, PagedResult, UserSearch, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use user_repository::UserRepository;
