use crate::entities::User;
use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filter for user searches. Every criterion is optional; absent ones match
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSearch {
    pub keyword: Option<String>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
}

impl UserSearch {
    /// A blank keyword is treated as no keyword at all.
    pub fn new(keyword: Option<String>, min_level: Option<i32>, max_level: Option<i32>) -> Self {
        Self {
            keyword: keyword.filter(|k| !k.trim().is_empty()),
            min_level,
            max_level,
        }
    }

    /// Keyword containment is case-insensitive.
    pub fn matches(&self, user: &User) -> bool {
        if let Some(keyword) = &self.keyword {
            if !user.name().to_lowercase().contains(&keyword.to_lowercase()) {
                return false;
            }
        }

        if let Some(min) = self.min_level {
            if user.level() < min {
                return false;
            }
        }

        if let Some(max) = self.max_level {
            if user.level() > max {
                return false;
            }
        }

        true
    }
}

/// 1-based page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        let total_pages = if request.page_size == 0 {
            0
        } else {
            total_count.div_ceil(u64::from(request.page_size))
        };

        Self {
            items,
            total_count,
            page: request.page,
            page_size: request.page_size,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
