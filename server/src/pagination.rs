//! Page-number pagination shared by the users, subscriptions and recipes
//! list endpoints: `?page=N&limit=M` in, a `{count, next, previous,
//! results}` envelope with absolute page links out.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::constants::PAGE_SIZE;

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Clone, Copy, Deserialize, IntoParams)]
pub struct PageParams {
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
    /// Page size (default: 6, max: 100)
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    /// Total number of items across all pages
    pub count: i64,
    /// Absolute URL of the next page, if any
    pub next: Option<String>,
    /// Absolute URL of the previous page, if any
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wraps one page of results. `path` is the endpoint path used when
    /// building the next/previous links, e.g. `/api/recipes`.
    pub fn new(
        results: Vec<T>,
        count: i64,
        params: &PageParams,
        base_url: &str,
        path: &str,
    ) -> Self {
        let page = params.page();
        let limit = params.limit();
        let last_page = if count == 0 {
            1
        } else {
            (count as u64).div_ceil(limit as u64) as i64
        };

        let next = (page < last_page).then(|| page_link(base_url, path, page + 1, limit));
        let previous = (page > 1).then(|| page_link(base_url, path, page - 1, limit));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

fn page_link(base_url: &str, path: &str, page: i64, limit: i64) -> String {
    format!("{}{}?page={}&limit={}", base_url, path, page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:3000";

    fn params(page: i64, limit: i64) -> PageParams {
        PageParams {
            page: Some(page),
            limit: Some(limit),
        }
    }

    #[test]
    fn test_defaults() {
        let p = PageParams::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), PAGE_SIZE);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(params(1, 10_000).limit(), MAX_PAGE_SIZE);
        assert_eq!(params(1, 0).limit(), 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(params(3, 6).offset(), 12);
    }

    #[test]
    fn test_first_page_has_no_previous() {
        let env = Paginated::new(vec![1, 2], 13, &params(1, 6), BASE, "/api/recipes");
        assert_eq!(env.previous, None);
        assert_eq!(
            env.next.as_deref(),
            Some("http://localhost:3000/api/recipes?page=2&limit=6")
        );
    }

    #[test]
    fn test_middle_page_has_both_links() {
        let env = Paginated::new(vec![1], 13, &params(2, 6), BASE, "/api/recipes");
        assert!(env.previous.is_some());
        assert!(env.next.is_some());
    }

    #[test]
    fn test_last_page_has_no_next() {
        let env = Paginated::new(vec![1], 13, &params(3, 6), BASE, "/api/recipes");
        assert_eq!(env.next, None);
        assert_eq!(
            env.previous.as_deref(),
            Some("http://localhost:3000/api/recipes?page=2&limit=6")
        );
    }

    #[test]
    fn test_empty_result_set() {
        let env = Paginated::<i32>::new(vec![], 0, &params(1, 6), BASE, "/api/users");
        assert_eq!(env.count, 0);
        assert_eq!(env.next, None);
        assert_eq!(env.previous, None);
    }
}
