/// Page/limit handling for list endpoints
///
/// Out-of-range values are clamped silently rather than rejected:
///
/// - `page`: at least 1, default 1
/// - `limit`: 1 to 100, default 20; `0` (or anything unparseable) means the default
///
/// # Example
///
/// ```
/// use kanban_shared::pagination::{Page, PaginationMeta};
///
/// let page = Page::new(Some(2), Some(10));
/// assert_eq!(page.offset(), 10);
///
/// let meta = PaginationMeta::new(page, 25);
/// assert_eq!(meta.total_pages, 3);
/// ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Raw `page`/`limit` query parameters
///
/// Kept as strings so a malformed value falls back to the default instead of
/// failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    pub fn page(&self) -> Page {
        Page::new(parse(&self.page), parse(&self.limit))
    }
}

fn parse(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

/// A clamped page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p,
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(l) if l > MAX_LIMIT => MAX_LIMIT,
            Some(l) if l >= 1 => l,
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    /// Rows to skip
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Slices an already ordered, complete result set
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(0);
        items.iter().skip(start).take(limit).cloned().collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// The `pagination` object of a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(page: Page, total: i64) -> Self {
        let total_pages = if page.limit <= 0 {
            0
        } else {
            (total + page.limit - 1) / page.limit
        };
        Self {
            page: page.page,
            limit: page.limit,
            total,
            total_pages,
        }
    }
}

/// One page of results plus the total count across all pages
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: Page, total: i64) -> Self {
        Self {
            items,
            meta: PaginationMeta::new(page, total),
        }
    }
}
