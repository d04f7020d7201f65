//! Offset paging for catalog listings

use serde::{Deserialize, Serialize};

/// Largest page a listing will return
pub const MAX_PAGE_SIZE: u32 = 500;

const DEFAULT_PAGE_SIZE: u32 = 50;

/// A zero-based page of a listing.
///
/// `page_size` is clamped to `1..=MAX_PAGE_SIZE` on construction.
///
/// ```
/// use core_library::repositories::PageRequest;
///
/// let request = PageRequest::new(2, 20);
/// assert_eq!(request.offset(), 40);
/// assert_eq!(PageRequest::new(0, 0).page_size, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// The request for the page after this one
    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            page_size: self.page_size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results together with the size of the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Rows in the full listing
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let size = u64::from(request.page_size.max(1));
        let total_pages = u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX);

        Self {
            items,
            total,
            page: request.page,
            total_pages,
            page_size: request.page_size,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert the items, keeping the paging fields
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(PageRequest::new(0, 0).page_size, 1);
        assert_eq!(PageRequest::new(0, 10_000).page_size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::default().page_size, 50);
    }

    #[test]
    fn test_offset_does_not_overflow() {
        let request = PageRequest::new(u32::MAX, MAX_PAGE_SIZE);
        assert_eq!(request.offset(), u64::from(u32::MAX) * 500);
    }

    #[test]
    fn test_walk_pages_with_next() {
        let first = PageRequest::new(0, 10);
        let last = first.next().next();

        let page = Page::new(vec![(); 5], 25, last);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next());
        assert!(page.has_previous());

        let page = Page::new(vec![(); 10], 25, first);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_empty_listing() {
        let page: Page<u8> = Page::new(Vec::new(), 0, PageRequest::default());
        assert_eq!(page.total_pages, 0);
        assert!(page.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn test_map_keeps_paging_fields() {
        let page = Page::new(vec![1, 2, 3], 7, PageRequest::new(1, 3)).map(|n| n * 10);

        assert_eq!(page.items, vec![10, 20, 30]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 1);
    }
}
