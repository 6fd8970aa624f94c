//! Paginated API responses

use serde::{Deserialize, Serialize};

/// Default page size used by listing endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One page of a server-side paginated collection (zero-based page numbers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in the current page
    pub content: Vec<T>,
    /// Total number of pages
    pub total_pages: u32,
    /// Total number of items across all pages
    pub total_elements: u64,
    /// Current page number (0-indexed)
    pub number: u32,
    /// Requested page size
    pub size: u32,
}

impl<T> Page<T> {
    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.number > 0
    }

    /// Check if the page is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
            total_elements: 0,
            number: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}
