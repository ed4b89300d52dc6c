//! Page-based slicing for list endpoints

use serde::{Deserialize, Serialize};

/// Fixed number of items per page
pub const PAGE_SIZE: u32 = 10;

/// A 1-indexed page of `PAGE_SIZE` items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
}

impl Page {
    /// Page numbers below 1 are clamped to 1.
    pub fn new(number: u32) -> Self {
        Self {
            number: number.max(1),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(PAGE_SIZE)
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> u32 {
        PAGE_SIZE
    }

    /// Slice an already-ordered collection.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        if start >= items.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE as usize).min(items.len());
        &items[start..end]
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1)
    }
}

/// One page of results plus the total across all pages
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
}

impl<T> Paginated<T> {
    /// A page after the first that came back empty.
    pub fn is_past_end(&self) -> bool {
        self.items.is_empty() && self.page > 1
    }
}

/// `?page=N` query parameter.
///
/// Kept as a string so a non-numeric value falls back to page 1 instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        let number = params
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(1);
        Self::new(number)
    }
}
