//! Pagination types for listing endpoints.
//!
//! [`PaginationParams`] turns raw, possibly out-of-range page numbers into a bounded
//! request; [`Page`] is the response envelope returned to clients.

use serde::{Deserialize, Serialize};

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u64 = 200;
/// Page size used when the client doesn't ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// A single page of results.
///
/// `total` counts every matching item regardless of `page` and `page_size`.
///
/// # Example
///
/// ```ignore
/// use sitelayer_core::page::{Page, PaginationParams};
///
/// let params = PaginationParams::clamped(2, 10);
/// let page = Page::new(items, 35, &params);
///
/// assert_eq!(page.page, 2);
/// assert_eq!(page.total, 35);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The items contained in this page.
    pub items: Vec<T>,
    /// Total count of matching items across all pages.
    pub total: u64,
    /// The page number (1-indexed) these items belong to.
    pub page: u64,
    /// Page size used to cut this page.
    pub page_size: u64,
}

impl<T> Page<T> {
    /// Wraps a slice of results with the parameters that produced it.
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            page_size: params.page_size,
        }
    }

    /// Maps the items of this page, keeping the pagination metadata.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<Vec<U>, E>>()?,
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        })
    }
}

/// Bounded pagination parameters. Pages are 1-indexed.
///
/// Always construct through [`PaginationParams::clamped`] (or `Default`) so that
/// `page >= 1` and `1 <= page_size <= MAX_PAGE_SIZE` hold.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    /// The page number (1-indexed).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
}

impl PaginationParams {
    /// Clamps raw client values into a valid request.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let params = PaginationParams::clamped(0, 9999);
    /// assert_eq!(params, PaginationParams { page: 1, page_size: 200 });
    /// ```
    pub fn clamped(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1) as u64,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE as i64) as u64,
        }
    }

    /// Number of items to skip before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Maximum number of items on this page.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clamps_page_to_at_least_one() {
        assert_eq!(PaginationParams::clamped(0, 50).page, 1);
        assert_eq!(PaginationParams::clamped(-7, 50).page, 1);
        assert_eq!(PaginationParams::clamped(3, 50).page, 3);
    }

    #[test]
    fn clamps_page_size_into_bounds() {
        assert_eq!(PaginationParams::clamped(1, 9999).page_size, 200);
        assert_eq!(PaginationParams::clamped(1, 0).page_size, 1);
        assert_eq!(PaginationParams::clamped(1, -3).page_size, 1);
        assert_eq!(PaginationParams::clamped(1, 200).page_size, 200);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PaginationParams::clamped(1, 50).offset(), 0);
        assert_eq!(PaginationParams::clamped(3, 20).offset(), 40);
    }

    #[test]
    fn page_serializes_envelope_fields() {
        let page = Page::new(vec![1, 2], 7, &PaginationParams::clamped(2, 2));

        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({ "items": [1, 2], "total": 7, "page": 2, "page_size": 2 })
        );
    }
}
