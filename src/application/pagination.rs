//! Offset pagination for the list endpoints.
//!
//! The public contract is `page`/`limit` query parameters. Values are
//! sanitized at the HTTP boundary before a cache key is derived, so every
//! effective page maps to exactly one cache entry.

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 3;
pub const MAX_LIMIT: u32 = 100;

/// A sanitized page request: `page >= 1`, `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request from raw query values, clamping out-of-range input.
    /// Accepts signed values so negative query parameters clamp instead of
    /// failing deserialization.
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page
            .unwrap_or(i64::from(DEFAULT_PAGE))
            .clamp(1, i64::from(u32::MAX)) as u32;
        let limit = limit
            .unwrap_or(i64::from(DEFAULT_LIMIT))
            .clamp(1, i64::from(MAX_LIMIT)) as u32;
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Row offset for the store query.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::from_query(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_three() {
        let page = PageRequest::default();
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 3);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn clamps_zero_page_and_limit() {
        let page = PageRequest::from_query(Some(0), Some(0));
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 1);
    }

    #[test]
    fn clamps_negative_page_and_limit() {
        let page = PageRequest::from_query(Some(-1), Some(-50));
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 1);
    }

    #[test]
    fn clamps_oversized_limit() {
        let page = PageRequest::from_query(Some(2), Some(5000));
        assert_eq!(page.limit(), MAX_LIMIT);
        assert_eq!(page.offset(), 100);
    }

    #[test]
    fn offset_uses_effective_limit() {
        let page = PageRequest::from_query(Some(4), Some(10));
        assert_eq!(page.offset(), 30);
    }
}
