/// A page-based window over a listing.
///
/// Pages are 1-based. A missing, zero or negative page or limit falls
/// back to the defaults, and the limit is capped at
/// [`Pagination::MAX_LIMIT`] so a single request cannot drag an
/// unbounded slice of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u64 = 10;
    pub const MAX_LIMIT: u64 = 50;

    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(page) if page > 0 => page as u64,
            _ => 1,
        };

        let limit = match limit {
            Some(limit) if limit > 0 => (limit as u64).min(Self::MAX_LIMIT),
            _ => Self::DEFAULT_LIMIT,
        };

        Self { page, limit }
    }

    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Postgres offsets are `i64`; a page count past that range is
    /// clamped instead of overflowing or failing the request.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(i64::MAX as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn falls_back_to_defaults() {
        for pagination in [
            Pagination::new(None, None),
            Pagination::new(Some(0), Some(0)),
            Pagination::new(Some(-1), Some(-20)),
            Pagination::default(),
        ] {
            assert_eq!(pagination.page(), 1);
            assert_eq!(pagination.limit(), Pagination::DEFAULT_LIMIT);
            assert_eq!(pagination.offset(), 0);
        }
    }

    #[test]
    fn caps_oversized_limits() {
        let pagination = Pagination::new(Some(2), Some(10_000));
        assert_eq!(pagination.limit(), Pagination::MAX_LIMIT);
        assert_eq!(pagination.offset(), Pagination::MAX_LIMIT);
    }

    #[test]
    fn offsets_are_one_based() {
        let pagination = Pagination::new(Some(3), Some(10));
        assert_eq!(pagination.offset(), 20);
    }

    #[test]
    fn absurd_pages_clamp_instead_of_overflowing() {
        let pagination = Pagination::new(Some(i64::MAX), Some(50));
        assert_eq!(pagination.offset(), i64::MAX as u64);

        let pagination = Pagination::new(Some(i64::MAX), Some(2));
        assert!(pagination.offset() <= i64::MAX as u64);
    }
}
