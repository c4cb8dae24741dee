//! Pagination planning
//!
//! Page count is the ceiling of rows over page size. Zero rows means zero
//! pages. Pages are numbered from 0 and have no upper bound here: a page past
//! the end simply selects nothing.
//!
//! Offsets never exceed `i64::MAX`, the largest value a SQL `bigint` offset
//! accepts.

use std::num::NonZeroU64;

use super::errors::{PlannerError, PlannerResult};

/// Largest offset a warehouse `bigint` accepts
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Offset/limit window for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Appends the offset/limit suffix to a statement
    pub fn apply(&self, sql: &str) -> String {
        format!("{} \noffset {} limit {}", sql, self.offset, self.limit)
    }
}

/// Fixed-size page planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    items_per_page: NonZeroU64,
}

impl Paginator {
    /// Creates a paginator for the given page size
    pub fn new(items_per_page: NonZeroU64) -> Self {
        Self { items_per_page }
    }

    /// Page size
    pub fn items_per_page(&self) -> u64 {
        self.items_per_page.get()
    }

    /// Number of pages needed for `row_count` rows
    pub fn pages(&self, row_count: u64) -> u64 {
        row_count.div_ceil(self.items_per_page.get())
    }

    /// Offset/limit window for a 0-based page index
    pub fn window(&self, page: i64) -> PlannerResult<PageWindow> {
        let page = u64::try_from(page).map_err(|_| PlannerError::InvalidPage(page))?;
        let limit = self.items_per_page.get();

        Ok(PageWindow {
            offset: page.saturating_mul(limit).min(MAX_OFFSET),
            limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paginator(n: u64) -> Paginator {
        Paginator::new(NonZeroU64::new(n).unwrap())
    }

    #[test]
    fn test_pages_is_ceiling_division() {
        let p = paginator(100_000);
        assert_eq!(p.pages(250_000), 3);
        assert_eq!(p.pages(250_001), 3);
        assert_eq!(p.pages(300_000), 3);
        assert_eq!(p.pages(300_001), 4);
        assert_eq!(p.pages(1), 1);
    }

    #[test]
    fn test_zero_rows_is_zero_pages() {
        assert_eq!(paginator(100_000).pages(0), 0);
    }

    #[test]
    fn test_pages_against_float_ceiling() {
        for n in [1u64, 3, 7, 10, 100] {
            let p = paginator(n);
            for rows in 0..250u64 {
                let expected = (rows as f64 / n as f64).ceil() as u64;
                assert_eq!(p.pages(rows), expected, "rows={} n={}", rows, n);
            }
        }
    }

    #[test]
    fn test_window_for_page() {
        let p = paginator(100_000);
        assert_eq!(
            p.window(0).unwrap(),
            PageWindow {
                offset: 0,
                limit: 100_000
            }
        );
        assert_eq!(
            p.window(2).unwrap(),
            PageWindow {
                offset: 200_000,
                limit: 100_000
            }
        );
    }

    #[test]
    fn test_negative_page_rejected() {
        assert_eq!(
            paginator(10).window(-1).unwrap_err(),
            PlannerError::InvalidPage(-1)
        );
    }

    #[test]
    fn test_window_past_last_page_is_allowed() {
        let window = paginator(10).window(1_000).unwrap();
        assert_eq!(window.offset, 10_000);
    }

    #[test]
    fn test_huge_page_offset_stays_in_bigint_range() {
        let p = paginator(100_000);

        let window = p.window(i64::MAX).unwrap();
        assert_eq!(window.offset, i64::MAX as u64);
        assert_eq!(window.limit, 100_000);

        let window = p.window(100_000_000_000_000).unwrap();
        assert!(window.offset <= i64::MAX as u64);
        assert_eq!(
            window.apply("select 1"),
            format!("select 1 \noffset {} limit 100000", i64::MAX)
        );
    }

    #[test]
    fn test_apply_appends_suffix() {
        let window = PageWindow {
            offset: 20,
            limit: 10,
        };
        assert_eq!(
            window.apply("select a from t order by a"),
            "select a from t order by a \noffset 20 limit 10"
        );
    }
}
