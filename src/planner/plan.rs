//! Validated query plan

use serde::{Deserialize, Serialize};

/// A selected candidate that passed the row-count check, with its page layout.
///
/// Immutable once built. Only the engine builds these, and only after the
/// row count was measured within the ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Source the query runs against
    pub source_name: String,
    /// Winning SQL text
    pub sql: String,
    /// Measured row count
    pub row_count: u64,
    /// Number of pages at `items_per_page`
    pub pages: u64,
    /// Fixed page size
    pub items_per_page: u64,
}
