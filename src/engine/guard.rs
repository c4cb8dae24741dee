//! Row-count guard
//!
//! Measures how many rows a candidate returns before anything is persisted.
//! One gated round-trip per check. The ceiling is inclusive: a count equal
//! to the ceiling passes.
//!
//! The count statement itself is not bounded; on a huge unfiltered table it
//! can be as expensive as the query it protects.

use crate::backend::AnalyticsBackend;
use crate::gate::ConnectionGate;

use super::errors::{EngineError, EngineResult};

/// Column the count wrapper selects into
pub const COUNT_COLUMN: &str = "count_rows";

const COUNT_PREFIX: &str = "select count(*) as count_rows from (";
const COUNT_SUFFIX: &str = ") as q";

/// Wraps `sql` in a counting sub-query
pub fn count_query(sql: &str) -> String {
    format!("{}{}{}", COUNT_PREFIX, sql, COUNT_SUFFIX)
}

/// Recovers the inner statement from a [`count_query`] wrapper
pub fn unwrap_count_query(count_sql: &str) -> Option<&str> {
    count_sql
        .strip_prefix(COUNT_PREFIX)
        .and_then(|rest| rest.strip_suffix(COUNT_SUFFIX))
}

/// Outcome of one row-count check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCountCheck {
    pub row_count: u64,
    pub within_limit: bool,
}

/// Checks candidate row counts against a ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCountGuard {
    max_rows: u64,
}

impl RowCountGuard {
    pub fn new(max_rows: u64) -> Self {
        Self { max_rows }
    }

    pub fn max_rows(&self) -> u64 {
        self.max_rows
    }

    /// Counts the rows `sql` returns, holding a gate permit for the round-trip.
    ///
    /// Backend failures come back as `DataSource`; the permit is released
    /// either way.
    pub async fn check(
        &self,
        gate: &ConnectionGate,
        backend: &dyn AnalyticsBackend,
        sql: &str,
    ) -> EngineResult<RowCountCheck> {
        let count_sql = count_query(sql);
        let row_count = gate
            .guarded(backend.count_rows(&count_sql))
            .await?
            .map_err(|e| EngineError::data_source(gate.source_name(), e))?;

        Ok(RowCountCheck {
            row_count,
            within_limit: row_count <= self.max_rows,
        })
    }
}
