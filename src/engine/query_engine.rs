//! Query execution engine
//!
//! Three independent protocols, all gated per source:
//!
//! - Plan & persist: select → count check → paginate → store. Linear, no
//!   retries. Nothing is stored unless every earlier step succeeded.
//! - Paged fetch: look up a stored plan and run one page of it. Idempotent;
//!   concurrent fetches are bounded only by the gate.
//! - Dimension lookup: select → run once → return rows. Nothing stored.
//!
//! Only the selected candidate is ever sent to the warehouse, so a plan
//! costs exactly one counting round-trip.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::backend::Row;
use crate::observability::{EngineMetrics, Event, Logger};
use crate::planner::{select_best, CandidateSet, Paginator, QueryPlan};
use crate::store::{QueryId, QueryStore};

use super::errors::{EngineError, EngineResult};
use super::registry::{SourceHandle, SourceRegistry};

/// What callers get back from a successful plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedQueryHandle {
    pub id: QueryId,
    pub pages: u64,
    pub items_per_page: u64,
    pub row_count: u64,
}

/// Orchestrates selection, validation, persistence and gated execution
#[derive(Debug)]
pub struct QueryEngine {
    registry: SourceRegistry,
    store: Arc<dyn QueryStore>,
    metrics: EngineMetrics,
}

impl QueryEngine {
    pub fn new(registry: SourceRegistry, store: Arc<dyn QueryStore>) -> Self {
        Self {
            registry,
            store,
            metrics: EngineMetrics::new(),
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Selects, counts and paginates without persisting.
    ///
    /// Fails with `RowLimitExceeded` when the selected candidate returns more
    /// than the source's ceiling.
    pub async fn plan(
        &self,
        source_name: &str,
        candidates: &CandidateSet,
    ) -> EngineResult<QueryPlan> {
        let source = self.registry.get(source_name)?;

        let candidate =
            select_best(candidates).map_err(|e| EngineError::from_planner(source.name(), e))?;
        let unmatched = candidate.unmatched_field_count.to_string();
        Logger::trace(
            Event::QuerySelected,
            &[
                ("candidates", &candidates.len().to_string()),
                ("source", source.name()),
                ("table", &candidate.table),
                ("unmatched_fields", &unmatched),
            ],
        );

        let check = source
            .guard()
            .check(source.gate(), source.backend(), &candidate.sql)
            .await
            .inspect_err(|e| self.record_failure(&source, e))?;

        let row_count = check.row_count.to_string();
        Logger::info(
            Event::RowCountChecked,
            &[("row_count", &row_count), ("source", source.name())],
        );

        if !check.within_limit {
            self.metrics.increment_plans_rejected();
            let max_rows = source.guard().max_rows();
            Logger::warn(
                Event::QueryRejected,
                &[
                    ("max_rows", &max_rows.to_string()),
                    ("row_count", &row_count),
                    ("source", source.name()),
                ],
            );
            return Err(EngineError::RowLimitExceeded {
                source_name: source.name().to_string(),
                row_count: check.row_count,
                max_rows,
            });
        }

        let paginator = source.paginator();
        Ok(QueryPlan {
            source_name: source.name().to_string(),
            sql: candidate.sql.clone(),
            row_count: check.row_count,
            pages: paginator.pages(check.row_count),
            items_per_page: paginator.items_per_page(),
        })
    }

    /// Plans the request and stores the winning query for paged retrieval
    pub async fn plan_and_persist(
        &self,
        source_name: &str,
        candidates: &CandidateSet,
        raw_request: Value,
    ) -> EngineResult<PersistedQueryHandle> {
        let plan = self.plan(source_name, candidates).await?;

        let record = self.store.create(&plan, raw_request).map_err(|e| {
            self.metrics.increment_persistence_failures();
            Logger::error(
                Event::PersistenceFailed,
                &[("error", &e.to_string()), ("source", &plan.source_name)],
            );
            EngineError::from(e)
        })?;

        self.metrics.increment_plans_accepted();
        Logger::info(
            Event::QueryPersisted,
            &[
                ("id", &record.id.to_string()),
                ("pages", &record.pages.to_string()),
                ("source", &record.source_name),
            ],
        );

        Ok(PersistedQueryHandle {
            id: record.id,
            pages: record.pages,
            items_per_page: record.items_per_page,
            row_count: plan.row_count,
        })
    }

    /// Runs one page of a persisted query.
    ///
    /// Pages past the last one return no rows.
    pub async fn fetch_page(&self, id: &QueryId, page: i64) -> EngineResult<Vec<Row>> {
        let record = self
            .store
            .get(id)?
            .ok_or(EngineError::UnknownQuery(*id))?;
        let source = self.registry.get(&record.source_name)?;

        // The stored page size wins over the source's current one.
        let items_per_page = std::num::NonZeroU64::new(record.items_per_page).ok_or_else(|| {
            crate::store::StoreError::Serialization(format!(
                "query '{}' has a zero page size",
                record.id
            ))
        })?;
        let window = Paginator::new(items_per_page)
            .window(page)
            .map_err(|e| EngineError::from_planner(source.name(), e))?;

        let rows = source
            .gate()
            .guarded(source.backend().select_page(&record.sql, window))
            .await?
            .map_err(|e| EngineError::data_source(source.name(), e))
            .inspect_err(|e| self.record_failure(&source, e))?;

        self.metrics.increment_pages_fetched();
        Logger::info(
            Event::PageFetched,
            &[
                ("id", &record.id.to_string()),
                ("page", &page.to_string()),
                ("rows", &rows.len().to_string()),
                ("source", source.name()),
            ],
        );

        Ok(rows)
    }

    /// Runs the best filter candidate once and returns its rows.
    ///
    /// At most `max_filter_values` rows are returned.
    pub async fn fetch_dimension(
        &self,
        source_name: &str,
        candidates: &CandidateSet,
    ) -> EngineResult<Vec<Row>> {
        let source = self.registry.get(source_name)?;
        let candidate =
            select_best(candidates).map_err(|e| EngineError::from_planner(source.name(), e))?;

        // One row past the cap is enough to tell a truncated lookup apart.
        let cap = source.config().max_filter_values;
        let fetch_limit = u64::try_from(cap).unwrap_or(u64::MAX).saturating_add(1);

        let mut rows = source
            .gate()
            .guarded(source.backend().select_dimension(&candidate.sql, fetch_limit))
            .await?
            .map_err(|e| EngineError::data_source(source.name(), e))
            .inspect_err(|e| self.record_failure(&source, e))?;

        if rows.len() > cap {
            Logger::warn(
                Event::DimensionTruncated,
                &[
                    ("max_filter_values", &cap.to_string()),
                    ("rows", &rows.len().to_string()),
                    ("source", source.name()),
                ],
            );
            rows.truncate(cap);
        }

        self.metrics.increment_dimension_lookups();
        Logger::info(
            Event::DimensionFetched,
            &[
                ("rows", &rows.len().to_string()),
                ("source", source.name()),
                ("table", &candidate.table),
            ],
        );

        Ok(rows)
    }

    fn record_failure(&self, source: &SourceHandle, err: &EngineError) {
        if let EngineError::DataSource { .. } = err {
            self.metrics.increment_data_source_failures();
            Logger::error(
                Event::DataSourceFailed,
                &[("error", &err.to_string()), ("source", source.name())],
            );
        }
    }
}
