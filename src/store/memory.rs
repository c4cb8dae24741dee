//! In-memory query store

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::{PersistedQuery, QueryId, QueryStore};
use crate::planner::QueryPlan;

/// Process-local store; records are lost on restart
#[derive(Debug, Default)]
pub struct MemoryQueryStore {
    queries: RwLock<HashMap<QueryId, PersistedQuery>>,
}

impl MemoryQueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.queries.read().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueryStore for MemoryQueryStore {
    fn create(&self, plan: &QueryPlan, raw_request: Value) -> StoreResult<PersistedQuery> {
        let record = PersistedQuery::from_plan(plan, raw_request);
        self.queries
            .write()
            .map_err(|_| StoreError::Unavailable("query store lock poisoned".into()))?
            .insert(record.id, record.clone());
        Ok(record)
    }

    fn get(&self, id: &QueryId) -> StoreResult<Option<PersistedQuery>> {
        let queries = self
            .queries
            .read()
            .map_err(|_| StoreError::Unavailable("query store lock poisoned".into()))?;
        Ok(queries.get(id).cloned())
    }
}
