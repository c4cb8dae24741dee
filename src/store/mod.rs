//! # Persisted Query Store
//!
//! Durable records of accepted plans, addressed by an opaque id.
//! A record is written once when a plan is accepted and only read after that.

mod errors;
mod file;
mod memory;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::planner::QueryPlan;

pub use errors::{StoreError, StoreResult};
pub use file::FileQueryStore;
pub use memory::MemoryQueryStore;

/// Opaque persisted query identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(Uuid);

impl QueryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Stored winning query with its page layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedQuery {
    pub id: QueryId,
    /// Source the page fetches run against
    pub source_name: String,
    pub sql: String,
    pub pages: u64,
    pub items_per_page: u64,
    /// Request payload as the caller sent it
    pub raw_request: Value,
    pub created_at: DateTime<Utc>,
}

impl PersistedQuery {
    /// Builds a new record with a fresh id
    pub fn from_plan(plan: &QueryPlan, raw_request: Value) -> Self {
        Self {
            id: QueryId::new(),
            source_name: plan.source_name.clone(),
            sql: plan.sql.clone(),
            pages: plan.pages,
            items_per_page: plan.items_per_page,
            raw_request,
            created_at: Utc::now(),
        }
    }
}

/// Durable storage for persisted queries.
///
/// Implementations serialize concurrent writes themselves.
pub trait QueryStore: Send + Sync + fmt::Debug {
    /// Assigns an id to the plan and stores it
    fn create(&self, plan: &QueryPlan, raw_request: Value) -> StoreResult<PersistedQuery>;

    /// Looks up a record
    fn get(&self, id: &QueryId) -> StoreResult<Option<PersistedQuery>>;
}
