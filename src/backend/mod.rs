//! Analytical data source backends
//!
//! One implementation per warehouse engine, chosen once when a source is
//! registered. Backends only execute SQL; admission through the connection
//! gate is the engine's job, so a backend call always runs while a permit
//! is held.

mod memory;
mod postgres;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{EngineKind, SourceConfig};
use crate::planner::PageWindow;

pub use memory::MemoryBackend;
pub use postgres::PostgresBackend;

/// One result row: column name to value
pub type Row = Map<String, Value>;

/// Backend errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unexpected result shape: {0}")]
    Decode(String),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Future returned by backend operations
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = BackendResult<T>> + Send + 'a>>;

/// Executes SQL against one warehouse. Each call is a single round-trip.
pub trait AnalyticsBackend: Send + Sync {
    /// Engine this backend talks to
    fn engine(&self) -> EngineKind;

    /// Runs a counting statement and returns its single count value
    fn count_rows<'a>(&'a self, count_sql: &'a str) -> BackendFuture<'a, u64>;

    /// Runs `sql` restricted to one page window
    fn select_page<'a>(&'a self, sql: &'a str, window: PageWindow) -> BackendFuture<'a, Vec<Row>>;

    /// Runs a distinct-value lookup for a filter picker, returning at most
    /// `limit` rows
    fn select_dimension<'a>(&'a self, sql: &'a str, limit: u64) -> BackendFuture<'a, Vec<Row>>;
}

/// Builds the backend for a configured source
pub fn connect(source: &SourceConfig) -> Arc<dyn AnalyticsBackend> {
    match source.engine {
        EngineKind::Postgres => Arc::new(PostgresBackend::new(source.url.clone())),
        EngineKind::Memory => Arc::new(MemoryBackend::new().with_tables(source.tables.clone())),
    }
}
