//! In-memory backend
//!
//! Tables are keyed by the exact SQL text that selects them. Counting
//! statements are understood by unwrapping the engine's count wrapper.
//! Latency, failures and concurrency are observable so callers can check
//! gate behaviour without a warehouse.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use super::{AnalyticsBackend, BackendError, BackendFuture, BackendResult, Row};
use crate::config::EngineKind;
use crate::engine::unwrap_count_query;
use crate::planner::PageWindow;

/// Backend over in-process tables
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    row_counts: RwLock<HashMap<String, u64>>,
    failures: RwLock<HashMap<String, BackendError>>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    round_trips: AtomicU64,
    rows_served: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every round-trip sleeps for `latency` before answering
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Seeds the backend with tables keyed by statement
    pub fn with_tables(self, tables: impl IntoIterator<Item = (String, Vec<Row>)>) -> Self {
        Self {
            tables: RwLock::new(tables.into_iter().collect()),
            ..self
        }
    }

    /// Registers the rows returned by `sql`
    pub fn insert_table(&self, sql: impl Into<String>, rows: Vec<Row>) -> BackendResult<()> {
        write(&self.tables)?.insert(sql.into(), rows);
        Ok(())
    }

    /// Makes counting `sql` report `count` regardless of stored rows
    pub fn set_row_count(&self, sql: impl Into<String>, count: u64) -> BackendResult<()> {
        write(&self.row_counts)?.insert(sql.into(), count);
        Ok(())
    }

    /// Makes every statement over `sql` fail with `error`
    pub fn fail_on(&self, sql: impl Into<String>, error: BackendError) -> BackendResult<()> {
        write(&self.failures)?.insert(sql.into(), error);
        Ok(())
    }

    /// Round-trips currently executing
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous round-trips observed
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Total round-trips started
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::SeqCst)
    }

    /// Total rows handed back to callers
    pub fn rows_served(&self) -> u64 {
        self.rows_served.load(Ordering::SeqCst)
    }

    async fn round_trip<T, F>(&self, answer: F) -> BackendResult<T>
    where
        F: FnOnce(&Self) -> BackendResult<T>,
    {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        answer(self)
    }

    fn check_failure(&self, sql: &str) -> BackendResult<()> {
        match read(&self.failures)?.get(sql) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn count(&self, count_sql: &str) -> BackendResult<u64> {
        let sql = unwrap_count_query(count_sql)
            .ok_or_else(|| {
                BackendError::Query(format!("not a counting statement: {}", count_sql))
            })?;
        self.check_failure(sql)?;

        if let Some(count) = read(&self.row_counts)?.get(sql) {
            return Ok(*count);
        }
        read(&self.tables)?
            .get(sql)
            .map(|rows| rows.len() as u64)
            .ok_or_else(|| unknown_relation(sql))
    }

    fn rows(&self, sql: &str, window: PageWindow) -> BackendResult<Vec<Row>> {
        self.check_failure(sql)?;

        let tables = read(&self.tables)?;
        let rows = tables.get(sql).ok_or_else(|| unknown_relation(sql))?;

        let served: Vec<Row> = rows
            .iter()
            .skip(usize::try_from(window.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(window.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        self.rows_served.fetch_add(served.len() as u64, Ordering::SeqCst);
        Ok(served)
    }
}

impl AnalyticsBackend for MemoryBackend {
    fn engine(&self) -> EngineKind {
        EngineKind::Memory
    }

    fn count_rows<'a>(&'a self, count_sql: &'a str) -> BackendFuture<'a, u64> {
        Box::pin(self.round_trip(move |this| this.count(count_sql)))
    }

    fn select_page<'a>(&'a self, sql: &'a str, window: PageWindow) -> BackendFuture<'a, Vec<Row>> {
        Box::pin(self.round_trip(move |this| this.rows(sql, window)))
    }

    fn select_dimension<'a>(&'a self, sql: &'a str, limit: u64) -> BackendFuture<'a, Vec<Row>> {
        let window = PageWindow { offset: 0, limit };
        Box::pin(self.round_trip(move |this| this.rows(sql, window)))
    }
}

/// Decrements the in-flight counter when the round-trip ends or is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn unknown_relation(sql: &str) -> BackendError {
    BackendError::Query(format!("relation for statement does not exist: {}", sql))
}

fn read<T>(lock: &RwLock<T>) -> BackendResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| BackendError::Query("memory backend lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> BackendResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| BackendError::Query("memory backend lock poisoned".into()))
}
