//! # Query Engine
//!
//! Turns candidate sets into bounded, paged execution against registered
//! data sources.
//!
//! A request goes through selection, a row-count check and pagination before
//! anything is stored. Stored plans are then fetched one page at a time, each
//! page a single gated round-trip.

mod errors;
mod guard;
mod query_engine;
mod registry;

pub use errors::{EngineError, EngineResult};
pub use guard::{count_query, unwrap_count_query, RowCountCheck, RowCountGuard, COUNT_COLUMN};
pub use query_engine::{PersistedQueryHandle, QueryEngine};
pub use registry::{SourceHandle, SourceRegistry};
