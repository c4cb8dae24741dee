//! Observability for the query engine
//!
//! - Structured JSON logs, one line per event
//! - Lock-free counters
//!
//! Observability is read-only: it never changes what the engine does.
//!
//! ```ignore
//! use cubequery::observability::{Event, Logger};
//!
//! Logger::info(Event::QueryPersisted, &[("source", "olap_sales"), ("pages", "3")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{EngineMetrics, MetricsSnapshot};
