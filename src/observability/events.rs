//! Observable engine events
//!
//! Events are explicit and typed; the string form is what lands in logs.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// A data source was registered with its gate and backend
    SourceRegistered,
    /// HTTP server is about to accept connections
    ServerStart,
    /// Shutdown signal received; gates closed
    ServerStop,

    // Plan & persist
    /// A candidate was selected for a request
    QuerySelected,
    /// Row count of the selected candidate was measured
    RowCountChecked,
    /// The selected candidate exceeded the row ceiling
    QueryRejected,
    /// The plan was written to the store
    QueryPersisted,
    /// The store refused the plan
    PersistenceFailed,

    // Reads
    /// One page of a persisted query was returned
    PageFetched,
    /// A dimension lookup returned
    DimensionFetched,
    /// A dimension lookup returned more rows than allowed
    DimensionTruncated,

    // Failures
    /// The warehouse returned an error
    DataSourceFailed,
    /// Background connection task ended with an error
    ConnectionFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SourceRegistered => "SOURCE_REGISTERED",
            Event::ServerStart => "SERVER_START",
            Event::ServerStop => "SERVER_STOP",
            Event::QuerySelected => "QUERY_SELECTED",
            Event::RowCountChecked => "ROW_COUNT_CHECKED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::QueryPersisted => "QUERY_PERSISTED",
            Event::PersistenceFailed => "PERSISTENCE_FAILED",
            Event::PageFetched => "PAGE_FETCHED",
            Event::DimensionFetched => "DIMENSION_FETCHED",
            Event::DimensionTruncated => "DIMENSION_TRUNCATED",
            Event::DataSourceFailed => "DATA_SOURCE_FAILED",
            Event::ConnectionFailed => "CONNECTION_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
