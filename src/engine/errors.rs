//! Engine error types
//!
//! Error codes:
//! - CUBE_NO_VIABLE_QUERY (422)
//! - CUBE_ROW_LIMIT_EXCEEDED (422)
//! - CUBE_DATA_SOURCE_ERROR (502)
//! - CUBE_PERSISTENCE_ERROR (500)
//! - CUBE_UNKNOWN_QUERY (404)
//! - CUBE_INVALID_PAGE (400)
//! - CUBE_UNKNOWN_SOURCE (404)
//! - CUBE_SOURCE_UNAVAILABLE (503)
//!
//! Nothing in the engine retries. Each variant carries enough context for the
//! caller to act on it or relay it to the user.

use thiserror::Error;

use crate::backend::BackendError;
use crate::gate::GateError;
use crate::planner::PlannerError;
use crate::store::{QueryId, StoreError};

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The candidate generator produced nothing for the request
    #[error("No viable query for source '{source_name}'")]
    NoViableQuery { source_name: String },

    /// The selected candidate returns too many rows; the request must be narrowed
    #[error("Query on '{source_name}' returns {row_count} rows, more than the limit of {max_rows}")]
    RowLimitExceeded {
        source_name: String,
        row_count: u64,
        max_rows: u64,
    },

    /// The warehouse call failed
    #[error("Data source '{source_name}' failed: {source}")]
    DataSource {
        source_name: String,
        source: BackendError,
    },

    /// The persisted query store failed, on write or on read
    #[error("Query store error: {0}")]
    Persistence(#[from] StoreError),

    /// No persisted query has this id
    #[error("Unknown query '{0}'")]
    UnknownQuery(QueryId),

    /// Negative page index
    #[error("Invalid page index {0}: pages are numbered from 0")]
    InvalidPage(i64),

    /// No source registered under this name
    #[error("Unknown source '{0}'")]
    UnknownSource(String),

    /// The source's gate was closed
    #[error("Source unavailable: {0}")]
    Unavailable(#[from] GateError),
}

impl EngineError {
    /// Attaches the source name to a planner error
    pub(crate) fn from_planner(source_name: &str, err: PlannerError) -> Self {
        match err {
            PlannerError::NoViableQuery => EngineError::NoViableQuery {
                source_name: source_name.to_string(),
            },
            PlannerError::InvalidPage(page) => EngineError::InvalidPage(page),
        }
    }

    /// Attaches the source name to a backend error
    pub(crate) fn data_source(source_name: &str, err: BackendError) -> Self {
        EngineError::DataSource {
            source_name: source_name.to_string(),
            source: err,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::NoViableQuery { .. } => "CUBE_NO_VIABLE_QUERY",
            EngineError::RowLimitExceeded { .. } => "CUBE_ROW_LIMIT_EXCEEDED",
            EngineError::DataSource { .. } => "CUBE_DATA_SOURCE_ERROR",
            EngineError::Persistence(_) => "CUBE_PERSISTENCE_ERROR",
            EngineError::UnknownQuery(_) => "CUBE_UNKNOWN_QUERY",
            EngineError::InvalidPage(_) => "CUBE_INVALID_PAGE",
            EngineError::UnknownSource(_) => "CUBE_UNKNOWN_SOURCE",
            EngineError::Unavailable(_) => "CUBE_SOURCE_UNAVAILABLE",
        }
    }

    /// HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::NoViableQuery { .. } => 422,
            EngineError::RowLimitExceeded { .. } => 422,
            EngineError::DataSource { .. } => 502,
            EngineError::Persistence(_) => 500,
            EngineError::UnknownQuery(_) => 404,
            EngineError::InvalidPage(_) => 400,
            EngineError::UnknownSource(_) => 404,
            EngineError::Unavailable(_) => 503,
        }
    }
}
