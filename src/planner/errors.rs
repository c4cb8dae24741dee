//! Planner error types
//!
//! Error codes:
//! - CUBE_NO_VIABLE_QUERY
//! - CUBE_INVALID_PAGE

use thiserror::Error;

/// Planner errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// The candidate set had nothing to choose from
    #[error("No viable query: candidate set is empty")]
    NoViableQuery,

    /// Page indexes start at zero
    #[error("Invalid page index {0}: pages are numbered from 0")]
    InvalidPage(i64),
}

impl PlannerError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerError::NoViableQuery => "CUBE_NO_VIABLE_QUERY",
            PlannerError::InvalidPage(_) => "CUBE_INVALID_PAGE",
        }
    }
}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PlannerError::NoViableQuery.code(), "CUBE_NO_VIABLE_QUERY");
        assert_eq!(PlannerError::InvalidPage(-1).code(), "CUBE_INVALID_PAGE");
    }

    #[test]
    fn test_invalid_page_display() {
        let display = PlannerError::InvalidPage(-3).to_string();
        assert!(display.contains("-3"));
    }
}
