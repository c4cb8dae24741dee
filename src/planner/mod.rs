//! Query planner for cube requests
//!
//! Turns a candidate set into one statement and a page layout.
//!
//! # Selection rule
//!
//! Fewest unmatched fields wins. Ties go to the earliest candidate in
//! producer order.
//!
//! # Pagination
//!
//! Fixed page size, ceiling division, zero rows is zero pages, pages
//! numbered from 0.

mod candidate;
mod errors;
mod pagination;
mod plan;
mod selector;

pub use candidate::{Candidate, CandidateSet};
pub use errors::{PlannerError, PlannerResult};
pub use pagination::{PageWindow, Paginator, MAX_OFFSET};
pub use plan::QueryPlan;
pub use selector::select_best;
