//! cubequery - candidate selection and bounded execution for OLAP cube queries
//!
//! A request arrives as a set of candidate SQL statements. The engine picks
//! the best one, checks its row count against a ceiling, stores the plan and
//! later serves it page by page. Every warehouse round-trip passes through a
//! per-source connection gate.

pub mod backend;
pub mod cli;
pub mod config;
pub mod engine;
pub mod gate;
pub mod http_server;
pub mod observability;
pub mod planner;
pub mod store;
