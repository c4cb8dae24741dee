//! # HTTP Server Module
//!
//! Thin axum boundary over the query engine.
//!
//! # Endpoints
//!
//! - `POST /cube/:source/query_info` - Plan and persist a query
//! - `GET /cube/query/:id?page=N` - Fetch one page of a persisted query
//! - `POST /cube/:source/dimension` - Distinct values for a filter picker
//! - `GET /health` - Health check
//! - `GET /metrics` - Engine counters

pub mod config;
pub mod routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
