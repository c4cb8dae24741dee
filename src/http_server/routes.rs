//! Cube query routes
//!
//! Each handler maps one engine operation to JSON in and JSON out. Engine
//! errors become `{"error": {"code", "message"}}` with the error's own status.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::Row;
use crate::engine::{EngineError, PersistedQueryHandle, QueryEngine};
use crate::observability::MetricsSnapshot;
use crate::planner::CandidateSet;
use crate::store::QueryId;

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct QueryInfoRequest {
    pub candidates: CandidateSet,
    /// Frontend request, stored verbatim alongside the plan
    #[serde(default)]
    pub request: Value,
}

#[derive(Debug, Deserialize)]
pub struct DimensionRequest {
    pub candidates: CandidateSet,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: i64,
}

#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub rows: Vec<Row>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: EngineError) -> HandlerError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: ErrorBody {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }),
    )
}

// ==================
// Routes
// ==================

/// Create cube query routes
pub fn cube_routes(engine: Arc<QueryEngine>) -> Router {
    Router::new()
        .route("/cube/:source/query_info", post(query_info_handler))
        .route("/cube/:source/dimension", post(dimension_handler))
        .route("/cube/query/:id", get(page_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(engine)
}

async fn query_info_handler(
    State(engine): State<Arc<QueryEngine>>,
    Path(source): Path<String>,
    Json(body): Json<QueryInfoRequest>,
) -> Result<Json<PersistedQueryHandle>, HandlerError> {
    engine
        .plan_and_persist(&source, &body.candidates, body.request)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn page_handler(
    State(engine): State<Arc<QueryEngine>>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<RowsResponse>, HandlerError> {
    // A malformed id cannot name a stored query.
    let id: QueryId = id.parse().map_err(|_| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: ErrorBody {
                    code: "CUBE_UNKNOWN_QUERY".to_string(),
                    message: format!("Unknown query '{}'", id),
                },
            }),
        )
    })?;

    let rows = engine
        .fetch_page(&id, query.page)
        .await
        .map_err(error_response)?;
    Ok(Json(RowsResponse { rows }))
}

async fn dimension_handler(
    State(engine): State<Arc<QueryEngine>>,
    Path(source): Path<String>,
    Json(body): Json<DimensionRequest>,
) -> Result<Json<RowsResponse>, HandlerError> {
    let rows = engine
        .fetch_dimension(&source, &body.candidates)
        .await
        .map_err(error_response)?;
    Ok(Json(RowsResponse { rows }))
}

async fn health_handler(State(engine): State<Arc<QueryEngine>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sources: engine
            .registry()
            .names()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

async fn metrics_handler(State(engine): State<Arc<QueryEngine>>) -> Json<MetricsSnapshot> {
    Json(engine.metrics().snapshot())
}
