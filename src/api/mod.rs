use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::entities::QueryLogEntry;
use crate::orchestrator::{QueryError, QueryOrchestrator, QueryOutcome};
use crate::query_log::QueryLog;
use crate::registry;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<QueryOrchestrator>,
    pub query_log: Arc<QueryLog>,
}

#[derive(Debug, Deserialize)]
pub struct QueryHttpRequest {
    pub query: String,
    #[serde(default)]
    pub requester_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "sentinel-ops-backend",
        status: "operational",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryHttpRequest>,
) -> Result<Json<QueryOutcome>, (StatusCode, Json<ErrorResponse>)> {
    match state
        .orchestrator
        .process(&request.query, request.requester_id.as_deref())
        .await
    {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e @ QueryError::InvalidQuery) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

#[derive(Debug, Serialize)]
pub struct FunctionCatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
}

/// Read-only view of the function registry, for operator tooling.
pub async fn handle_functions() -> Json<Vec<FunctionCatalogEntry>> {
    Json(
        registry::catalog()
            .iter()
            .map(|spec| FunctionCatalogEntry {
                name: spec.name,
                description: spec.description,
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub requester_id: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<QueryLogEntry>,
}

pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let limit = params.limit.unwrap_or(20).min(200);
    match state.query_log.recent(params.requester_id.as_deref(), limit) {
        Ok(entries) => Ok(Json(HistoryResponse { entries })),
        Err(e) => {
            error!(error = %e, "Failed to read query history");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "query history is unavailable".to_string(),
                }),
            ))
        }
    }
}
