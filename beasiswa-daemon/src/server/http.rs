//! HTTP routes and handlers for the recommendation API.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use beasiswa_core::{snapshot, CountryCount, GraphStats, RelationKind, ScholarshipFilter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::state::{AppState, GraphInfo};
use crate::build::BuildPipeline;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and status
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
        // Students
        .route("/students", get(list_students))
        .route("/student/:id/recommended", get(recommended))
        .route("/student/:id/recommend/custom", get(custom_recommendation))
        // Scholarships
        .route("/scholarship/:id/info", get(scholarship_info))
        .route("/scholarships", get(filter_scholarships))
        .route("/country/top", get(top_countries))
        // Graph lifecycle
        .route("/build", post(build))
        .route("/export", get(export_graph))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T, start: Instant) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn err(error: impl ToString, start: Instant) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

// =============================================================================
// Health & Status
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "beasiswa recommendation API is running",
        "version": beasiswa_core::version(),
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "beasiswa-daemon"
    }))
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    stats: GraphStats,
    graph: GraphInfo,
    uptime_seconds: f64,
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();
    let (engine, graph) = state.current().await;

    let data = StatusResponse {
        status: "running".to_string(),
        stats: engine.stats(),
        graph,
        uptime_seconds: state.uptime_seconds(),
    };

    ApiResponse::ok(data, start)
}

// =============================================================================
// Query Endpoints
// =============================================================================

async fn list_students(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();
    let engine = state.engine().await;
    ApiResponse::ok(engine.list_students(), start)
}

async fn recommended(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let start = Instant::now();
    let engine = state.engine().await;
    ApiResponse::ok(engine.recommendations_for(&id), start)
}

async fn scholarship_info(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let start = Instant::now();
    let engine = state.engine().await;
    let info: BTreeMap<RelationKind, Vec<String>> = engine.describe(&id);
    ApiResponse::ok(info, start)
}

#[derive(Deserialize)]
struct TopParams {
    n: Option<i64>,
}

async fn top_countries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TopParams>,
) -> impl IntoResponse {
    let start = Instant::now();
    let n = params.n.unwrap_or(state.config.query.default_top_countries);
    let engine = state.engine().await;
    let top: Vec<CountryCount> = engine.top_countries(n);
    ApiResponse::ok(top, start)
}

async fn filter_scholarships(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ScholarshipFilter>,
) -> impl IntoResponse {
    let start = Instant::now();
    let engine = state.engine().await;
    ApiResponse::ok(engine.filter_scholarships(&filter), start)
}

/// Student-scoped route kept for dashboard compatibility; matching depends on
/// the filter only.
async fn custom_recommendation(
    State(state): State<Arc<AppState>>,
    Path(_student_id): Path<String>,
    Query(filter): Query<ScholarshipFilter>,
) -> impl IntoResponse {
    let start = Instant::now();
    let engine = state.engine().await;
    ApiResponse::ok(engine.filter_scholarships(&filter), start)
}

// =============================================================================
// Build & Export
// =============================================================================

#[derive(Serialize)]
struct BuildResponse {
    node_count: usize,
    edge_count: usize,
    records_seen: usize,
    records_accepted: usize,
    records_rejected: usize,
    recommendations_gated: usize,
    snapshot: Option<String>,
    duration_ms: u64,
}

/// Rebuild from the configured record file. The request body is ignored.
async fn build(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();

    let pipeline = BuildPipeline::new((*state).clone());
    match pipeline.rebuild().await {
        Ok(result) => {
            let data = BuildResponse {
                node_count: result.node_count,
                edge_count: result.edge_count,
                records_seen: result.report.records_seen,
                records_accepted: result.report.records_accepted,
                records_rejected: result.report.records_rejected,
                recommendations_gated: result.report.recommendations_gated,
                snapshot: result.snapshot.map(|p| p.display().to_string()),
                duration_ms: result.duration.as_millis() as u64,
            };
            ApiResponse::ok(data, start)
        }
        Err(e) => ApiResponse::<BuildResponse>::err(format!("{:#}", e), start),
    }
}

async fn export_graph(State(state): State<Arc<AppState>>) -> Response {
    let start = Instant::now();
    let engine = state.engine().await;

    let mut body = Vec::new();
    match snapshot::to_writer(engine.graph(), &mut body) {
        Ok(()) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiResponse::<()>::err(e, start),
        )
            .into_response(),
    }
}
