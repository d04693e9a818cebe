// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::RwLock;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::analyze::{AnalysisContext, AnalysisResult, PostAnalyzer};
use crate::error::AnalyzerError;
use crate::ingest::types::Post;
use crate::pipeline;
use crate::report::{AnalyticsReport, ExportDocument};
use crate::sentiment::SentimentScorer;

#[derive(Clone)]
pub struct AppState {
    ctx: Arc<AnalysisContext>,
    scorer: Arc<dyn SentimentScorer>,
    latest: Arc<RwLock<Option<AnalyticsReport>>>,
}

impl AppState {
    pub fn new(ctx: AnalysisContext, scorer: Arc<dyn SentimentScorer>) -> Self {
        Self {
            ctx: Arc::new(ctx),
            scorer,
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// Analytics of the last successful `/batch` call.
    pub fn latest(&self) -> Option<AnalyticsReport> {
        self.latest.read().clone()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/batch", post(analyze_batch))
        .route("/analytics/latest", get(latest_analytics))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Router with the built-in lexicon and scorer.
pub fn router() -> Router {
    create_router(AppState::new(
        AnalysisContext::builtin(),
        Arc::new(crate::sentiment::LexiconScorer::new()),
    ))
}

/* ----------------------------
Errors
---------------------------- */

pub struct ApiError(AnalyzerError);

impl From<AnalyzerError> for ApiError {
    fn from(e: AnalyzerError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_per_post() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/* ----------------------------
Handlers
---------------------------- */

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    text: String,
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<AnalysisResult>, ApiError> {
    if body.text.trim().is_empty() {
        return Err(AnalyzerError::malformed("", "missing text").into());
    }
    let analyzer = PostAnalyzer::new(&state.ctx, state.scorer.as_ref());
    Ok(Json(analyzer.analyze_text(&body.text)?))
}

/// Rows are decoded one by one so a single bad row is rejected, not the batch.
async fn analyze_batch(
    State(state): State<AppState>,
    Json(rows): Json<Vec<serde_json::Value>>,
) -> Result<Json<ExportDocument>, ApiError> {
    let rows = rows.into_iter().map(Post::from_value).collect();
    let analyzer = PostAnalyzer::new(&state.ctx, state.scorer.as_ref());
    let doc = pipeline::analyze_rows(&analyzer, rows, chrono::Utc::now())?;
    *state.latest.write() = Some(doc.analytics.clone());
    Ok(Json(doc))
}

/// `null` until the first batch has been analyzed.
async fn latest_analytics(State(state): State<AppState>) -> Json<Option<AnalyticsReport>> {
    Json(state.latest())
}
