//! Stock Analysis API Routes
//!
//! Endpoints for running the fundamentals scoring pipeline on a symbol.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use scoring_core::{CompanyProfile, MetricRecord, StockAnalysis};
use serde::{Deserialize, Serialize};

use crate::{ApiResponse, AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub symbol: String,
}

#[derive(Debug, Serialize)]
pub struct ParameterScoreView {
    pub name: String,
    pub label: String,
    pub value: f64,
    pub score: u8,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub company_info: Option<CompanyProfile>,
    pub scores: Vec<ParameterScoreView>,
    pub overall_score: f64,
    pub recommendation: String,
    pub reason: String,
    pub financial_data: MetricRecord,
}

impl From<StockAnalysis> for AnalysisResponse {
    fn from(analysis: StockAnalysis) -> Self {
        let scores = analysis
            .scoreboard
            .parameters
            .into_iter()
            .map(|p| ParameterScoreView {
                name: p.name,
                label: p.label,
                value: round2(p.value),
                score: p.score,
                weight: p.weight,
            })
            .collect();

        Self {
            symbol: analysis.symbol,
            generated_at: analysis.generated_at,
            company_info: analysis.profile,
            scores,
            overall_score: analysis.scoreboard.overall_score,
            recommendation: analysis.scoreboard.recommendation.label().to_string(),
            reason: analysis.scoreboard.recommendation.rationale().to_string(),
            financial_data: analysis.metrics,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/analyze/:symbol", get(analyze_by_symbol))
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalysisResponse>>, AppError> {
    run_analysis(&state, &request.symbol).await
}

async fn analyze_by_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<AnalysisResponse>>, AppError> {
    run_analysis(&state, &symbol).await
}

async fn run_analysis(
    state: &AppState,
    symbol: &str,
) -> Result<Json<ApiResponse<AnalysisResponse>>, AppError> {
    if symbol.trim().is_empty() {
        return Err(AppError::bad_request("Please enter a stock symbol"));
    }

    let analysis = state.orchestrator.analyze(symbol).await?;
    Ok(Json(ApiResponse::success(analysis.into())))
}
