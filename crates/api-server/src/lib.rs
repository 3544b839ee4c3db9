//! HTTP surface for the analysis pipeline.
//!
//! Thin glue only: handlers validate input, call the orchestrator, and
//! shape the result for JSON consumers. All scoring logic lives in the
//! engine crates.

use analysis_orchestrator::AnalysisOrchestrator;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use scoring_core::AnalysisError;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod analyze_routes;
pub mod config;

pub use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

/// Standard response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler-level error carrying the HTTP status it should map to.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            // Unknown symbol / provider outage is not a low score; report
            // it as its own condition.
            AnalysisError::DataUnavailable(symbol) => Self::not_found(format!(
                "Data unavailable for {symbol}. Please check the symbol and try again."
            )),
            AnalysisError::InvalidData(message) => Self::bad_request(message),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "request failed");
        }
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(analyze_routes::analyze_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env()?;
    let state = AppState {
        orchestrator: Arc::new(AnalysisOrchestrator::with_yahoo()),
    };

    let addr = format!("{}:{}", config.bind_addr, config.port);
    tracing::info!("EquityScope API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
