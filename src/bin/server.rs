//! healthcheck HTTP Server
//!
//! Serves health-check evaluation over HTTP/JSON.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use healthchecks::checks::{CheckKind, HealthEvaluator};
use healthchecks::view::EvaluateRequest;
use healthchecks::{cli, config, Error};

// ═══════════════════════════════════════════════════════════════════════════════
// SERVER STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared application state
pub struct AppState {
    pub evaluator: HealthEvaluator,
}

// ═══════════════════════════════════════════════════════════════════════════════
// API TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, code: None }
    }

    pub fn err(error: &Error) -> Self {
        Self { success: false, data: None, error: Some(error.to_string()), code: Some(error.code()) }
    }
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidInput(_) | Error::MalformedFacts { .. } | Error::Deserialization(_) => StatusCode::BAD_REQUEST,
        Error::MissingThreshold { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(error: Error) -> (StatusCode, Json<ApiResponse<Value>>) {
    let status = status_for(&error);
    if status.is_server_error() {
        warn!(error = %error, "evaluation failed");
    }
    (status, Json(ApiResponse::err(&error)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLERS
// ═══════════════════════════════════════════════════════════════════════════════

/// GET /health - Liveness
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "healthcheck-server",
        "version": healthchecks::VERSION
    }))
}

/// GET /checks - Recognized check names
async fn list_checks() -> impl IntoResponse {
    let names: Vec<&str> = CheckKind::all().iter().map(CheckKind::name).collect();
    Json(ApiResponse::ok(names))
}

/// GET /defaults - Default-threshold table in use
async fn get_defaults(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.evaluator.defaults().clone()))
}

/// POST /evaluate - Evaluate facts against a target
async fn evaluate(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> impl IntoResponse {
    let request: EvaluateRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => return failure(Error::InvalidInput(e.to_string())),
    };

    let report = state
        .evaluator
        .evaluate_request(request)
        .and_then(|report| report.to_value());

    match report {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::ok(report))),
        Err(e) => failure(e),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let defaults_path = std::env::var_os("HEALTHCHECK_DEFAULTS").map(PathBuf::from);
    let defaults = cli::load_defaults(defaults_path.as_deref()).context("loading default thresholds")?;
    config::init(defaults)?;

    let state = Arc::new(AppState {
        evaluator: HealthEvaluator::global(),
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/checks", get(list_checks))
        .route("/defaults", get(get_defaults))
        .route("/evaluate", post(evaluate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state);

    let addr: SocketAddr = std::env::var("HEALTHCHECK_BIND")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()
        .context("invalid HEALTHCHECK_BIND address")?;

    info!("Starting healthcheck server on {}", addr);
    info!("API endpoints:");
    info!("  GET  /health    - Liveness");
    info!("  GET  /checks    - Recognized check names");
    info!("  GET  /defaults  - Default thresholds");
    info!("  POST /evaluate  - Evaluate facts");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
