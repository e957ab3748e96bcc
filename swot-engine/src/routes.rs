//! HTTP routes for the SWOT engine.
//!
//! - `GET /` - static input form
//! - `POST /analyze` - run the full analysis pipeline and render results
//! - `GET /api/result?id=<run_id>` - persisted run as JSON
//! - `GET /health`, `GET /ready` - service liveness

use axum::{
    extract::{Form, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use swot_common::config::Config;
use swot_common::error::Error;

use crate::analysis::{AnalysisBridge, LayerNotes, SeedInputs};
use crate::model::{make_run_id, RunSummary};
use crate::scoring::compute_priorities;
use crate::store::RunStore;
use crate::templates;

// ============================================================================
// State
// ============================================================================

/// Shared state for the HTTP server. Built once at startup; no globals.
pub struct AppState {
    pub config: Arc<Config>,
    pub bridge: Arc<AnalysisBridge>,
    pub store: Arc<RunStore>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Fields of the analysis form. The layer and seed fields are optional;
/// company and desired outcomes are required and checked in the handler.
#[derive(Debug, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub desired_outcomes: String,
    #[serde(default)]
    pub layer_canonical: String,
    #[serde(default)]
    pub layer_corpus: String,
    #[serde(default)]
    pub layer_transactional: String,
    #[serde(default)]
    pub strengths: String,
    #[serde(default)]
    pub weaknesses: String,
    #[serde(default)]
    pub opportunities: String,
    #[serde(default)]
    pub threats: String,
}

#[derive(Debug, Deserialize)]
struct ResultQuery {
    #[serde(default)]
    id: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: "swot-engine",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn ready() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ready",
            service: "swot-engine",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

async fn index() -> Html<&'static str> {
    Html(templates::FORM_HTML)
}

/// Full pipeline: structure the three layers, score, persist, render.
async fn analyze(State(state): State<Arc<AppState>>, Form(form): Form<AnalyzeForm>) -> Response {
    let company = form.company_name.trim().to_string();
    let desired_outcomes = form.desired_outcomes.trim().to_string();

    if company.is_empty() || desired_outcomes.is_empty() {
        return error_page(Error::InvalidInput(
            "company_name and desired_outcomes are required".into(),
        ));
    }

    let notes = LayerNotes {
        canonical: form.layer_canonical,
        corpus: form.layer_corpus,
        transactional: form.layer_transactional,
    };
    let seeds = SeedInputs::from_form_fields(
        &form.strengths,
        &form.weaknesses,
        &form.opportunities,
        &form.threats,
    );

    tracing::info!(company = %company, "Starting analysis run");

    let (canonical, corpus, transactional) = match state
        .bridge
        .analyze(&company, &desired_outcomes, &notes, &seeds)
        .await
    {
        Ok(layers) => layers,
        Err(e) => {
            tracing::error!(error = %e, "Layer analysis failed");
            return error_page(e);
        }
    };

    let priorities = compute_priorities(&canonical, &corpus, &transactional);
    let timestamp = Utc::now();
    let summary = RunSummary {
        run_id: make_run_id(timestamp, &company),
        timestamp,
        company,
        desired_outcomes,
        canonical,
        corpus,
        transactional,
        priorities,
    };

    // Nothing is served until the run is durably recorded.
    if let Err(e) = state.store.persist(&summary) {
        tracing::error!(run_id = %summary.run_id, error = %e, "Failed to persist run");
        return error_page(e);
    }

    tracing::info!(
        run_id = %summary.run_id,
        top = summary
            .priorities
            .top()
            .map(|t| t.dimension.as_str())
            .unwrap_or(""),
        "Analysis run completed"
    );

    Html(templates::render_results(&summary)).into_response()
}

/// Persisted run lookup. Unknown ids are a 404, never a server error.
async fn api_result(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResultQuery>,
) -> Response {
    match state.store.load(&query.id) {
        Ok(Some(summary)) => Json(summary).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Run ID not found." })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(run_id = %query.id, error = %e, "Failed to load run");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Map a pipeline error to a user-visible HTML error page.
fn error_page(error: Error) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let title = match status {
        StatusCode::BAD_REQUEST => "Invalid request",
        StatusCode::BAD_GATEWAY => "Analysis failed",
        _ => "Something went wrong",
    };
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        templates::render_error(title, &error.to_string()),
    )
        .into_response()
}

// ============================================================================
// Router Builder
// ============================================================================

/// Build the engine HTTP router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/api/result", get(api_result))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use swot_common::config::{Config, ProviderConfig, StorageConfig};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::provider::build_provider;

    fn create_test_state(temp_dir: &TempDir) -> Arc<AppState> {
        let mut config = Config::default();
        config.provider = ProviderConfig {
            kind: "ollama".into(),
            ..Default::default()
        };
        config.storage = StorageConfig {
            data_dir: temp_dir.path().join("swot_data"),
            log_file: "swot_runs.csv".into(),
        };

        let provider = build_provider(&config.provider).unwrap();
        let bridge = Arc::new(AnalysisBridge::new(provider, &config.provider));
        let store = Arc::new(RunStore::new(&config.storage).unwrap());

        Arc::new(AppState {
            config: Arc::new(config),
            bridge,
            store,
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let temp_dir = TempDir::new().unwrap();
        let app = build_router(create_test_state(&temp_dir));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let temp_dir = TempDir::new().unwrap();
        let app = build_router(create_test_state(&temp_dir));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("name=\"company_name\""));
        assert!(html.contains("name=\"layer_transactional\""));
    }

    #[tokio::test]
    async fn test_api_result_unknown_id_is_404() {
        let temp_dir = TempDir::new().unwrap();
        let app = build_router(create_test_state(&temp_dir));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/result?id=20990101000000_Nobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Run ID not found.");
    }

    #[tokio::test]
    async fn test_api_result_missing_id_is_404() {
        let temp_dir = TempDir::new().unwrap();
        let app = build_router(create_test_state(&temp_dir));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/result")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analyze_rejects_missing_required_fields() {
        let temp_dir = TempDir::new().unwrap();
        let app = build_router(create_test_state(&temp_dir));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/analyze")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("company_name=&desired_outcomes="))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("required"));
    }
}
