//! HTTP API.
//!
//! `POST /generate` runs the whole pipeline while the request waits and
//! returns the study guide markdown.

use crate::orchestrator::Orchestrator;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

/// Shared application state.
pub struct AppState {
    pub orchestrator: Orchestrator,
}

/// Build the router with permissive CORS.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/generate", post(generate))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    topic: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    message: &'static str,
    markdown: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let topic = match payload {
        Ok(Json(req)) => req
            .topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        Err(rejection) => {
            debug!("Rejected request body: {}", rejection);
            None
        }
    };

    let Some(topic) = topic else {
        return error_response(StatusCode::BAD_REQUEST, "Topic is required");
    };

    info!("Generating study guide for '{}'", topic);

    match state.orchestrator.run(&topic).await {
        Ok(output) => Json(GenerateResponse {
            message: "Success",
            markdown: output.markdown,
        })
        .into_response(),
        Err(e) => {
            error!("Pipeline failed for '{}': {}", topic, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::ScriptedModel;
    use crate::agent::ModelReply;
    use crate::config::Prompts;
    use crate::orchestrator::tests::{happy_script, test_tools, GUIDE};
    use crate::orchestrator::StageModels;
    use crate::rate_limit::InvocationLimiter;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use std::path::Path;
    use tower::util::ServiceExt;

    fn app(model: Arc<ScriptedModel>, output_dir: &Path) -> Router {
        let orchestrator = Orchestrator::with_components(
            Prompts::default(),
            StageModels::uniform(model),
            test_tools(output_dir),
            Arc::new(InvocationLimiter::per_minute(1000)),
            output_dir.to_path_buf(),
        );
        create_app(Arc::new(AppState { orchestrator }))
    }

    fn post_generate(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/generate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_generate_success() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::new(happy_script()));

        let response = app(model, dir.path())
            .oneshot(post_generate(r#"{"topic": "Quantum Computing"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Success");
        assert_eq!(body["markdown"], GUIDE);
        assert!(dir.path().join("quantum_computing_exam.md").exists());
    }

    #[tokio::test]
    async fn test_missing_or_empty_topic_is_rejected() {
        let bodies = [
            r#"{}"#,
            r#"{"topic": ""}"#,
            r#"{"topic": "   "}"#,
            r#"{"topic": null}"#,
            "not json",
        ];
        for body in bodies {
            let dir = tempfile::tempdir().unwrap();
            let model = Arc::new(ScriptedModel::new(happy_script()));

            let response = app(model.clone(), dir.path())
                .oneshot(post_generate(body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(
                json_body(response).await,
                serde_json::json!({ "error": "Topic is required" })
            );
            assert_eq!(model.invocations(), 0);
        }
    }

    #[tokio::test]
    async fn test_pipeline_error_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ModelReply::text("https://example.com")),
            Err("provider unavailable".to_string()),
        ]));

        let response = app(model, dir.path())
            .oneshot(post_generate(r#"{"topic": "Rust"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("provider unavailable"));
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::new(vec![]));

        let response = app(model, dir.path())
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_generate_rejects_get() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::new(vec![]));

        let response = app(model, dir.path())
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/generate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
