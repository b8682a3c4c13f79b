use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::logging::SharedLogger;
use crate::models;
use crate::proxy::{self, ProxyOutcome};

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const SERVICE_NAME: &str = "OpenAI to NVIDIA NIM Proxy";
pub const OPTIMIZED_FOR: &str = "Janitor AI";
/// API surface version reported by `GET /`.
pub const SERVICE_VERSION: &str = "2.0";

/// Reasoning tokens are always stripped from responses.
pub const SHOW_REASONING: bool = false;
/// No thinking-mode control fields are sent upstream.
pub const ENABLE_THINKING_MODE: bool = false;

const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: ProxyConfig,
    pub client: reqwest::Client,
    pub logger: SharedLogger,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Wrong methods on known paths get the same 404 as unknown paths.
    Router::new()
        .route("/", get(handle_root).fallback(handle_not_found))
        .route("/health", get(handle_health).fallback(handle_not_found))
        .route("/v1/models", get(handle_models).fallback(handle_not_found))
        .route(
            "/v1/chat/completions",
            post(handle_chat_completions).fallback(handle_not_found),
        )
        .fallback(handle_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_chat_completions(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match proxy::proxy_chat_completion(&body, &state.config, &state.client, &state.logger).await {
        Ok(ProxyOutcome::Complete(resp)) => Json(resp).into_response(),
        Ok(ProxyOutcome::Stream(stream)) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::CONNECTION, "keep-alive")
            .body(Body::from_stream(stream))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            tracing::warn!(error = %e, "chat completion failed");
            state.logger.error("server", format!("Proxy error: {}", e));
            e.into_response()
        }
    }
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": format!("{} ({} Optimized)", SERVICE_NAME, OPTIMIZED_FOR),
        "reasoning_display": SHOW_REASONING,
        "thinking_mode": ENABLE_THINKING_MODE,
        "nim_api_configured": state.config.has_api_key(),
        "available_models": models::model_mapping().len(),
        "optimized_for": OPTIMIZED_FOR,
    }))
}

async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
        "optimized_for": OPTIMIZED_FOR,
        "status": "running",
        "endpoints": {
            "health": "/health",
            "models": "/v1/models",
            "chat": "/v1/chat/completions",
        },
        "featured_models": {
            "best_quality": "gpt-4 → deepseek-v3.2 (685B params)",
            "balanced": "claude-sonnet → llama-3.3-nemotron-super (49B)",
            "fastest": "gpt-3.5-turbo → llama-3.1-nemotron-nano (8B)",
        },
    }))
}

async fn handle_models() -> Json<models::ModelList> {
    Json(models::model_list(chrono::Utc::now().timestamp()))
}

async fn handle_not_found(uri: Uri) -> ProxyError {
    ProxyError::not_found(uri.path())
}
