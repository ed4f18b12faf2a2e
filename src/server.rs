use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::AnalysisHandler;
use crate::models::AnalyzeRequest;
use crate::services::IdentityService;

pub struct AppState {
    pub handler: Arc<AnalysisHandler>,
    pub identity: Arc<dyn IdentityService>,
}

pub fn create_router(
    handler: Arc<AnalysisHandler>,
    identity: Arc<dyn IdentityService>,
) -> Router {
    let state = Arc::new(AppState { handler, identity });

    // Browser clients call the API directly; every route answers
    // cross-origin requests, including the OPTIONS preflight.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/analyze", post(analyze_handler))
        .layer(cors)
        .with_state(state)
}

async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    // Parse by hand so a malformed body surfaces in the same JSON error
    // shape as any other unexpected failure.
    let request: AnalyzeRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            log::error!("❌ Failed to parse analysis request: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "음식 분석 중 오류가 발생했습니다",
                    "details": e.to_string(),
                })),
            )
                .into_response();
        }
    };

    let user_id = resolve_identity(&headers, state.identity.as_ref()).await;
    log::info!(
        "📨 Analysis request from {} (image: {}, description: {})",
        user_id,
        request.image_base64.is_some(),
        request.description.is_some()
    );

    match state.handler.analyze(&request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            log::warn!("⚠️ Rejected analysis request from {}: {}", user_id, e);
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// Resolves the caller through the identity service. Lookups that fail
/// for any reason downgrade to "anonymous" instead of blocking analysis.
async fn resolve_identity(headers: &HeaderMap, identity: &dyn IdentityService) -> String {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value));

    match token {
        Some(token) => identity
            .resolve_user(token)
            .await
            .unwrap_or_else(|| "anonymous".to_string()),
        None => "anonymous".to_string(),
    }
}

async fn root_handler() -> &'static str {
    "Food Analysis API - POST /analyze with an image and/or description"
}

async fn health_check() -> &'static str {
    "OK"
}
