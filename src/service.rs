// Axum Document Service Module
//
// Purpose: HTTP shell around the wikitext transformer. Every request body is
// a JSON ParseRequest; every response is JSON, shaped per the configured
// ResponseShape.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

use serde::Deserialize;
use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ResponseShape;
use crate::transform::{DocumentSection, TransformError, WikitextTransformer};

/// Request bodies above this are refused with 413 before parsing.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub transformer: Arc<WikitextTransformer>,
    pub shape: ResponseShape,
}

impl AppState {
    pub fn new(shape: ResponseShape) -> Self {
        Self {
            transformer: Arc::new(WikitextTransformer::new()),
            shape,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Every other path and method carries a parse request; callers post
        // to arbitrary paths on the listener.
        .fallback(parse_document)

        // Middleware (applied in reverse order)
        .layer(CorsLayer::permissive()) // Allow all origins (adjust for production)
        .layer(TraceLayer::new_for_http()) // Request logging
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn parse_document(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ParseResponse>, AppError> {
    let request: ParseRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))?;

    // Diagnostic only; id and source never influence parsing.
    tracing::info!(
        "Parsing wikitext from document {} of {}",
        request.id.as_deref().unwrap_or("<unknown>"),
        request.source.as_deref().unwrap_or("<unknown>"),
    );

    let document = state
        .transformer
        .transform(&request.wikitext)
        .map_err(AppError::Transform)?;

    let response = match state.shape {
        ResponseShape::Sectioned => ParseResponse::Sectioned {
            document: document.sections,
        },
        ResponseShape::Plain => ParseResponse::Plain {
            text: document.plain_text(),
        },
    };

    Ok(Json(response))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Incoming parse request. Extra fields are tolerated; pipeline clients send
/// more than we read.
#[derive(Debug, Deserialize)]
struct ParseRequest {
    wikitext: String,
    id: Option<String>,
    source: Option<String>,
}

/// Outgoing response, one variant per configured shape.
#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum ParseResponse {
    Sectioned { document: Vec<DocumentSection> },
    Plain { text: String },
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Transform(TransformError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Transform(err) => {
                // Log the cause; the response body stays opaque.
                tracing::error!("wikitext transformation failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "wikitext transformation failed".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
