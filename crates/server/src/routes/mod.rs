//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `upload`: multipart uploads into the content directory
//! - `preview`: tabular previews of stored files

pub mod health;
pub mod preview;
pub mod upload;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Root greeting (GET /)
///
/// ```json
/// {
///   "message": "Filedock API",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "message": "Filedock API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/hello",
            "/api/upload",
            "/api/preview",
            "/health",
            "/ready"
        ]
    })))
}

/// Greeting endpoint (GET /api/hello)
pub async fn hello() -> impl IntoResponse {
    Json(json!({ "message": "Hello from the backend API!" }))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
