use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use filedock::{PreviewRequest, PreviewResult};
use std::sync::Arc;

/// Preview the first lines of a stored file (POST /api/preview)
pub async fn preview_file(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> ServerResult<Json<PreviewResult>> {
    let Json(request) = payload.map_err(ServerError::from)?;

    let dock = state.dock.clone();
    let result = tokio::task::spawn_blocking(move || dock.preview(&request)).await??;

    Ok(Json(result))
}
