use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::{Multipart, State};
use axum::Json;
use filedock::{DockError, StoredFile, UploadBatch, UploadPart};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Response from a successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    /// Saved files keyed by label
    pub files: BTreeMap<String, StoredFile>,
}

/// Store the labelled parts of a multipart form (POST /api/upload)
///
/// File parts named by the configured upload labels are saved; any other
/// part, including a plain value sent under an upload label, is ignored. A
/// form with none of the labelled file parts is rejected before anything
/// touches the disk.
pub async fn upload_files(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    let mut batch = UploadBatch::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(label) = field.name().map(str::to_string) else {
            continue;
        };
        if !state.config.accepts_label(&label) {
            tracing::debug!(field = %label, "upload_field_ignored");
            continue;
        }

        // A plain form value under an upload label is not a file.
        let Some(filename) = field.file_name().map(str::to_string) else {
            tracing::debug!(field = %label, "upload_field_without_file_ignored");
            continue;
        };
        let content = field.bytes().await?;
        batch
            .insert(UploadPart::new(label, Some(filename), content))
            .map_err(DockError::from)?;
    }

    let dock = state.dock.clone();
    let files = tokio::task::spawn_blocking(move || dock.upload(batch)).await??;

    tracing::info!(files = files.len(), "upload_complete");

    Ok(Json(UploadResponse {
        status: "ok",
        files,
    }))
}
