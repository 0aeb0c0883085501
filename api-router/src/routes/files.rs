use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use bytes::Bytes;
use common::{error::AppError, storage::types::uploaded_file::UploadedFile};
use evaluation_pipeline::RawFile;
use serde_json::json;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, TryFromMultipart)]
pub struct UploadBatchParams {
    #[form_data(default, limit = "unlimited")]
    pub files: Vec<FieldData<NamedTempFile>>,
}

/// Uploads a batch of contractor documents and drives them through the
/// upload → index → attach sequence. The whole batch either ends fully
/// indexed or the response names the first point of failure.
pub async fn upload_contractor_files(
    State(state): State<ApiState>,
    Path(contractor_id): Path<String>,
    TypedMultipart(input): TypedMultipart<UploadBatchParams>,
) -> Result<impl IntoResponse, ApiError> {
    info!(
        contractor_id = %contractor_id,
        file_count = input.files.len(),
        "received upload batch"
    );

    let mut raw_files = Vec::with_capacity(input.files.len());
    for field in input.files {
        raw_files.push(to_raw_file(field).await?);
    }

    let outcome = state
        .orchestrator
        .process_batch(&contractor_id, raw_files)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "indexed_files": outcome.files.len(),
            "store_handle": outcome.store.as_str(),
        })),
    ))
}

pub async fn list_contractor_files(
    State(state): State<ApiState>,
    Path(contractor_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let files = UploadedFile::get_by_contractor(&contractor_id, &state.db).await?;

    Ok(Json(files))
}

async fn to_raw_file(field: FieldData<NamedTempFile>) -> Result<RawFile, ApiError> {
    let file_name = field
        .metadata
        .file_name
        .ok_or_else(|| ApiError::ValidationError("file name missing in multipart field".into()))?;

    let mime_type = field.metadata.content_type.unwrap_or_else(|| {
        mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string()
    });

    let content = tokio::fs::read(field.contents.path())
        .await
        .map_err(AppError::from)?;

    Ok(RawFile {
        file_name,
        mime_type,
        content: Bytes::from(content),
    })
}
