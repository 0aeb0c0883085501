//! Per-batch upload orchestration: persist pending records, push bytes to
//! the backend in input order, then hand the handles to the store lifecycle.

use std::sync::Arc;

use bytes::Bytes;
use common::{
    error::AppError,
    storage::{
        db::SurrealDbClient,
        types::{contractor::Contractor, uploaded_file::UploadedFile},
    },
};
use indexing_client::{FileHandle, IndexingClient, StoreHandle};
use tracing::info;

use crate::lifecycle::StoreLifecycle;

/// One file as received from the HTTP boundary.
pub struct RawFile {
    pub file_name: String,
    pub mime_type: String,
    pub content: Bytes,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub store: StoreHandle,
    pub files: Vec<UploadedFile>,
}

pub struct UploadOrchestrator {
    db: Arc<SurrealDbClient>,
    client: Arc<dyn IndexingClient>,
    lifecycle: Arc<StoreLifecycle>,
}

impl UploadOrchestrator {
    pub fn new(
        db: Arc<SurrealDbClient>,
        client: Arc<dyn IndexingClient>,
        lifecycle: Arc<StoreLifecycle>,
    ) -> Self {
        Self {
            db,
            client,
            lifecycle,
        }
    }

    /// Uploads a batch for one contractor. Files are processed strictly in
    /// input order; the first upload failure aborts the remaining files and
    /// fails the batch naming the offending file. Already-uploaded files
    /// stay recorded (no rollback) and are safe to re-submit, since
    /// attaching is additive and idempotent.
    #[tracing::instrument(skip_all, fields(contractor_id = %contractor_id, file_count = files.len()))]
    pub async fn process_batch(
        &self,
        contractor_id: &str,
        files: Vec<RawFile>,
    ) -> Result<BatchOutcome, AppError> {
        let contractor: Contractor = self
            .db
            .get_item(contractor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("contractor {contractor_id}")))?;

        let mut uploaded: Vec<(UploadedFile, FileHandle)> = Vec::with_capacity(files.len());
        for raw in files {
            let record = UploadedFile::pending(
                &contractor.id,
                raw.file_name.clone(),
                raw.mime_type.clone(),
                raw.content.len() as u64,
            );
            self.db.store_item(record.clone()).await?;

            let handle = self
                .client
                .upload_bytes(raw.content, &raw.mime_type, &raw.file_name)
                .await
                .map_err(|err| AppError::UploadFailed {
                    file_name: raw.file_name.clone(),
                    reason: err.to_string(),
                })?;

            let record = record.record_backend_handle(handle.as_str(), &self.db).await?;
            uploaded.push((record, handle));
        }

        let handles: Vec<FileHandle> = uploaded.iter().map(|(_, h)| h.clone()).collect();
        let store = self
            .lifecycle
            .ensure_files_indexed(&contractor.id, &handles)
            .await?;

        let mut indexed_files = Vec::with_capacity(uploaded.len());
        for (record, _) in uploaded {
            indexed_files.push(record.mark_indexed(&self.db).await?);
        }

        info!(
            store = %store,
            indexed = indexed_files.len(),
            "upload batch fully indexed"
        );

        Ok(BatchOutcome {
            store,
            files: indexed_files,
        })
    }
}
