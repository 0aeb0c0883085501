use indexing_client::IndexingError;
use thiserror::Error;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),
    #[error("Indexing backend error: {0}")]
    Indexing(#[from] IndexingError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid prompt format: {0}")]
    InvalidPromptFormat(String),
    #[error("Upload failed for '{file_name}': {reason}")]
    UploadFailed { file_name: String, reason: String },
    #[error("Indexing failed: {0}")]
    IndexingFailed(String),
    #[error("No files to index and no existing store")]
    NothingToIndex,
    #[error("Contractor {0} has no retrieval store; upload and process files first")]
    NoStoreConfigured(String),
    #[error("Store not queryable after {attempts} readiness polls")]
    IndexingTimedOut { attempts: u32 },
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
    #[error("Internal service error: {0}")]
    InternalError(String),
}
