//! Client interface to the external file-search backend.
//!
//! The rest of the system talks to the backend exclusively through the
//! [`IndexingClient`] trait: raw byte uploads, retrieval store management,
//! and retrieval-grounded generation queries. The production implementation
//! lives in [`gemini`]; tests substitute their own fakes.

pub mod gemini;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gemini::FileSearchClient;

/// Backend-assigned identifier for a successfully uploaded document.
///
/// Distinct from store membership: a file can be uploaded without being
/// attached to any store yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle(pub String);

impl FileHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a retrieval store owned by a contractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreHandle(pub String);

impl StoreHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one retrieval-grounded generation call.
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
}

/// Document counters reported by the backend for a store.
///
/// Indexing is asynchronous on the backend side; a store is queryable once
/// nothing is pending.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreState {
    pub pending_documents: u64,
    pub active_documents: u64,
    pub failed_documents: u64,
}

impl StoreState {
    pub fn is_settled(&self) -> bool {
        self.pending_documents == 0
    }
}

#[derive(Error, Debug)]
pub enum IndexingError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("file upload failed: {0}")]
    FileFailed(String),

    #[error("file still processing after {0} status polls")]
    ProcessingTimeout(u32),

    #[error("unexpected backend response: {0}")]
    MalformedResponse(String),
}

impl IndexingError {
    /// True when the backend reports the resource is already present.
    /// Attach calls treat this as success; everything else propagates.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::Backend { status, message }
                if *status == 409 || message.contains("ALREADY_EXISTS")
        )
    }
}

/// The backend operations the pipeline depends on.
#[async_trait]
pub trait IndexingClient: Send + Sync {
    /// Uploads raw content and waits until the backend has finished
    /// processing it. Must not return a handle for a file that is still
    /// transitioning.
    async fn upload_bytes(
        &self,
        content: Bytes,
        mime_type: &str,
        display_name: &str,
    ) -> Result<FileHandle, IndexingError>;

    /// Creates a retrieval store seeded with the given uploaded files.
    async fn create_store(
        &self,
        display_name: &str,
        initial_files: &[FileHandle],
    ) -> Result<StoreHandle, IndexingError>;

    /// Attaches an already-uploaded file to an existing store.
    async fn attach_file(
        &self,
        store: &StoreHandle,
        file: &FileHandle,
    ) -> Result<(), IndexingError>;

    /// Reports the store's document counters.
    async fn store_state(&self, store: &StoreHandle) -> Result<StoreState, IndexingError>;

    /// Issues one generation call grounded in the given store.
    async fn query(&self, store: &StoreHandle, prompt: &str)
        -> Result<QueryOutput, IndexingError>;

    /// Deletes a store. Callers treat failure as non-fatal.
    async fn delete_store(&self, store: &StoreHandle) -> Result<(), IndexingError>;
}
