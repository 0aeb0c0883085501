//! HTTP implementation of [`IndexingClient`] against the Gemini file-search
//! API surface: `files` upload, `fileSearchStores` management and
//! `generateContent` with the file-search tool.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{
    FileHandle, IndexingClient, IndexingError, QueryOutput, StoreHandle, StoreState,
};

const DEFAULT_UPLOAD_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_UPLOAD_POLL_MAX_ATTEMPTS: u32 = 30;

#[derive(Clone)]
pub struct FileSearchClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    upload_poll_interval: Duration,
    upload_poll_max_attempts: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<BackendStatus>,
}

#[derive(Debug, Deserialize)]
struct BackendStatus {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileResource,
}

#[derive(Debug, Deserialize)]
struct StoreResource {
    name: String,
    #[serde(rename = "pendingDocumentsCount", default)]
    pending_documents_count: u64,
    #[serde(rename = "activeDocumentsCount", default)]
    active_documents_count: u64,
    #[serde(rename = "failedDocumentsCount", default)]
    failed_documents_count: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<BackendStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

impl FileSearchClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            upload_poll_interval: DEFAULT_UPLOAD_POLL_INTERVAL,
            upload_poll_max_attempts: DEFAULT_UPLOAD_POLL_MAX_ATTEMPTS,
        }
    }

    pub fn with_upload_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.upload_poll_interval = interval;
        self.upload_poll_max_attempts = max_attempts;
        self
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}/v1beta/{}", self.base_url, resource)
    }

    /// Converts a non-success response into `IndexingError::Backend`,
    /// extracting the backend's error message when the body carries one.
    async fn check_response(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, IndexingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.error)
            .map_or(body, |error| error.message);

        Err(IndexingError::Backend {
            status: status_code,
            message,
        })
    }

    async fn get_file(&self, name: &str) -> Result<FileResource, IndexingError> {
        let response = self
            .http
            .get(self.resource_url(name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        Ok(Self::check_response(response).await?.json().await?)
    }
}

#[async_trait]
impl IndexingClient for FileSearchClient {
    async fn upload_bytes(
        &self,
        content: Bytes,
        mime_type: &str,
        display_name: &str,
    ) -> Result<FileHandle, IndexingError> {
        let response = self
            .http
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("X-Goog-File-Name", display_name)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(content)
            .send()
            .await?;

        let uploaded: UploadResponse = Self::check_response(response).await?.json().await?;
        let mut file = uploaded.file;

        // The backend processes uploads asynchronously; a handle is only
        // usable once the file has left the PROCESSING state.
        let mut polls = 0;
        while file.state.as_deref() == Some("PROCESSING") {
            if polls >= self.upload_poll_max_attempts {
                return Err(IndexingError::ProcessingTimeout(polls));
            }
            polls = polls.saturating_add(1);
            tokio::time::sleep(self.upload_poll_interval).await;
            file = self.get_file(&file.name).await?;
        }

        if file.state.as_deref() == Some("FAILED") {
            let reason = file
                .error
                .map_or_else(|| "backend reported FAILED state".to_string(), |e| e.message);
            return Err(IndexingError::FileFailed(reason));
        }

        debug!(file = %file.name, polls, "file upload settled");
        Ok(FileHandle(file.name))
    }

    async fn create_store(
        &self,
        display_name: &str,
        initial_files: &[FileHandle],
    ) -> Result<StoreHandle, IndexingError> {
        let response = self
            .http
            .post(self.resource_url("fileSearchStores"))
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({ "displayName": display_name }))
            .send()
            .await?;

        let store: StoreResource = Self::check_response(response).await?.json().await?;
        let handle = StoreHandle(store.name);

        for file in initial_files {
            self.attach_file(&handle, file).await?;
        }

        Ok(handle)
    }

    async fn attach_file(
        &self,
        store: &StoreHandle,
        file: &FileHandle,
    ) -> Result<(), IndexingError> {
        let response = self
            .http
            .post(self.resource_url(&format!("{}:importFile", store.as_str())))
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({ "fileName": file.as_str() }))
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }

    async fn store_state(&self, store: &StoreHandle) -> Result<StoreState, IndexingError> {
        let response = self
            .http
            .get(self.resource_url(store.as_str()))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let store: StoreResource = Self::check_response(response).await?.json().await?;
        Ok(StoreState {
            pending_documents: store.pending_documents_count,
            active_documents: store.active_documents_count,
            failed_documents: store.failed_documents_count,
        })
    }

    async fn query(
        &self,
        store: &StoreHandle,
        prompt: &str,
    ) -> Result<QueryOutput, IndexingError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{
                "fileSearch": { "fileSearchStoreNames": [store.as_str()] }
            }]
        });

        let response = self
            .http
            .post(self.resource_url(&format!("models/{}:generateContent", self.model)))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let generated: GenerateContentResponse =
            Self::check_response(response).await?.json().await?;

        let text = generated
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| {
                IndexingError::MalformedResponse("no candidates in generation response".into())
            })?;

        let (input_tokens, output_tokens) = generated
            .usage_metadata
            .map_or((None, None), |usage| {
                (usage.prompt_token_count, usage.candidates_token_count)
            });

        Ok(QueryOutput {
            text,
            input_tokens,
            output_tokens,
        })
    }

    async fn delete_store(&self, store: &StoreHandle) -> Result<(), IndexingError> {
        let response = self
            .http
            .delete(self.resource_url(store.as_str()))
            .query(&[("force", "true")])
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        if let Err(err) = Self::check_response(response).await {
            warn!(store = %store, error = %err, "store deletion reported an error");
            return Err(err);
        }
        Ok(())
    }
}
