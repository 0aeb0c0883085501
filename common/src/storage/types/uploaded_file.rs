use uuid::Uuid;

use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};

stored_object!(UploadedFile, "uploaded_file", {
    contractor_id: String,
    file_name: String,
    mime_type: String,
    size_bytes: u64,
    backend_file_handle: Option<String>,
    indexed: bool
});

impl UploadedFile {
    /// A file record starts out pending: no backend handle, not indexed.
    /// It is persisted before the upload is attempted so a failed upload
    /// still leaves a trace.
    pub fn pending(
        contractor_id: &str,
        file_name: String,
        mime_type: String,
        size_bytes: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            contractor_id: contractor_id.to_string(),
            file_name,
            mime_type,
            size_bytes,
            backend_file_handle: None,
            indexed: false,
        }
    }

    pub async fn record_backend_handle(
        mut self,
        handle: &str,
        db: &SurrealDbClient,
    ) -> Result<Self, AppError> {
        self.backend_file_handle = Some(handle.to_string());
        self.updated_at = Utc::now();
        db.update_item(self.clone()).await?;
        Ok(self)
    }

    pub async fn mark_indexed(mut self, db: &SurrealDbClient) -> Result<Self, AppError> {
        self.indexed = true;
        self.updated_at = Utc::now();
        db.update_item(self.clone()).await?;
        Ok(self)
    }

    pub async fn get_by_contractor(
        contractor_id: &str,
        db: &SurrealDbClient,
    ) -> Result<Vec<Self>, AppError> {
        let files: Vec<Self> = db
            .client
            .query(
                "SELECT * FROM uploaded_file WHERE contractor_id = $contractor_id \
                 ORDER BY created_at ASC",
            )
            .bind(("contractor_id", contractor_id.to_string()))
            .await?
            .take(0)?;

        Ok(files)
    }

    pub async fn delete_by_contractor(
        contractor_id: &str,
        db: &SurrealDbClient,
    ) -> Result<(), AppError> {
        db.client
            .query("DELETE uploaded_file WHERE contractor_id = $contractor_id")
            .bind(("contractor_id", contractor_id.to_string()))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_then_uploaded_then_indexed() {
        let db = SurrealDbClient::memory("test_ns", &Uuid::new_v4().to_string())
            .await
            .expect("Failed to start in-memory surrealdb");

        let file = UploadedFile::pending("contractor-1", "bid.pdf".into(), "application/pdf".into(), 42);
        assert!(file.backend_file_handle.is_none());
        assert!(!file.indexed);
        db.store_item(file.clone()).await.expect("store");

        let file = file
            .record_backend_handle("files/abc", &db)
            .await
            .expect("record handle");
        let file = file.mark_indexed(&db).await.expect("mark indexed");

        let stored: UploadedFile = db
            .get_item(&file.id)
            .await
            .expect("fetch")
            .expect("file missing");
        assert_eq!(stored.backend_file_handle.as_deref(), Some("files/abc"));
        assert!(stored.indexed);
    }

    #[tokio::test]
    async fn test_listing_preserves_insertion_order() {
        let db = SurrealDbClient::memory("test_ns", &Uuid::new_v4().to_string())
            .await
            .expect("Failed to start in-memory surrealdb");

        for (idx, name) in ["a.pdf", "b.pdf", "c.pdf"].iter().enumerate() {
            let mut file =
                UploadedFile::pending("contractor-1", (*name).to_string(), "application/pdf".into(), 1);
            // Stagger created_at so ordering is deterministic
            file.created_at += chrono::Duration::seconds(idx as i64);
            db.store_item(file).await.expect("store");
        }

        let files = UploadedFile::get_by_contractor("contractor-1", &db)
            .await
            .expect("list");
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);

        UploadedFile::delete_by_contractor("contractor-1", &db)
            .await
            .expect("delete");
        let files = UploadedFile::get_by_contractor("contractor-1", &db)
            .await
            .expect("list");
        assert!(files.is_empty());
    }
}
