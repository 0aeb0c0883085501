//! Create-or-extend management of a contractor's retrieval store.
//!
//! A contractor moves from `NoStore` to `HasStore` exactly once, on the
//! first fully-uploaded batch. The transition is serialized per contractor
//! with an async mutex, and the store-handle write itself is a conditional
//! update, so two racing batches cannot both create stores.

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use common::{
    error::AppError,
    storage::{db::SurrealDbClient, types::contractor::Contractor},
};
use indexing_client::{FileHandle, IndexingClient, IndexingError, StoreHandle};
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, info, warn};

use crate::config::PipelineTuning;

enum PollFailure {
    StillPending,
    Backend(IndexingError),
}

pub struct StoreLifecycle {
    db: Arc<SurrealDbClient>,
    client: Arc<dyn IndexingClient>,
    tuning: PipelineTuning,
    contractor_locks: std::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl StoreLifecycle {
    pub fn new(
        db: Arc<SurrealDbClient>,
        client: Arc<dyn IndexingClient>,
        tuning: PipelineTuning,
    ) -> Self {
        Self {
            db,
            client,
            tuning,
            contractor_locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, contractor_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .contractor_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(locks.entry(contractor_id.to_string()).or_default())
    }

    /// Ensures every handle is attached to the contractor's store, creating
    /// the store on first use, then waits for the backend to finish
    /// indexing. Serialized per contractor.
    #[tracing::instrument(skip_all, fields(contractor_id = %contractor_id, file_count = handles.len()))]
    pub async fn ensure_files_indexed(
        &self,
        contractor_id: &str,
        handles: &[FileHandle],
    ) -> Result<StoreHandle, AppError> {
        let lock = self.lock_for(contractor_id);
        let _guard = lock.lock().await;

        // Re-read under the lock; another batch may have just created the store.
        let contractor: Contractor = self
            .db
            .get_item(contractor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("contractor {contractor_id}")))?;

        let store = match contractor.store_handle {
            Some(existing) => {
                let store = StoreHandle(existing);
                self.attach_all(&store, handles).await?;
                store
            }
            None => {
                if handles.is_empty() {
                    return Err(AppError::NothingToIndex);
                }
                self.create_store_for(&contractor, handles).await?
            }
        };

        self.await_store_settled(&store).await?;
        Ok(store)
    }

    /// Attaches handles to an existing store. A backend "already exists"
    /// answer counts as attached; any other failure aborts, leaving earlier
    /// attaches in place (accepted, not rolled back).
    async fn attach_all(
        &self,
        store: &StoreHandle,
        handles: &[FileHandle],
    ) -> Result<(), AppError> {
        for handle in handles {
            match self.client.attach_file(store, handle).await {
                Ok(()) => {}
                Err(err) if err.is_already_exists() => {
                    debug!(file = %handle, "file already attached, skipping");
                }
                Err(err) => {
                    return Err(AppError::IndexingFailed(format!(
                        "could not attach {handle} to {store}: {err}"
                    )));
                }
            }
        }
        Ok(())
    }

    async fn create_store_for(
        &self,
        contractor: &Contractor,
        handles: &[FileHandle],
    ) -> Result<StoreHandle, AppError> {
        // Display names must not collide across contractors or time.
        let display_name = format!("contractor_{}_{}", contractor.id, Utc::now().timestamp());
        let store = self.client.create_store(&display_name, handles).await?;

        let won = Contractor::set_store_handle_if_absent(&contractor.id, store.as_str(), &self.db)
            .await?;
        if won {
            info!(store = %store, display_name, "created retrieval store");
            return Ok(store);
        }

        // Another process won the race. Discard our store and attach the
        // batch to the winner's instead.
        warn!(store = %store, "concurrent store creation detected, discarding duplicate");
        if let Err(err) = self.client.delete_store(&store).await {
            warn!(store = %store, error = %err, "could not delete duplicate store");
        }

        let winner: Contractor = self
            .db
            .get_item(&contractor.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("contractor {}", contractor.id)))?;
        let store = winner
            .store_handle
            .map(StoreHandle)
            .ok_or_else(|| AppError::InternalError("store handle vanished after race".into()))?;
        self.attach_all(&store, handles).await?;
        Ok(store)
    }

    /// Bounded poll until the backend reports no pending documents.
    /// Exhausting the attempt budget is an `IndexingTimedOut`.
    async fn await_store_settled(&self, store: &StoreHandle) -> Result<(), AppError> {
        let strategy = ExponentialBackoff::from_millis(self.tuning.readiness_poll_base_delay_ms)
            .max_delay(Duration::from_millis(self.tuning.readiness_poll_max_delay_ms))
            .take(self.tuning.readiness_poll_max_attempts);

        let outcome = Retry::spawn(strategy, || async {
            let state = self
                .client
                .store_state(store)
                .await
                .map_err(PollFailure::Backend)?;
            if state.is_settled() {
                Ok(())
            } else {
                debug!(store = %store, pending = state.pending_documents, "store still indexing");
                Err(PollFailure::StillPending)
            }
        })
        .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(PollFailure::StillPending) => Err(AppError::IndexingTimedOut {
                attempts: u32::try_from(self.tuning.readiness_poll_max_attempts).unwrap_or(u32::MAX),
            }),
            Err(PollFailure::Backend(err)) => Err(AppError::Indexing(err)),
        }
    }

    /// Store deletion is best-effort: the backend copy may already be gone,
    /// and local record cleanup proceeds regardless.
    pub async fn delete_store_best_effort(&self, contractor: &Contractor) {
        let Some(handle) = contractor.store_handle.as_deref() else {
            return;
        };
        let store = StoreHandle(handle.to_string());
        if let Err(err) = self.client.delete_store(&store).await {
            warn!(
                contractor_id = %contractor.id,
                store = %store,
                error = %err,
                "failed to delete retrieval store, continuing"
            );
        }
    }
}
