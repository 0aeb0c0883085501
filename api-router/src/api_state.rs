use std::sync::Arc;

use common::{storage::db::SurrealDbClient, utils::config::AppConfig};
use evaluation_pipeline::{
    EvaluationRunner, PipelineTuning, StoreLifecycle, UploadOrchestrator,
};
use indexing_client::IndexingClient;

#[derive(Clone)]
pub struct ApiState {
    pub db: Arc<SurrealDbClient>,
    pub config: AppConfig,
    pub lifecycle: Arc<StoreLifecycle>,
    pub orchestrator: Arc<UploadOrchestrator>,
    pub runner: Arc<EvaluationRunner>,
}

impl ApiState {
    /// Wires the pipeline around an explicitly constructed backend client;
    /// the client is passed down rather than held as module state so tests
    /// can substitute fakes.
    pub fn new(
        config: &AppConfig,
        db: Arc<SurrealDbClient>,
        indexing: Arc<dyn IndexingClient>,
    ) -> Self {
        let lifecycle = Arc::new(StoreLifecycle::new(
            Arc::clone(&db),
            Arc::clone(&indexing),
            PipelineTuning::default(),
        ));
        let orchestrator = Arc::new(UploadOrchestrator::new(
            Arc::clone(&db),
            Arc::clone(&indexing),
            Arc::clone(&lifecycle),
        ));
        let runner = Arc::new(EvaluationRunner::new(Arc::clone(&db), indexing));

        Self {
            db,
            config: config.clone(),
            lifecycle,
            orchestrator,
            runner,
        }
    }
}
