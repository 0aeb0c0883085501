//! Document-to-knowledge-store lifecycle and evaluation orchestration.
//!
//! The pipeline takes raw uploaded contractor files, registers them with the
//! indexing backend, attaches them to the contractor's retrieval store
//! (creating one on first upload), waits for the backend to finish indexing,
//! and runs scored evaluation queries against the store.

pub mod config;
pub mod lifecycle;
pub mod parser;
pub mod runner;
pub mod upload;

pub use config::PipelineTuning;
pub use lifecycle::StoreLifecycle;
pub use parser::{parse_scored_answer, ScoredAnswer};
pub use runner::{EvaluationRunner, PromptOutcome};
pub use upload::{BatchOutcome, RawFile, UploadOrchestrator};
