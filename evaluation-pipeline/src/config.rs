/// Knobs for the post-indexing readiness poll.
///
/// The backend indexes asynchronously and never calls us back, so after a
/// create/attach the store is polled until its pending-document counter
/// drains, with exponential backoff and a hard attempt cap.
#[derive(Debug, Clone)]
pub struct PipelineTuning {
    pub readiness_poll_base_delay_ms: u64,
    pub readiness_poll_max_delay_ms: u64,
    pub readiness_poll_max_attempts: usize,
}

impl Default for PipelineTuning {
    fn default() -> Self {
        Self {
            readiness_poll_base_delay_ms: 250,
            readiness_poll_max_delay_ms: 5_000,
            readiness_poll_max_attempts: 20,
        }
    }
}
