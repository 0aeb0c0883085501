//! Per-prompt evaluation: grounded query, score/explanation parse, persist.

use std::sync::Arc;

use common::{
    error::AppError,
    storage::{
        db::SurrealDbClient,
        types::{contractor::Contractor, evaluation_result::EvaluationResult},
    },
};
use indexing_client::{IndexingClient, StoreHandle};
use serde::Serialize;
use tracing::warn;

use crate::parser::parse_scored_answer;

/// Appended to every prompt so the model's answer matches the parser's
/// two-field protocol.
const FORMAT_INSTRUCTION: &str = "Format your response exactly like this:\n\
SCORE: <number from 0 to 10>\n\
EXPLANATION: <brief explanation>";

/// Per-prompt result, order-preserving. Prompts are independent queries, so
/// one failing prompt never aborts the rest of the batch.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PromptOutcome {
    Evaluated {
        prompt: String,
        score: i64,
        comment: String,
    },
    Failed {
        prompt: String,
        error: String,
    },
}

pub struct EvaluationRunner {
    db: Arc<SurrealDbClient>,
    client: Arc<dyn IndexingClient>,
}

impl EvaluationRunner {
    pub fn new(db: Arc<SurrealDbClient>, client: Arc<dyn IndexingClient>) -> Self {
        Self { db, client }
    }

    /// Runs every prompt against the contractor's store. Fails up front with
    /// `NoStoreConfigured` before issuing any query when the contractor has
    /// no store yet.
    #[tracing::instrument(skip_all, fields(contractor_id = %contractor_id, prompt_count = prompts.len()))]
    pub async fn run_evaluations(
        &self,
        contractor_id: &str,
        prompts: Vec<String>,
    ) -> Result<Vec<PromptOutcome>, AppError> {
        let contractor: Contractor = self
            .db
            .get_item(contractor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("contractor {contractor_id}")))?;

        let store = contractor
            .store_handle
            .map(StoreHandle)
            .ok_or_else(|| AppError::NoStoreConfigured(contractor.id.clone()))?;

        let mut outcomes = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            outcomes.push(self.evaluate_prompt(&contractor.id, &store, prompt).await?);
        }

        Ok(outcomes)
    }

    async fn evaluate_prompt(
        &self,
        contractor_id: &str,
        store: &StoreHandle,
        prompt: String,
    ) -> Result<PromptOutcome, AppError> {
        let framed = format!("{prompt}\n\n{FORMAT_INSTRUCTION}");

        let answer = match self.client.query(store, &framed).await {
            Ok(answer) => answer,
            Err(err) => {
                warn!(error = %err, "evaluation query failed, continuing with next prompt");
                return Ok(PromptOutcome::Failed {
                    prompt,
                    error: err.to_string(),
                });
            }
        };

        let parsed = parse_scored_answer(&answer.text);
        let result = EvaluationResult::new(
            contractor_id,
            prompt.clone(),
            parsed.score,
            parsed.comment.clone(),
            answer.input_tokens,
            answer.output_tokens,
        );
        self.db.store_item(result).await?;

        Ok(PromptOutcome::Evaluated {
            prompt,
            score: parsed.score,
            comment: parsed.comment,
        })
    }
}
