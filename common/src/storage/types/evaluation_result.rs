use uuid::Uuid;

use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};

stored_object!(EvaluationResult, "evaluation_result", {
    contractor_id: String,
    criteria_prompt: String,
    score: i64,
    comment: String,
    input_tokens: Option<u32>,
    output_tokens: Option<u32>
});

impl EvaluationResult {
    /// Results are append-only: re-evaluating a prompt creates a new record
    /// rather than overwriting the previous one.
    pub fn new(
        contractor_id: &str,
        criteria_prompt: String,
        score: i64,
        comment: String,
        input_tokens: Option<u32>,
        output_tokens: Option<u32>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            contractor_id: contractor_id.to_string(),
            criteria_prompt,
            score,
            comment,
            input_tokens,
            output_tokens,
        }
    }

    pub async fn get_by_contractor(
        contractor_id: &str,
        db: &SurrealDbClient,
    ) -> Result<Vec<Self>, AppError> {
        let results: Vec<Self> = db
            .client
            .query(
                "SELECT * FROM evaluation_result WHERE contractor_id = $contractor_id \
                 ORDER BY created_at ASC",
            )
            .bind(("contractor_id", contractor_id.to_string()))
            .await?
            .take(0)?;

        Ok(results)
    }

    pub async fn delete_by_contractor(
        contractor_id: &str,
        db: &SurrealDbClient,
    ) -> Result<(), AppError> {
        db.client
            .query("DELETE evaluation_result WHERE contractor_id = $contractor_id")
            .bind(("contractor_id", contractor_id.to_string()))
            .await?;

        Ok(())
    }
}
