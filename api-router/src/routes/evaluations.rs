use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use common::{
    error::AppError,
    storage::types::evaluation_result::EvaluationResult,
};
use serde_json::{json, Value};

use crate::{api_state::ApiState, error::ApiError};

/// Runs the evaluation batch for one contractor. The body must be
/// `{"prompts": [...]}` with a list of strings; anything else is rejected
/// before any backend call is made.
pub async fn evaluate_contractor(
    State(state): State<ApiState>,
    Path(contractor_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let prompts = parse_prompts(&body)?;

    let outcomes = state
        .runner
        .run_evaluations(&contractor_id, prompts)
        .await?;

    Ok(Json(json!({
        "status": "complete",
        "results": outcomes,
    })))
}

pub async fn list_evaluations(
    State(state): State<ApiState>,
    Path(contractor_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let results = EvaluationResult::get_by_contractor(&contractor_id, &state.db).await?;

    Ok(Json(results))
}

fn parse_prompts(body: &Value) -> Result<Vec<String>, AppError> {
    let list = body
        .get("prompts")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            AppError::InvalidPromptFormat("body must contain a 'prompts' list".into())
        })?;

    list.iter()
        .map(|entry| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| AppError::InvalidPromptFormat("prompts must be strings".into()))
        })
        .collect()
}
