use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use common::storage::types::criteria_set::CriteriaSet;
use serde::Deserialize;
use serde_json::json;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CriteriaSetParams {
    pub name: String,
    pub prompts: Vec<String>,
}

pub async fn create_criteria_set(
    State(state): State<ApiState>,
    Json(input): Json<CriteriaSetParams>,
) -> Result<impl IntoResponse, ApiError> {
    if input.prompts.is_empty() {
        return Err(ApiError::ValidationError(
            "a criteria set needs at least one prompt".into(),
        ));
    }

    let criteria_set = CriteriaSet::new(input.name, input.prompts);
    state.db.store_item(criteria_set.clone()).await?;

    Ok(Json(criteria_set))
}

pub async fn list_criteria_sets(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let sets: Vec<CriteriaSet> = state.db.get_all_stored_items().await?;

    Ok(Json(sets))
}

pub async fn delete_criteria_set(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .delete_item::<CriteriaSet>(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("criteria set {id}")))?;

    Ok(Json(json!({ "status": "success" })))
}
