use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use common::storage::types::{
    bid_package::BidPackage, contractor::Contractor, evaluation_result::EvaluationResult,
    uploaded_file::UploadedFile,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateContractorParams {
    pub name: String,
    pub bid_package_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContractorParams {
    pub name: String,
}

pub async fn create_contractor(
    State(state): State<ApiState>,
    Json(input): Json<CreateContractorParams>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .get_item::<BidPackage>(&input.bid_package_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("bid package {}", input.bid_package_id)))?;

    let contractor = Contractor::new(input.name, input.bid_package_id);
    state.db.store_item(contractor.clone()).await?;

    Ok(Json(contractor))
}

pub async fn list_contractors(
    State(state): State<ApiState>,
    Path(bid_package_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let contractors = Contractor::get_by_bid_package(&bid_package_id, &state.db).await?;

    Ok(Json(contractors))
}

pub async fn update_contractor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateContractorParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut contractor: Contractor = state
        .db
        .get_item(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("contractor {id}")))?;

    contractor.name = input.name;
    state.db.update_item(contractor.clone()).await?;

    Ok(Json(contractor))
}

/// Removes the contractor, its uploaded-file and evaluation records, and its
/// retrieval store. The store deletion is best-effort; local cleanup runs
/// even when the backend copy is already gone.
pub async fn delete_contractor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let contractor: Contractor = state
        .db
        .get_item(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("contractor {id}")))?;

    state.lifecycle.delete_store_best_effort(&contractor).await;
    UploadedFile::delete_by_contractor(&contractor.id, &state.db).await?;
    EvaluationResult::delete_by_contractor(&contractor.id, &state.db).await?;
    state.db.delete_item::<Contractor>(&contractor.id).await?;

    info!(contractor_id = %contractor.id, "deleted contractor and related data");
    Ok(Json(json!({ "status": "success" })))
}
