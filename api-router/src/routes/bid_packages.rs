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
pub struct BidPackageParams {
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_bid_package(
    State(state): State<ApiState>,
    Json(input): Json<BidPackageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let package = BidPackage::new(input.name, input.description);
    state.db.store_item(package.clone()).await?;

    Ok(Json(package))
}

pub async fn list_bid_packages(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    let packages: Vec<BidPackage> = state.db.get_all_stored_items().await?;

    Ok(Json(packages))
}

pub async fn update_bid_package(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(input): Json<BidPackageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut package: BidPackage = state
        .db
        .get_item(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("bid package {id}")))?;

    package.name = input.name;
    if input.description.is_some() {
        package.description = input.description;
    }
    state.db.update_item(package.clone()).await?;

    Ok(Json(package))
}

/// Deleting a package cascades: every contractor's retrieval store is
/// deleted best-effort, then local records are removed regardless.
pub async fn delete_bid_package(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let package: BidPackage = state
        .db
        .get_item(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("bid package {id}")))?;

    let contractors = Contractor::get_by_bid_package(&package.id, &state.db).await?;
    for contractor in contractors {
        state.lifecycle.delete_store_best_effort(&contractor).await;
        UploadedFile::delete_by_contractor(&contractor.id, &state.db).await?;
        EvaluationResult::delete_by_contractor(&contractor.id, &state.db).await?;
        state.db.delete_item::<Contractor>(&contractor.id).await?;
    }

    state.db.delete_item::<BidPackage>(&package.id).await?;

    info!(bid_package_id = %package.id, "deleted bid package and related data");
    Ok(Json(json!({ "status": "success" })))
}
