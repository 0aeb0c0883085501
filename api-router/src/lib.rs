use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{delete, get, post, put},
    Router,
};
use routes::{
    bid_packages::{create_bid_package, delete_bid_package, list_bid_packages, update_bid_package},
    contractors::{create_contractor, delete_contractor, list_contractors, update_contractor},
    criteria_sets::{create_criteria_set, delete_criteria_set, list_criteria_sets},
    evaluations::{evaluate_contractor, list_evaluations},
    files::{list_contractor_files, upload_contractor_files},
    liveness::live,
    readiness::ready,
};

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Probes for k8s/systemd
    let probes = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    let api = Router::new()
        .route("/bid_packages", post(create_bid_package).get(list_bid_packages))
        .route(
            "/bid_packages/{id}",
            put(update_bid_package).delete(delete_bid_package),
        )
        .route("/bid_packages/{id}/contractors", get(list_contractors))
        .route("/contractors", post(create_contractor))
        .route(
            "/contractors/{id}",
            put(update_contractor).delete(delete_contractor),
        )
        .route("/contractors/{id}/files", get(list_contractor_files))
        .route(
            "/contractors/{id}/files",
            post(upload_contractor_files)
                .layer(DefaultBodyLimit::max(app_state.config.upload_max_body_bytes)),
        )
        .route("/contractors/{id}/evaluate", post(evaluate_contractor))
        .route("/contractors/{id}/evaluations", get(list_evaluations))
        .route(
            "/criteria_sets",
            post(create_criteria_set).get(list_criteria_sets),
        )
        .route("/criteria_sets/{id}", delete(delete_criteria_set));

    probes.merge(api)
}
