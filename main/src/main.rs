use std::sync::Arc;

use api_router::{api_routes_v1, api_state::ApiState};
use axum::Router;
use common::{storage::db::SurrealDbClient, utils::config::get_config};
use indexing_client::{FileSearchClient, IndexingClient};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;

    let db = Arc::new(
        SurrealDbClient::new(
            &config.surrealdb_address,
            &config.surrealdb_username,
            &config.surrealdb_password,
            &config.surrealdb_namespace,
            &config.surrealdb_database,
        )
        .await?,
    );

    db.ensure_initialized().await?;

    // The backend client is constructed once here and passed down; nothing
    // holds it as ambient module state.
    let indexing: Arc<dyn IndexingClient> = Arc::new(FileSearchClient::new(
        &config.gemini_base_url,
        &config.gemini_api_key,
        &config.gemini_model,
    ));

    let api_state = ApiState::new(&config, db, indexing);

    let app = Router::new()
        .nest("/api/v1", api_routes_v1::<ApiState>(&api_state))
        .with_state(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use common::utils::config::AppConfig;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn smoke_test_config() -> AppConfig {
        AppConfig {
            gemini_api_key: "test-key".into(),
            surrealdb_address: "mem://".into(),
            surrealdb_username: "root".into(),
            surrealdb_password: "root".into(),
            surrealdb_namespace: "test_ns".into(),
            surrealdb_database: "test_db".into(),
            http_port: 0,
            gemini_base_url: "https://backend.invalid".into(),
            gemini_model: "gemini-flash-latest".into(),
            upload_max_body_bytes: 1_000_000,
        }
    }

    async fn smoke_router() -> Router {
        let config = smoke_test_config();
        let db = Arc::new(
            SurrealDbClient::memory("test_ns", &Uuid::new_v4().to_string())
                .await
                .expect("failed to start in-memory surrealdb"),
        );
        db.ensure_initialized()
            .await
            .expect("failed to initialize schema");

        // Points at an unreachable host; none of the probed routes touch it.
        let indexing: Arc<dyn IndexingClient> = Arc::new(FileSearchClient::new(
            &config.gemini_base_url,
            &config.gemini_api_key,
            &config.gemini_model,
        ));

        let api_state = ApiState::new(&config, db, indexing);
        Router::new()
            .nest("/api/v1", api_routes_v1::<ApiState>(&api_state))
            .with_state(api_state)
    }

    #[tokio::test]
    async fn smoke_startup_with_in_memory_surrealdb() {
        let app = smoke_router().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/live")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(response.status(), StatusCode::OK);

        let ready_response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("ready response");
        assert_eq!(ready_response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bid_package_crud_over_http() {
        let app = smoke_router().await;

        let create = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/bid_packages")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{ "name": "Highway refurbishment", "description": "Phase 1" }"#,
                    ))
                    .expect("request"),
            )
            .await
            .expect("create response");
        assert_eq!(create.status(), StatusCode::OK);

        let list = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/bid_packages")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("list response");
        assert_eq!(list.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn evaluating_unknown_contractor_is_not_found() {
        let app = smoke_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/contractors/nonexistent/evaluate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{ "prompts": ["Is the bid complete?"] }"#))
                    .expect("request"),
            )
            .await
            .expect("evaluate response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_prompt_list_is_a_bad_request() {
        let app = smoke_router().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/contractors/nonexistent/evaluate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{ "prompts": "not a list" }"#))
                    .expect("request"),
            )
            .await
            .expect("evaluate response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
