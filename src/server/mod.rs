//! HTTP boundary
//!
//! Thin wiring from the wire protocol to the core:
//! - `POST /` — run a batch synchronously, answer with its results
//! - `POST /:request_id` — register a background batch, answer 201
//! - `GET /:request_id` — block until the job completes, answer with its
//!   results and consume the id
//!
//! All routes share one [`AppState`]; the handlers hold no logic beyond
//! status-code mapping.

use crate::jobs::{JobError, JobRegistry};
use crate::scrape::{run_batch, ItemResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;

/// Registry specialization used by the HTTP boundary
pub type BatchRegistry = JobRegistry<Vec<ItemResult>>;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<BatchRegistry>,
    pub client: Client,
}

impl AppState {
    /// Creates fresh state around the given outbound client
    pub fn new(client: Client) -> Self {
        Self {
            registry: Arc::new(BatchRegistry::new()),
            client,
        }
    }
}

/// Builds the axum router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(run_sync_batch))
        .route("/:request_id", post(submit_batch).get(collect_batch))
        .with_state(state)
}

/// Binds `addr` and serves requests until the process exits
pub async fn serve(addr: SocketAddr, state: AppState) -> crate::Result<()> {
    let app = router(state);

    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `POST /` — run the batch in the handler and answer with the results
async fn run_sync_batch(
    State(state): State<AppState>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> Response {
    let Ok(Json(urls)) = payload else {
        return bad_request();
    };

    let results = run_batch(&state.client, &urls).await;
    Json(results).into_response()
}

/// `POST /:request_id` — register the batch and run it in the background
async fn submit_batch(
    Path(request_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> Response {
    let Ok(Json(urls)) = payload else {
        return bad_request();
    };

    let client = state.client.clone();
    let work = async move { run_batch(&client, &urls).await };

    match state.registry.submit(&request_id, work).await {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /:request_id` — block until the job completes, then consume it
async fn collect_batch(
    Path(request_id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    match state.registry.collect(&request_id).await {
        Ok(results) => Json(&*results).into_response(),
        Err(e) => error_response(e),
    }
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "Bad request").into_response()
}

fn error_response(err: JobError) -> Response {
    let status = match &err {
        JobError::DuplicateId(_) => StatusCode::CONFLICT,
        JobError::NotFound(_) => StatusCode::NOT_FOUND,
    };
    (status, err.to_string()).into_response()
}
