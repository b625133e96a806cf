//! HTTP API of the file registry.
//!
//! Endpoints:
//! - POST /files - Register a file stored in the storage backend (requires
//!   `X-API-Key`; not mounted when no registry key is configured)
//! - GET /files?start=&end= - Records with IDs in `start..=end`
//! - GET /files/count - Number of registered files
//! - GET /health - Health check with the state of the prover loop

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::auth::{ApiKey, require_api_key};
use da_circuits::Srs;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::da::register::{RegisterError, register_file};
use crate::da::{ProverStatus, StatusSnapshot};
use crate::registry::{FileRecord, FileRegistry};
use crate::storage::StorageBackend;

/// Largest ID range a single `GET /files` may request.
pub const MAX_RANGE: u64 = 1_000;

/// Shared application state for handlers.
pub struct AppState {
    pub registry: Arc<dyn FileRegistry>,
    pub storage: Arc<dyn StorageBackend>,
    pub srs: Arc<Srs>,
    pub status: Arc<ProverStatus>,
    /// Key required for registration; `None` disables `POST /files`
    pub registry_api_key: Option<ApiKey>,
}

/// Request body for POST /files.
#[derive(Debug, Deserialize)]
pub struct RegisterFileRequest {
    /// Storage backend ID of the content
    pub content_id: String,
    /// Unix time after which the file no longer has to be proved
    pub expiration: i64,
}

/// Registry record as returned by the API.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecordResponse {
    pub id: u64,
    /// Compressed G1 point, hex
    pub commitment: String,
    pub content_id: String,
    pub size_bytes: i64,
    pub expiration: i64,
}

impl From<FileRecord> for FileRecordResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            commitment: record.commitment.to_hex(),
            content_id: record.content_id,
            size_bytes: record.size_bytes,
            expiration: record.expiration,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileCountResponse {
    pub count: u64,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: &'static str,
    pub file_count: u64,
    pub srs_capacity_bytes: usize,
    pub prover: StatusSnapshot,
}

/// Error body shared by all endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        let status = match &self {
            RegisterError::InvalidContentId(_) => StatusCode::BAD_REQUEST,
            RegisterError::Fetch(_) => StatusCode::BAD_GATEWAY,
            RegisterError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RegisterError::Commit(_) | RegisterError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, self.to_string())
    }
}

/// POST /files - Fetch, commit and register a file.
pub async fn post_file(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterFileRequest>,
) -> Result<(StatusCode, Json<FileRecordResponse>), RegisterError> {
    let record = register_file(
        state.registry.as_ref(),
        state.storage.as_ref(),
        &state.srs,
        &req.content_id,
        req.expiration,
    )
    .await
    .inspect_err(|e| warn!(content_id = %req.content_id, error = %e, "File registration rejected"))?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET /files?start=&end= - Records in an inclusive ID range.
pub async fn get_files(
    State(state): State<Arc<AppState>>,
    Query(range): Query<RangeQuery>,
) -> Response {
    if range.start == 0 || range.start > range.end {
        return error_response(StatusCode::BAD_REQUEST, "expected 1 <= start <= end");
    }
    if range.end - range.start >= MAX_RANGE {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("range is limited to {} records", MAX_RANGE),
        );
    }

    match state.registry.get_range_file_info(range.start, range.end) {
        Ok(records) => {
            let records: Vec<FileRecordResponse> = records.into_iter().map(Into::into).collect();
            Json(records).into_response()
        }
        Err(e) => {
            error!(error = %e, "Registry range read failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "registry read failed")
        }
    }
}

/// GET /files/count - Number of registered files.
pub async fn get_file_count(State(state): State<Arc<AppState>>) -> Response {
    match state.registry.get_file_count() {
        Ok(count) => Json(FileCountResponse { count }).into_response(),
        Err(e) => {
            error!(error = %e, "Registry count read failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "registry read failed")
        }
    }
}

/// GET /health - Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, file_count) = match state.registry.get_file_count() {
        Ok(count) => ("healthy", count),
        Err(_) => ("degraded", 0),
    };
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION"),
        file_count,
        srs_capacity_bytes: state.srs.max_file_bytes(),
        prover: state.status.snapshot(),
    })
}

/// Build the router; registration requires the configured `X-API-Key`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/files", get(get_files))
        .route("/files/count", get(get_file_count))
        .route("/health", get(health));

    match state.registry_api_key.clone() {
        Some(key) => {
            let protected_routes = Router::new()
                .route("/files", post(post_file))
                .layer(middleware::from_fn_with_state(key, require_api_key));
            router = router.merge(protected_routes);
        }
        None => info!("No registry API key configured, POST /files is disabled"),
    }

    router.with_state(state)
}
