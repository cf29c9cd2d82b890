//! Webhook request handling
//!
//! The inbound body names a logical destination and carries a batch of
//! key/value records. The handler resolves the destination through the
//! config sheet, drives the upsert engine, and answers with
//! `{"result":"success"}`. Errors from the resolver, the engine, or the
//! store propagate here unchanged and are only translated to a status
//! code at the very edge.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::mapping::MappingConfig;
use crate::store::{SheetStore, StoreError};
use crate::upsert::{upsert_batch, BatchSummary, UpsertError, UpsertRecord};

use super::AppState;

/// Inbound webhook body
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertRequest {
    /// Logical destination id, resolved via the config sheet
    pub destination: String,
    /// Records to upsert, applied in order
    pub data: Vec<UpsertRecord>,
}

/// Outbound webhook body
#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub result: &'static str,
}

impl UpsertResponse {
    fn success() -> Self {
        UpsertResponse { result: "success" }
    }
}

/// Resolve the request's destination and apply its batch.
///
/// The mapping config is re-read from the store on every call; edits to
/// the config sheet take effect on the next request.
pub fn apply_upsert(
    store: &mut dyn SheetStore,
    config_sheet: &str,
    request: &UpsertRequest,
) -> Result<BatchSummary, UpsertError> {
    let mapping = MappingConfig::load(&*store, config_sheet)?;

    let sheet = mapping
        .sheet_name(&request.destination)
        .ok_or_else(|| UpsertError::UnknownDestination(request.destination.clone()))?
        .to_string();
    let columns = mapping.column_map(&request.destination);

    upsert_batch(store, &sheet, &columns, &request.data)
}

/// `POST /webhook`
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpsertRequest>,
) -> Result<Json<UpsertResponse>, ApiError> {
    let destination = request.destination.clone();
    let mut store = state.store.lock().await;

    let summary = apply_upsert(store.as_mut(), &state.config_sheet, &request)?;
    log::info!(
        "Upserted {} records into \"{}\" ({} updated, {} appended)",
        summary.total(),
        destination,
        summary.updated,
        summary.appended
    );

    Ok(Json(UpsertResponse::success()))
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// An [`UpsertError`] on its way out as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub UpsertError);

impl From<UpsertError> for ApiError {
    fn from(err: UpsertError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            UpsertError::UnknownDestination(_) => StatusCode::NOT_FOUND,
            UpsertError::Store(StoreError::SheetNotFound(_)) => StatusCode::NOT_FOUND,
            UpsertError::ColumnNotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            UpsertError::EmptyBatch | UpsertError::NoKeyColumns => StatusCode::BAD_REQUEST,
            UpsertError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        log::warn!("Request failed ({}): {}", status, self.0);
        let body = serde_json::json!({
            "result": "error",
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
