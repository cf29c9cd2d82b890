//! HTTP server for the webhook endpoint
//!
//! One route does the work (`POST /webhook`); requests are serialized
//! through a mutex around the store, so a batch always runs start to
//! finish before the next one begins.

pub mod handler;

pub use handler::{apply_upsert, UpsertRequest, UpsertResponse};

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::{SheetStore, WorkbookStore};

/// Shared state behind the router
pub struct AppState {
    /// The tabular store; the mutex enforces one request at a time
    pub store: Mutex<Box<dyn SheetStore + Send>>,
    /// Name of the sheet holding the name mappings
    pub config_sheet: String,
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(handler::webhook))
        .route("/health", get(handler::health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the workbook and serve until interrupted
pub async fn run(config: &Config) -> Result<()> {
    let store = WorkbookStore::open(&config.workbook)
        .with_context(|| format!("Failed to open workbook: {}", config.workbook.display()))?;

    let state = Arc::new(AppState {
        store: Mutex::new(Box::new(store)),
        config_sheet: config.config_sheet.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    log::info!(
        "Serving webhook on http://{} (workbook: {})",
        config.listen,
        config.workbook.display()
    );

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;
    Ok(())
}
