//! HTTP API layer with Axum routes.
//!
//! This crate exposes the ledger contract over HTTP:
//! - Group and member management
//! - Expense creation, listing, and deletion
//! - Settlement creation, editing, approval, and deletion
//! - Balance and suggested-payment reads
//!
//! All amounts cross this boundary as decimal strings with two
//! fractional digits; conversion to integer cents happens immediately
//! on the way in and floating point is never exposed.

pub mod routes;

use std::sync::Arc;

use axum::Router;
use divvy_shared::AppConfig;
use divvy_store::GroupStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The group registry and event logs.
    pub store: Arc<GroupStore>,
    /// Application configuration.
    pub config: Arc<AppConfig>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
