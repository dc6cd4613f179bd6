//! examsched-web library - exam schedule lookup service
//!
//! Students pick their subjects on a form; the service matches each pick to
//! the official schedule and shows the dated exam sittings.

use axum::Router;
use examsched_common::config::Config;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application context shared across HTTP handlers
///
/// Holds configuration only. Every request rereads the input files and
/// rebuilds the schedule, so there is no mutable state to share.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::select_form).post(api::echo_selection))
        .route("/process", post(api::process_selection))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
