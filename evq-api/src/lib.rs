//! evq-api library - Event questionnaire submission service
//!
//! Validates questionnaire submissions against the configured question set,
//! classifies the event into a tier, and persists the results.

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod questionnaire;
pub mod repo;

use questionnaire::SubmissionService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SubmissionService>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: Arc<SubmissionService>) -> Self {
        Self { service }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    Router::new()
        .route(
            "/event/:event_id/questionnaire/submit",
            post(api::submit_questionnaire),
        )
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
